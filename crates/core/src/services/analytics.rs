//! Analytics service: supplier dashboard aggregates computed from orders.

use scp_common::AppResult;
use scp_db::{
    entities::order::OrderStatus,
    repositories::{ComplaintRepository, OrderRepository},
};
use serde::Serialize;

use crate::services::access::Viewer;

/// Supplier dashboard figures.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub order_count: u64,
    pub pending_order_count: u64,
    /// Gross merchandise value: sum of accepted and completed order totals, KZT.
    pub gmv_kzt: i64,
    /// Average accepted/completed order value, KZT (0 when no orders).
    pub avg_order_value_kzt: i64,
    pub open_complaint_count: u64,
}

/// Analytics service.
#[derive(Clone)]
pub struct AnalyticsService {
    order_repo: OrderRepository,
    complaint_repo: ComplaintRepository,
}

impl AnalyticsService {
    /// Create a new analytics service.
    #[must_use]
    pub const fn new(order_repo: OrderRepository, complaint_repo: ComplaintRepository) -> Self {
        Self {
            order_repo,
            complaint_repo,
        }
    }

    /// Dashboard of the viewer's supplier company.
    pub async fn dashboard(&self, viewer: &Viewer) -> AppResult<Dashboard> {
        viewer.require(viewer.permissions().can_view_analytics, "view analytics")?;
        let supplier_id = viewer.supplier_scope()?;

        let order_count = self.order_repo.count_for_supplier(supplier_id, None).await?;
        let pending_order_count = self
            .order_repo
            .count_for_supplier(supplier_id, Some(OrderStatus::Pending))
            .await?;

        let settled = [OrderStatus::Accepted, OrderStatus::Completed];
        let gmv_kzt = self
            .order_repo
            .sum_totals_for_supplier(supplier_id, &settled)
            .await?;

        let accepted_count = self
            .order_repo
            .count_for_supplier(supplier_id, Some(OrderStatus::Accepted))
            .await?;
        let completed_count = self
            .order_repo
            .count_for_supplier(supplier_id, Some(OrderStatus::Completed))
            .await?;
        let settled_count = accepted_count + completed_count;

        let avg_order_value_kzt = if settled_count == 0 {
            0
        } else {
            gmv_kzt / i64::try_from(settled_count).unwrap_or(i64::MAX)
        };

        let open_complaint_count = self
            .complaint_repo
            .count_open_for_supplier(supplier_id)
            .await?;

        Ok(Dashboard {
            order_count,
            pending_order_count,
            gmv_kzt,
            avg_order_value_kzt,
            open_complaint_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::access::Role;
    use scp_db::repositories::{ComplaintRepository, OrderRepository};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sales_cannot_view_dashboard() {
        let viewer = Viewer {
            user_id: "sales-1".to_string(),
            role: Role::Sales,
            supplier_id: Some("sup1".to_string()),
        };
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = AnalyticsService::new(
            OrderRepository::new(Arc::clone(&db)),
            ComplaintRepository::new(db),
        );

        let result = service.dashboard(&viewer).await;

        assert!(matches!(result, Err(scp_common::AppError::Forbidden(_))));
    }
}
