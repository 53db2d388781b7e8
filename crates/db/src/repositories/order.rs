//! Order repository.

use std::sync::Arc;

use crate::entities::{Order, OrderItem, order, order_item};
use scp_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};

/// Order repository for database operations.
#[derive(Clone)]
pub struct OrderRepository {
    db: Arc<DatabaseConnection>,
}

impl OrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an order by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<order::Model>> {
        Order::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an order by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<order::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order not found: {id}")))
    }

    /// Create an order together with its items, atomically.
    pub async fn create_with_items(
        &self,
        order: order::ActiveModel,
        items: Vec<order_item::ActiveModel>,
    ) -> AppResult<order::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = order
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        for item in items {
            item.insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Update an order.
    pub async fn update(&self, model: order::ActiveModel) -> AppResult<order::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Items of an order, in insertion (id) order.
    pub async fn find_items(&self, order_id: &str) -> AppResult<Vec<order_item::Model>> {
        OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Orders of a consumer, archived excluded, optionally by status (paginated).
    pub async fn find_for_consumer(
        &self,
        consumer_id: &str,
        status: Option<order::OrderStatus>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<order::Model>> {
        let mut query = Order::find()
            .filter(order::Column::ConsumerId.eq(consumer_id))
            .filter(order::Column::Archived.eq(false))
            .order_by_desc(order::Column::Id);

        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status));
        }

        if let Some(id) = until_id {
            query = query.filter(order::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Orders of a supplier, archived excluded, optionally by status (paginated).
    pub async fn find_for_supplier(
        &self,
        supplier_id: &str,
        status: Option<order::OrderStatus>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<order::Model>> {
        let mut query = Order::find()
            .filter(order::Column::SupplierId.eq(supplier_id))
            .filter(order::Column::Archived.eq(false))
            .order_by_desc(order::Column::Id);

        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status));
        }

        if let Some(id) = until_id {
            query = query.filter(order::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a supplier's orders, optionally by status.
    pub async fn count_for_supplier(
        &self,
        supplier_id: &str,
        status: Option<order::OrderStatus>,
    ) -> AppResult<u64> {
        let mut query = Order::find()
            .filter(order::Column::SupplierId.eq(supplier_id))
            .filter(order::Column::Archived.eq(false));

        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Sum of order totals for a supplier over the given statuses.
    pub async fn sum_totals_for_supplier(
        &self,
        supplier_id: &str,
        statuses: &[order::OrderStatus],
    ) -> AppResult<i64> {
        use sea_orm::FromQueryResult;
        use sea_orm::sea_query::Alias;

        #[derive(FromQueryResult)]
        struct SumResult {
            total: Option<i64>,
        }

        // SUM(bigint) is NUMERIC in Postgres; cast back down
        let result = Order::find()
            .filter(order::Column::SupplierId.eq(supplier_id))
            .filter(order::Column::Status.is_in(statuses.iter().copied()))
            .filter(order::Column::Archived.eq(false))
            .select_only()
            .column_as(
                order::Column::TotalKzt.sum().cast_as(Alias::new("BIGINT")),
                "total",
            )
            .into_model::<SumResult>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.and_then(|r| r.total).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::order::OrderStatus;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_order(id: &str, supplier_id: &str, consumer_id: &str) -> order::Model {
        order::Model {
            id: id.to_string(),
            supplier_id: supplier_id.to_string(),
            consumer_id: consumer_id.to_string(),
            status: OrderStatus::Pending,
            total_kzt: 52_000,
            notes: None,
            responded_at: None,
            responded_by: None,
            archived: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let order = create_test_order("o1", "sup1", "con1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[order.clone()]])
                .into_connection(),
        );

        let repo = OrderRepository::new(db);
        let result = repo.find_by_id("o1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().total_kzt, 52_000);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<order::Model>::new()])
                .into_connection(),
        );

        let repo = OrderRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
