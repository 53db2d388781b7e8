//! Order service: creation with point-in-time pricing and the order state
//! machine.
//!
//! Pending -> Accepted | Rejected, Accepted -> Completed | Cancelled.

use chrono::Utc;
use scp_common::{AppError, AppResult, IdGenerator};
use scp_db::{
    entities::{order, order::OrderStatus, order_item},
    repositories::{LinkRepository, OrderRepository, ProductRepository},
};
use sea_orm::Set;
use serde::Deserialize;

use crate::services::access::{Role, Viewer, Visibility};

/// One requested line of a new order.
#[derive(Debug, Deserialize)]
pub struct OrderItemInput {
    pub product_id: String,
    pub quantity: i32,
}

/// Input for creating an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub supplier_id: String,
    pub items: Vec<OrderItemInput>,
    pub notes: Option<String>,
}

/// An order together with its items.
#[derive(Debug)]
pub struct OrderWithItems {
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

/// Order service.
#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    product_repo: ProductRepository,
    link_repo: LinkRepository,
    id_gen: IdGenerator,
}

impl OrderService {
    /// Create a new order service.
    #[must_use]
    pub const fn new(
        order_repo: OrderRepository,
        product_repo: ProductRepository,
        link_repo: LinkRepository,
    ) -> Self {
        Self {
            order_repo,
            product_repo,
            link_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Place a new order.
    ///
    /// Requires an approved link to the supplier. Prices, product names and
    /// units are snapshotted from the catalog at this moment; the order
    /// total is the sum of line totals.
    pub async fn create(&self, viewer: &Viewer, input: CreateOrderInput) -> AppResult<order::Model> {
        viewer.require_consumer("place orders")?;

        if input.items.is_empty() {
            return Err(AppError::BadRequest(
                "Order must contain at least one item".to_string(),
            ));
        }

        if !self
            .link_repo
            .is_linked(&input.supplier_id, &viewer.user_id)
            .await?
        {
            return Err(AppError::Forbidden(
                "Not linked to this supplier".to_string(),
            ));
        }

        let order_id = self.id_gen.generate();
        let mut item_models = Vec::with_capacity(input.items.len());
        let mut total_kzt: i64 = 0;

        for item in &input.items {
            let product = self.product_repo.get_by_id(&item.product_id).await?;

            if product.supplier_id != input.supplier_id {
                return Err(AppError::BadRequest(format!(
                    "Product {} belongs to another supplier",
                    product.id
                )));
            }
            if product.archived {
                return Err(AppError::BadRequest(format!(
                    "Product {} is no longer available",
                    product.id
                )));
            }
            if item.quantity < product.moq {
                return Err(AppError::BadRequest(format!(
                    "Quantity {} is below the minimum order quantity {} for {}",
                    item.quantity, product.moq, product.name
                )));
            }
            if item.quantity > product.stock {
                return Err(AppError::BadRequest(format!(
                    "Quantity {} exceeds stock {} for {}",
                    item.quantity, product.stock, product.name
                )));
            }

            let line = line_total(product.price_kzt, item.quantity)?;
            total_kzt = total_kzt
                .checked_add(line)
                .ok_or_else(|| AppError::BadRequest("Order total overflows".to_string()))?;

            item_models.push(order_item::ActiveModel {
                id: Set(self.id_gen.generate()),
                order_id: Set(order_id.clone()),
                product_id: Set(product.id),
                product_name: Set(product.name),
                unit: Set(product.unit),
                quantity: Set(item.quantity),
                price_kzt: Set(product.price_kzt),
                total_kzt: Set(line),
            });
        }

        let order_model = order::ActiveModel {
            id: Set(order_id),
            supplier_id: Set(input.supplier_id),
            consumer_id: Set(viewer.user_id.clone()),
            status: Set(OrderStatus::Pending),
            total_kzt: Set(total_kzt),
            notes: Set(input.notes),
            responded_at: Set(None),
            responded_by: Set(None),
            archived: Set(false),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.order_repo
            .create_with_items(order_model, item_models)
            .await
    }

    /// Accept a pending order (supplier side).
    pub async fn accept(&self, viewer: &Viewer, order_id: &str) -> AppResult<order::Model> {
        self.respond(viewer, order_id, OrderStatus::Accepted).await
    }

    /// Reject a pending order (supplier side).
    pub async fn reject(&self, viewer: &Viewer, order_id: &str) -> AppResult<order::Model> {
        self.respond(viewer, order_id, OrderStatus::Rejected).await
    }

    /// Complete an accepted order (supplier side).
    pub async fn complete(&self, viewer: &Viewer, order_id: &str) -> AppResult<order::Model> {
        viewer.require(viewer.permissions().can_manage_orders, "manage orders")?;
        viewer.supplier_scope()?;

        let order = self.order_repo.get_by_id(order_id).await?;
        order.check_visible(viewer)?;

        if order.status != OrderStatus::Accepted {
            return Err(AppError::Conflict(format!(
                "Cannot complete a {:?} order",
                order.status
            )));
        }

        let mut active: order::ActiveModel = order.into();
        active.status = Set(OrderStatus::Completed);
        active.updated_at = Set(Some(Utc::now().into()));

        self.order_repo.update(active).await
    }

    /// Cancel an accepted order. Allowed to the originating consumer or a
    /// supplier-side actor.
    pub async fn cancel(&self, viewer: &Viewer, order_id: &str) -> AppResult<order::Model> {
        viewer.require(viewer.permissions().can_manage_orders, "manage orders")?;

        let order = self.order_repo.get_by_id(order_id).await?;
        order.check_visible(viewer)?;

        if order.status != OrderStatus::Accepted {
            return Err(AppError::Conflict(format!(
                "Cannot cancel a {:?} order",
                order.status
            )));
        }

        let mut active: order::ActiveModel = order.into();
        active.status = Set(OrderStatus::Cancelled);
        active.updated_at = Set(Some(Utc::now().into()));

        self.order_repo.update(active).await
    }

    /// Get an order with its items, in the viewer's scope.
    pub async fn get(&self, viewer: &Viewer, order_id: &str) -> AppResult<OrderWithItems> {
        let order = self.order_repo.get_by_id(order_id).await?;
        order.check_visible(viewer)?;

        let items = self.order_repo.find_items(&order.id).await?;
        Ok(OrderWithItems { order, items })
    }

    /// List orders in the viewer's scope.
    pub async fn list(
        &self,
        viewer: &Viewer,
        status: Option<OrderStatus>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<order::Model>> {
        if viewer.role == Role::Consumer {
            self.order_repo
                .find_for_consumer(&viewer.user_id, status, limit, until_id)
                .await
        } else {
            let supplier_id = viewer.supplier_scope()?;
            self.order_repo
                .find_for_supplier(supplier_id, status, limit, until_id)
                .await
        }
    }

    /// Shared accept/reject transition: Pending only, supplier side.
    async fn respond(
        &self,
        viewer: &Viewer,
        order_id: &str,
        status: OrderStatus,
    ) -> AppResult<order::Model> {
        viewer.require(viewer.permissions().can_manage_orders, "manage orders")?;
        viewer.supplier_scope()?;

        let order = self.order_repo.get_by_id(order_id).await?;
        order.check_visible(viewer)?;

        if order.status != OrderStatus::Pending {
            return Err(AppError::Conflict(
                "Order has already been processed".to_string(),
            ));
        }

        let mut active: order::ActiveModel = order.into();
        active.status = Set(status);
        active.responded_at = Set(Some(Utc::now().into()));
        active.responded_by = Set(Some(viewer.user_id.clone()));
        active.updated_at = Set(Some(Utc::now().into()));

        self.order_repo.update(active).await
    }
}

/// Line total with overflow checking.
fn line_total(price_kzt: i64, quantity: i32) -> AppResult<i64> {
    price_kzt
        .checked_mul(i64::from(quantity))
        .ok_or_else(|| AppError::BadRequest("Line total overflows".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scp_db::entities::{link, link::LinkStatus, product};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn consumer_viewer() -> Viewer {
        Viewer {
            user_id: "consumer-1".to_string(),
            role: Role::Consumer,
            supplier_id: None,
        }
    }

    fn sales_viewer(supplier_id: &str) -> Viewer {
        Viewer {
            user_id: "sales-1".to_string(),
            role: Role::Sales,
            supplier_id: Some(supplier_id.to_string()),
        }
    }

    fn approved_link(supplier_id: &str, consumer_id: &str) -> link::Model {
        link::Model {
            id: "l1".to_string(),
            supplier_id: supplier_id.to_string(),
            consumer_id: consumer_id.to_string(),
            status: LinkStatus::Approved,
            requested_at: Utc::now().into(),
            responded_at: None,
            responded_by: None,
            archived: false,
        }
    }

    fn mock_product(id: &str, supplier_id: &str, price_kzt: i64, moq: i32, stock: i32) -> product::Model {
        product::Model {
            id: id.to_string(),
            supplier_id: supplier_id.to_string(),
            name: format!("Product {id}"),
            description: None,
            unit: "kg".to_string(),
            price_kzt,
            stock,
            moq,
            archived: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn mock_order(id: &str, supplier_id: &str, status: OrderStatus) -> order::Model {
        order::Model {
            id: id.to_string(),
            supplier_id: supplier_id.to_string(),
            consumer_id: "consumer-1".to_string(),
            status,
            total_kzt: 52_000,
            notes: None,
            responded_at: None,
            responded_by: None,
            archived: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> OrderService {
        OrderService::new(
            OrderRepository::new(Arc::clone(&db)),
            ProductRepository::new(Arc::clone(&db)),
            LinkRepository::new(db),
        )
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(180, 100).unwrap(), 18_000);
        assert_eq!(line_total(850, 40).unwrap(), 34_000);
        assert!(line_total(i64::MAX, 2).is_err());
    }

    #[tokio::test]
    async fn test_create_order_computes_total_from_snapshots() {
        // Items [{price 180, qty 100}, {price 850, qty 40}] -> 52 000 KZT
        let created = order::Model {
            total_kzt: 52_000,
            ..mock_order("o1", "sup1", OrderStatus::Pending)
        };
        let item1 = order_item::Model {
            id: "i1".to_string(),
            order_id: "o1".to_string(),
            product_id: "p1".to_string(),
            product_name: "Product p1".to_string(),
            unit: "kg".to_string(),
            quantity: 100,
            price_kzt: 180,
            total_kzt: 18_000,
        };
        let item2 = order_item::Model {
            id: "i2".to_string(),
            order_id: "o1".to_string(),
            product_id: "p2".to_string(),
            product_name: "Product p2".to_string(),
            unit: "kg".to_string(),
            quantity: 40,
            price_kzt: 850,
            total_kzt: 34_000,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // link check, two product lookups, then the insert transaction
                .append_query_results([vec![approved_link("sup1", "consumer-1")]])
                .append_query_results([vec![mock_product("p1", "sup1", 180, 1, 1000)]])
                .append_query_results([vec![mock_product("p2", "sup1", 850, 1, 1000)]])
                .append_query_results([vec![created]])
                .append_query_results([vec![item1]])
                .append_query_results([vec![item2]])
                .into_connection(),
        );

        let input = CreateOrderInput {
            supplier_id: "sup1".to_string(),
            items: vec![
                OrderItemInput {
                    product_id: "p1".to_string(),
                    quantity: 100,
                },
                OrderItemInput {
                    product_id: "p2".to_string(),
                    quantity: 40,
                },
            ],
            notes: None,
        };

        let result = service(db).create(&consumer_viewer(), input).await.unwrap();

        assert_eq!(result.status, OrderStatus::Pending);
        assert_eq!(result.total_kzt, 52_000);
    }

    #[tokio::test]
    async fn test_create_order_without_link_is_forbidden() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<link::Model>::new()])
                .into_connection(),
        );

        let input = CreateOrderInput {
            supplier_id: "sup1".to_string(),
            items: vec![OrderItemInput {
                product_id: "p1".to_string(),
                quantity: 10,
            }],
            notes: None,
        };

        let result = service(db).create(&consumer_viewer(), input).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_order_below_moq_is_rejected() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![approved_link("sup1", "consumer-1")]])
                .append_query_results([vec![mock_product("p1", "sup1", 180, 50, 1000)]])
                .into_connection(),
        );

        let input = CreateOrderInput {
            supplier_id: "sup1".to_string(),
            items: vec![OrderItemInput {
                product_id: "p1".to_string(),
                quantity: 10,
            }],
            notes: None,
        };

        let result = service(db).create(&consumer_viewer(), input).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_order_with_empty_items_is_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let input = CreateOrderInput {
            supplier_id: "sup1".to_string(),
            items: vec![],
            notes: None,
        };

        let result = service(db).create(&consumer_viewer(), input).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_supplier_cannot_place_orders() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let input = CreateOrderInput {
            supplier_id: "sup1".to_string(),
            items: vec![OrderItemInput {
                product_id: "p1".to_string(),
                quantity: 10,
            }],
            notes: None,
        };

        let result = service(db).create(&sales_viewer("sup1"), input).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_accept_pending_order() {
        let pending = mock_order("o1", "sup1", OrderStatus::Pending);
        let accepted = order::Model {
            status: OrderStatus::Accepted,
            responded_at: Some(Utc::now().into()),
            responded_by: Some("sales-1".to_string()),
            ..pending.clone()
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![pending]])
                .append_query_results([vec![accepted]])
                .into_connection(),
        );

        let result = service(db)
            .accept(&sales_viewer("sup1"), "o1")
            .await
            .unwrap();

        assert_eq!(result.status, OrderStatus::Accepted);
        assert!(result.responded_at.is_some());
    }

    #[tokio::test]
    async fn test_accept_missing_order_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<order::Model>::new()])
                .into_connection(),
        );

        let result = service(db).accept(&sales_viewer("sup1"), "missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_consumer_cannot_accept() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(db).accept(&consumer_viewer(), "o1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_complete_requires_accepted() {
        let pending = mock_order("o1", "sup1", OrderStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[pending]])
                .into_connection(),
        );

        let result = service(db).complete(&sales_viewer("sup1"), "o1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_consumer_can_cancel_own_accepted_order() {
        let accepted = mock_order("o1", "sup1", OrderStatus::Accepted);
        let cancelled = order::Model {
            status: OrderStatus::Cancelled,
            ..accepted.clone()
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![accepted]])
                .append_query_results([vec![cancelled]])
                .into_connection(),
        );

        let result = service(db).cancel(&consumer_viewer(), "o1").await.unwrap();

        assert_eq!(result.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_other_consumer_cannot_cancel() {
        let accepted = mock_order("o1", "sup1", OrderStatus::Accepted);
        let other = Viewer {
            user_id: "consumer-2".to_string(),
            role: Role::Consumer,
            supplier_id: None,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[accepted]])
                .into_connection(),
        );

        let result = service(db).cancel(&other, "o1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
