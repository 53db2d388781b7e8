//! Product repository.

use std::sync::Arc;

use crate::entities::{Product, product};
use scp_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Product repository for database operations.
#[derive(Clone)]
pub struct ProductRepository {
    db: Arc<DatabaseConnection>,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a product by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<product::Model>> {
        Product::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a product by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<product::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product not found: {id}")))
    }

    /// Create a new product.
    pub async fn create(&self, model: product::ActiveModel) -> AppResult<product::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a product.
    pub async fn update(&self, model: product::ActiveModel) -> AppResult<product::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Products of one supplier (paginated). Archived rows are excluded
    /// unless `include_archived` is set.
    pub async fn find_for_supplier(
        &self,
        supplier_id: &str,
        include_archived: bool,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<product::Model>> {
        let mut query = Product::find()
            .filter(product::Column::SupplierId.eq(supplier_id))
            .order_by_desc(product::Column::Id);

        if !include_archived {
            query = query.filter(product::Column::Archived.eq(false));
        }

        if let Some(id) = until_id {
            query = query.filter(product::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Products of many suppliers, archived excluded (the consumer catalog view).
    pub async fn find_for_suppliers(
        &self,
        supplier_ids: &[String],
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<product::Model>> {
        if supplier_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = Product::find()
            .filter(product::Column::SupplierId.is_in(supplier_ids.iter().cloned()))
            .filter(product::Column::Archived.eq(false))
            .order_by_desc(product::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(product::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_product(id: &str, supplier_id: &str, price_kzt: i64) -> product::Model {
        product::Model {
            id: id.to_string(),
            supplier_id: supplier_id.to_string(),
            name: "Flour".to_string(),
            description: None,
            unit: "kg".to_string(),
            price_kzt,
            stock: 500,
            moq: 10,
            archived: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let product = create_test_product("p1", "sup1", 180);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[product.clone()]])
                .into_connection(),
        );

        let repo = ProductRepository::new(db);
        let result = repo.find_by_id("p1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().price_kzt, 180);
    }

    #[tokio::test]
    async fn test_default_listing_excludes_archived() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<product::Model>::new()])
                .append_query_results([Vec::<product::Model>::new()])
                .into_connection(),
        );

        let repo = ProductRepository::new(Arc::clone(&db));
        repo.find_for_supplier("sup1", false, 10, None).await.unwrap();
        repo.find_for_supplier("sup1", true, 10, None).await.unwrap();
        drop(repo);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let default_listing = format!("{:?}", log[0]);
        let with_archived = format!("{:?}", log[1]);

        assert!(default_listing.contains("archived"));
        assert!(!with_archived.contains("archived"));
    }

    #[tokio::test]
    async fn test_find_for_suppliers_empty_ids_short_circuits() {
        // No query should be issued at all
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = ProductRepository::new(db);
        let result = repo.find_for_suppliers(&[], 10, None).await.unwrap();

        assert!(result.is_empty());
    }
}
