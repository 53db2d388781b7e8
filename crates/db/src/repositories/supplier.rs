//! Supplier repository.

use std::sync::Arc;

use crate::entities::{Supplier, supplier};
use scp_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Supplier repository for database operations.
#[derive(Clone)]
pub struct SupplierRepository {
    db: Arc<DatabaseConnection>,
}

impl SupplierRepository {
    /// Create a new supplier repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a supplier by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<supplier::Model>> {
        Supplier::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a supplier by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<supplier::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Supplier not found: {id}")))
    }

    /// Create a new supplier.
    pub async fn create(&self, model: supplier::ActiveModel) -> AppResult<supplier::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a supplier.
    pub async fn update(&self, model: supplier::ActiveModel) -> AppResult<supplier::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List active, verified suppliers (the set consumers may request links to).
    pub async fn find_linkable(
        &self,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<supplier::Model>> {
        let mut query = Supplier::find()
            .filter(supplier::Column::IsActive.eq(true))
            .filter(supplier::Column::IsVerified.eq(true))
            .order_by_desc(supplier::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(supplier::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
