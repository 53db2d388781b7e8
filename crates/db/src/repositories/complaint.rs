//! Complaint repository.

use std::sync::Arc;

use crate::entities::{Complaint, complaint};
use scp_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Complaint repository for database operations.
#[derive(Clone)]
pub struct ComplaintRepository {
    db: Arc<DatabaseConnection>,
}

impl ComplaintRepository {
    /// Create a new complaint repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a complaint by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<complaint::Model>> {
        Complaint::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a complaint by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<complaint::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Complaint not found: {id}")))
    }

    /// Create a new complaint.
    pub async fn create(&self, model: complaint::ActiveModel) -> AppResult<complaint::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a complaint.
    pub async fn update(&self, model: complaint::ActiveModel) -> AppResult<complaint::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Complaints filed by a consumer, archived excluded (paginated).
    pub async fn find_for_consumer(
        &self,
        reporter_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<complaint::Model>> {
        let mut query = Complaint::find()
            .filter(complaint::Column::ReportedBy.eq(reporter_id))
            .filter(complaint::Column::Archived.eq(false))
            .order_by_desc(complaint::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(complaint::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Complaints against a supplier, archived excluded, optionally by status (paginated).
    pub async fn find_for_supplier(
        &self,
        supplier_id: &str,
        status: Option<complaint::ComplaintStatus>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<complaint::Model>> {
        let mut query = Complaint::find()
            .filter(complaint::Column::SupplierId.eq(supplier_id))
            .filter(complaint::Column::Archived.eq(false))
            .order_by_desc(complaint::Column::Id);

        if let Some(status) = status {
            query = query.filter(complaint::Column::Status.eq(status));
        }

        if let Some(id) = until_id {
            query = query.filter(complaint::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count open complaints against a supplier.
    pub async fn count_open_for_supplier(&self, supplier_id: &str) -> AppResult<u64> {
        Complaint::find()
            .filter(complaint::Column::SupplierId.eq(supplier_id))
            .filter(complaint::Column::Status.eq(complaint::ComplaintStatus::Open))
            .filter(complaint::Column::Archived.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
