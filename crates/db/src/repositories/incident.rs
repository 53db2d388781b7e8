//! Incident repository.

use std::sync::Arc;

use crate::entities::{Incident, IncidentLog, incident, incident_log};
use scp_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Incident repository for database operations.
#[derive(Clone)]
pub struct IncidentRepository {
    db: Arc<DatabaseConnection>,
}

impl IncidentRepository {
    /// Create a new incident repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an incident by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<incident::Model>> {
        Incident::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an incident by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<incident::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Incident not found: {id}")))
    }

    /// Create a new incident.
    pub async fn create(&self, model: incident::ActiveModel) -> AppResult<incident::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an incident.
    pub async fn update(&self, model: incident::ActiveModel) -> AppResult<incident::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Incidents of a supplier, archived excluded, optionally by status (paginated).
    pub async fn find_for_supplier(
        &self,
        supplier_id: &str,
        status: Option<incident::IncidentStatus>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<incident::Model>> {
        let mut query = Incident::find()
            .filter(incident::Column::SupplierId.eq(supplier_id))
            .filter(incident::Column::Archived.eq(false))
            .order_by_desc(incident::Column::Id);

        if let Some(status) = status {
            query = query.filter(incident::Column::Status.eq(status));
        }

        if let Some(id) = until_id {
            query = query.filter(incident::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Append a log entry.
    pub async fn create_log(
        &self,
        model: incident_log::ActiveModel,
    ) -> AppResult<incident_log::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Log entries of an incident, oldest first.
    pub async fn find_logs(&self, incident_id: &str) -> AppResult<Vec<incident_log::Model>> {
        IncidentLog::find()
            .filter(incident_log::Column::IncidentId.eq(incident_id))
            .order_by_asc(incident_log::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
