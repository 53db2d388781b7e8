//! Incident service: supplier-internal issues with an audit log trail.
//!
//! Open -> InProgress -> Resolved, monotonic. Every mutation appends a log
//! entry.

use chrono::Utc;
use scp_common::{AppError, AppResult, IdGenerator};
use scp_db::{
    entities::{
        incident,
        incident::{IncidentPriority, IncidentStatus},
        incident_log,
    },
    repositories::{IncidentRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::access::{Viewer, Visibility};

/// Input for filing an incident.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateIncidentInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1, max = 4096))]
    pub description: String,

    pub priority: IncidentPriority,
}

/// Whether an incident may move from one status to another.
#[must_use]
pub const fn can_transition(from: IncidentStatus, to: IncidentStatus) -> bool {
    matches!(
        (from, to),
        (IncidentStatus::Open, IncidentStatus::InProgress)
            | (IncidentStatus::InProgress, IncidentStatus::Resolved)
    )
}

/// Incident service.
#[derive(Clone)]
pub struct IncidentService {
    incident_repo: IncidentRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl IncidentService {
    /// Create a new incident service.
    #[must_use]
    pub const fn new(incident_repo: IncidentRepository, user_repo: UserRepository) -> Self {
        Self {
            incident_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// File an incident for the viewer's company.
    pub async fn create(
        &self,
        viewer: &Viewer,
        input: CreateIncidentInput,
    ) -> AppResult<incident::Model> {
        let supplier_id = viewer.supplier_scope()?.to_string();

        input.validate()?;

        let model = incident::ActiveModel {
            id: Set(self.id_gen.generate()),
            supplier_id: Set(supplier_id),
            title: Set(input.title),
            description: Set(input.description),
            status: Set(IncidentStatus::Open),
            priority: Set(input.priority),
            reported_by: Set(viewer.user_id.clone()),
            assigned_to: Set(None),
            resolved_at: Set(None),
            archived: Set(false),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.incident_repo.create(model).await?;
        self.log(&created.id, viewer, "created", None, None, None)
            .await?;

        Ok(created)
    }

    /// Advance an incident's status.
    pub async fn set_status(
        &self,
        viewer: &Viewer,
        incident_id: &str,
        status: IncidentStatus,
        notes: Option<String>,
    ) -> AppResult<incident::Model> {
        viewer.require(viewer.permissions().can_manage_incidents, "manage incidents")?;

        let incident = self.incident_repo.get_by_id(incident_id).await?;
        incident.check_visible(viewer)?;

        if !can_transition(incident.status, status) {
            return Err(AppError::Conflict(format!(
                "Cannot move incident from {:?} to {:?}",
                incident.status, status
            )));
        }

        let old_status = incident.status;
        let mut active: incident::ActiveModel = incident.into();
        active.status = Set(status);
        if status == IncidentStatus::Resolved {
            active.resolved_at = Set(Some(Utc::now().into()));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.incident_repo.update(active).await?;
        let action = if status == IncidentStatus::Resolved {
            "resolved"
        } else {
            "status_changed"
        };
        self.log(
            &updated.id,
            viewer,
            action,
            Some(format!("{old_status:?}")),
            Some(format!("{status:?}")),
            notes,
        )
        .await?;

        Ok(updated)
    }

    /// Change an incident's priority.
    pub async fn set_priority(
        &self,
        viewer: &Viewer,
        incident_id: &str,
        priority: IncidentPriority,
        notes: Option<String>,
    ) -> AppResult<incident::Model> {
        viewer.require(viewer.permissions().can_manage_incidents, "manage incidents")?;

        let incident = self.incident_repo.get_by_id(incident_id).await?;
        incident.check_visible(viewer)?;

        let old_priority = incident.priority;
        let mut active: incident::ActiveModel = incident.into();
        active.priority = Set(priority);
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.incident_repo.update(active).await?;
        self.log(
            &updated.id,
            viewer,
            "priority_changed",
            Some(format!("{old_priority:?}")),
            Some(format!("{priority:?}")),
            notes,
        )
        .await?;

        Ok(updated)
    }

    /// Assign an incident to a staff member of the same company.
    pub async fn assign(
        &self,
        viewer: &Viewer,
        incident_id: &str,
        assignee_id: &str,
    ) -> AppResult<incident::Model> {
        viewer.require(viewer.permissions().can_manage_incidents, "manage incidents")?;
        let supplier_id = viewer.supplier_scope()?;

        let incident = self.incident_repo.get_by_id(incident_id).await?;
        incident.check_visible(viewer)?;

        let assignee = self.user_repo.get_by_id(assignee_id).await?;
        if !assignee.role.is_supplier_side()
            || assignee.supplier_id.as_deref() != Some(supplier_id)
        {
            return Err(AppError::BadRequest(
                "Assignee must be staff of the same supplier".to_string(),
            ));
        }

        let mut active: incident::ActiveModel = incident.into();
        active.assigned_to = Set(Some(assignee.id.clone()));
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.incident_repo.update(active).await?;
        self.log(
            &updated.id,
            viewer,
            "assigned",
            None,
            Some(assignee.email),
            None,
        )
        .await?;

        Ok(updated)
    }

    /// Get an incident visible to the viewer.
    pub async fn get(&self, viewer: &Viewer, incident_id: &str) -> AppResult<incident::Model> {
        let incident = self.incident_repo.get_by_id(incident_id).await?;
        incident.check_visible(viewer)?;
        Ok(incident)
    }

    /// List incidents of the viewer's company.
    pub async fn list(
        &self,
        viewer: &Viewer,
        status: Option<IncidentStatus>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<incident::Model>> {
        let supplier_id = viewer.supplier_scope()?;
        self.incident_repo
            .find_for_supplier(supplier_id, status, limit, until_id)
            .await
    }

    /// Audit log of an incident.
    pub async fn logs(
        &self,
        viewer: &Viewer,
        incident_id: &str,
    ) -> AppResult<Vec<incident_log::Model>> {
        let incident = self.incident_repo.get_by_id(incident_id).await?;
        incident.check_visible(viewer)?;

        self.incident_repo.find_logs(incident_id).await
    }

    async fn log(
        &self,
        incident_id: &str,
        viewer: &Viewer,
        action: &str,
        old_value: Option<String>,
        new_value: Option<String>,
        notes: Option<String>,
    ) -> AppResult<()> {
        let entry = incident_log::ActiveModel {
            id: Set(self.id_gen.generate()),
            incident_id: Set(incident_id.to_string()),
            user_id: Set(viewer.user_id.clone()),
            action: Set(action.to_string()),
            old_value: Set(old_value),
            new_value: Set(new_value),
            notes: Set(notes),
            created_at: Set(Utc::now().into()),
        };

        self.incident_repo.create_log(entry).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::access::Role;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn admin_viewer(supplier_id: &str) -> Viewer {
        Viewer {
            user_id: "admin-1".to_string(),
            role: Role::Admin,
            supplier_id: Some(supplier_id.to_string()),
        }
    }

    fn sales_viewer(supplier_id: &str) -> Viewer {
        Viewer {
            user_id: "sales-1".to_string(),
            role: Role::Sales,
            supplier_id: Some(supplier_id.to_string()),
        }
    }

    fn mock_incident(id: &str, supplier_id: &str, status: IncidentStatus) -> incident::Model {
        incident::Model {
            id: id.to_string(),
            supplier_id: supplier_id.to_string(),
            title: "Cold chain failure".to_string(),
            description: "Freezer truck 7 down".to_string(),
            status,
            priority: IncidentPriority::High,
            reported_by: "admin-1".to_string(),
            assigned_to: None,
            resolved_at: None,
            archived: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> IncidentService {
        IncidentService::new(
            IncidentRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        )
    }

    #[test]
    fn test_transition_matrix_is_monotonic() {
        use IncidentStatus::{InProgress, Open, Resolved};

        assert!(can_transition(Open, InProgress));
        assert!(can_transition(InProgress, Resolved));

        assert!(!can_transition(Open, Resolved));
        assert!(!can_transition(Resolved, Open));
        assert!(!can_transition(Resolved, InProgress));
        assert!(!can_transition(InProgress, Open));
    }

    #[tokio::test]
    async fn test_sales_cannot_manage_incidents() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(db)
            .set_status(&sales_viewer("sup1"), "i1", IncidentStatus::InProgress, None)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_resolve_from_open_is_conflict() {
        let open = mock_incident("i1", "sup1", IncidentStatus::Open);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[open]])
                .into_connection(),
        );

        let result = service(db)
            .set_status(&admin_viewer("sup1"), "i1", IncidentStatus::Resolved, None)
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_resolve_sets_resolved_at_and_logs() {
        let in_progress = mock_incident("i1", "sup1", IncidentStatus::InProgress);
        let resolved = incident::Model {
            status: IncidentStatus::Resolved,
            resolved_at: Some(Utc::now().into()),
            ..in_progress.clone()
        };
        let log_entry = incident_log::Model {
            id: "log-1".to_string(),
            incident_id: "i1".to_string(),
            user_id: "admin-1".to_string(),
            action: "resolved".to_string(),
            old_value: Some("InProgress".to_string()),
            new_value: Some("Resolved".to_string()),
            notes: None,
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![in_progress]])
                .append_query_results([vec![resolved]])
                .append_query_results([vec![log_entry]])
                .into_connection(),
        );

        let result = service(db)
            .set_status(&admin_viewer("sup1"), "i1", IncidentStatus::Resolved, None)
            .await
            .unwrap();

        assert_eq!(result.status, IncidentStatus::Resolved);
        assert!(result.resolved_at.is_some());
    }
}
