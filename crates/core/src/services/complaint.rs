//! Complaint service.
//!
//! Open -> InProgress | Escalated, InProgress -> Resolved | Escalated,
//! Escalated -> InProgress | Resolved, Resolved -> Closed. Closed is
//! terminal. Escalation is a status, not a flag.

use chrono::Utc;
use scp_common::{AppError, AppResult, IdGenerator};
use scp_db::{
    entities::{complaint, complaint::ComplaintStatus},
    repositories::{ChatRepository, ComplaintRepository, OrderRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::access::{Role, Viewer, Visibility};

/// Input for filing a complaint.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateComplaintInput {
    pub order_id: String,

    #[validate(length(min = 1, max = 256))]
    pub subject: String,

    #[validate(length(min = 1, max = 4096))]
    pub description: String,
}

/// Whether a complaint may move from one status to another.
#[must_use]
pub const fn can_transition(from: ComplaintStatus, to: ComplaintStatus) -> bool {
    matches!(
        (from, to),
        (
            ComplaintStatus::Open,
            ComplaintStatus::InProgress | ComplaintStatus::Escalated
        ) | (
            ComplaintStatus::InProgress,
            ComplaintStatus::Resolved | ComplaintStatus::Escalated
        ) | (
            ComplaintStatus::Escalated,
            ComplaintStatus::InProgress | ComplaintStatus::Resolved
        ) | (ComplaintStatus::Resolved, ComplaintStatus::Closed)
    )
}

/// Complaint service.
#[derive(Clone)]
pub struct ComplaintService {
    complaint_repo: ComplaintRepository,
    order_repo: OrderRepository,
    chat_repo: ChatRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl ComplaintService {
    /// Create a new complaint service.
    #[must_use]
    pub const fn new(
        complaint_repo: ComplaintRepository,
        order_repo: OrderRepository,
        chat_repo: ChatRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            complaint_repo,
            order_repo,
            chat_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// File a complaint about an order.
    pub async fn create(
        &self,
        viewer: &Viewer,
        input: CreateComplaintInput,
    ) -> AppResult<complaint::Model> {
        viewer.require_consumer("file complaints")?;

        input.validate()?;

        let order = self.order_repo.get_by_id(&input.order_id).await?;
        if order.consumer_id != viewer.user_id {
            return Err(AppError::Forbidden(
                "Complaints may only reference your own orders".to_string(),
            ));
        }

        // Attach the partnership thread when the pair has one.
        let thread_id = self
            .chat_repo
            .find_thread_by_pair(&order.supplier_id, &viewer.user_id)
            .await?
            .map(|t| t.id);

        let model = complaint::ActiveModel {
            id: Set(self.id_gen.generate()),
            order_id: Set(order.id),
            thread_id: Set(thread_id),
            reported_by: Set(viewer.user_id.clone()),
            supplier_id: Set(order.supplier_id),
            subject: Set(input.subject),
            description: Set(input.description),
            status: Set(ComplaintStatus::Open),
            assigned_to: Set(None),
            resolution: Set(None),
            escalated_at: Set(None),
            escalated_by: Set(None),
            closed_at: Set(None),
            archived: Set(false),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.complaint_repo.create(model).await
    }

    /// Advance a complaint along the status machine (supplier side).
    pub async fn set_status(
        &self,
        viewer: &Viewer,
        complaint_id: &str,
        status: ComplaintStatus,
        resolution: Option<String>,
    ) -> AppResult<complaint::Model> {
        viewer.require(
            viewer.permissions().can_handle_complaints,
            "handle complaints",
        )?;
        viewer.supplier_scope()?;

        if status == ComplaintStatus::Escalated {
            viewer.require(viewer.permissions().can_escalate, "escalate complaints")?;
        }

        let complaint = self.complaint_repo.get_by_id(complaint_id).await?;
        complaint.check_visible(viewer)?;

        if !can_transition(complaint.status, status) {
            return Err(AppError::Conflict(format!(
                "Cannot move complaint from {:?} to {:?}",
                complaint.status, status
            )));
        }

        let mut active: complaint::ActiveModel = complaint.into();
        active.status = Set(status);
        active.updated_at = Set(Some(Utc::now().into()));

        match status {
            ComplaintStatus::Escalated => {
                active.escalated_at = Set(Some(Utc::now().into()));
                active.escalated_by = Set(Some(viewer.user_id.clone()));
            }
            ComplaintStatus::Resolved => {
                if let Some(resolution) = resolution {
                    active.resolution = Set(Some(resolution));
                }
            }
            ComplaintStatus::Closed => {
                active.closed_at = Set(Some(Utc::now().into()));
            }
            ComplaintStatus::Open | ComplaintStatus::InProgress => {}
        }

        self.complaint_repo.update(active).await
    }

    /// Assign a complaint to a staff member of the same company.
    pub async fn assign(
        &self,
        viewer: &Viewer,
        complaint_id: &str,
        assignee_id: &str,
    ) -> AppResult<complaint::Model> {
        viewer.require(
            viewer.permissions().can_handle_complaints,
            "handle complaints",
        )?;
        let supplier_id = viewer.supplier_scope()?;

        let complaint = self.complaint_repo.get_by_id(complaint_id).await?;
        complaint.check_visible(viewer)?;

        let assignee = self.user_repo.get_by_id(assignee_id).await?;
        if !assignee.role.is_supplier_side()
            || assignee.supplier_id.as_deref() != Some(supplier_id)
        {
            return Err(AppError::BadRequest(
                "Assignee must be staff of the same supplier".to_string(),
            ));
        }

        let mut active: complaint::ActiveModel = complaint.into();
        active.assigned_to = Set(Some(assignee.id));
        active.updated_at = Set(Some(Utc::now().into()));

        self.complaint_repo.update(active).await
    }

    /// Get a complaint visible to the viewer.
    pub async fn get(&self, viewer: &Viewer, complaint_id: &str) -> AppResult<complaint::Model> {
        let complaint = self.complaint_repo.get_by_id(complaint_id).await?;
        complaint.check_visible(viewer)?;
        Ok(complaint)
    }

    /// List complaints in the viewer's scope.
    pub async fn list(
        &self,
        viewer: &Viewer,
        status: Option<ComplaintStatus>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<complaint::Model>> {
        if viewer.role == Role::Consumer {
            let complaints = self
                .complaint_repo
                .find_for_consumer(&viewer.user_id, limit, until_id)
                .await?;
            Ok(match status {
                Some(s) => complaints.into_iter().filter(|c| c.status == s).collect(),
                None => complaints,
            })
        } else {
            let supplier_id = viewer.supplier_scope()?;
            self.complaint_repo
                .find_for_supplier(supplier_id, status, limit, until_id)
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn mock_complaint(id: &str, supplier_id: &str, status: ComplaintStatus) -> complaint::Model {
        complaint::Model {
            id: id.to_string(),
            order_id: "o1".to_string(),
            thread_id: None,
            reported_by: "consumer-1".to_string(),
            supplier_id: supplier_id.to_string(),
            subject: "Damaged goods".to_string(),
            description: "Half the crates arrived crushed".to_string(),
            status,
            assigned_to: None,
            resolution: None,
            escalated_at: None,
            escalated_by: None,
            closed_at: None,
            archived: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> ComplaintService {
        ComplaintService::new(
            ComplaintRepository::new(Arc::clone(&db)),
            OrderRepository::new(Arc::clone(&db)),
            ChatRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        )
    }

    #[test]
    fn test_transition_matrix() {
        use ComplaintStatus::{Closed, Escalated, InProgress, Open, Resolved};

        assert!(can_transition(Open, InProgress));
        assert!(can_transition(Open, Escalated));
        assert!(can_transition(InProgress, Resolved));
        assert!(can_transition(InProgress, Escalated));
        assert!(can_transition(Escalated, InProgress));
        assert!(can_transition(Escalated, Resolved));
        assert!(can_transition(Resolved, Closed));

        assert!(!can_transition(Open, Resolved));
        assert!(!can_transition(Open, Closed));
        assert!(!can_transition(Resolved, Open));
        assert!(!can_transition(Closed, InProgress));
        assert!(!can_transition(Closed, Open));
        assert!(!can_transition(Escalated, Closed));
    }

    #[tokio::test]
    async fn test_supplier_cannot_file_complaints() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let input = CreateComplaintInput {
            order_id: "o1".to_string(),
            subject: "Late delivery".to_string(),
            description: "Two days late".to_string(),
        };
        let result = service(db).create(&sales_viewer("sup1"), input).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_consumer_cannot_advance_status() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(db)
            .set_status(&consumer_viewer(), "c1", ComplaintStatus::InProgress, None)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_open_to_closed_is_conflict() {
        let open = mock_complaint("c1", "sup1", ComplaintStatus::Open);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[open]])
                .into_connection(),
        );

        let result = service(db)
            .set_status(&sales_viewer("sup1"), "c1", ComplaintStatus::Closed, None)
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_escalate_sets_escalation_fields() {
        let open = mock_complaint("c1", "sup1", ComplaintStatus::Open);
        let escalated = complaint::Model {
            status: ComplaintStatus::Escalated,
            escalated_at: Some(Utc::now().into()),
            escalated_by: Some("sales-1".to_string()),
            ..open.clone()
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![open]])
                .append_query_results([vec![escalated]])
                .into_connection(),
        );

        let result = service(db)
            .set_status(&sales_viewer("sup1"), "c1", ComplaintStatus::Escalated, None)
            .await
            .unwrap();

        assert_eq!(result.status, ComplaintStatus::Escalated);
        assert!(result.escalated_at.is_some());
        assert_eq!(result.escalated_by.as_deref(), Some("sales-1"));
    }

    #[tokio::test]
    async fn test_set_status_on_missing_complaint_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<complaint::Model>::new()])
                .into_connection(),
        );

        let result = service(db)
            .set_status(
                &sales_viewer("sup1"),
                "missing",
                ComplaintStatus::InProgress,
                None,
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
