//! Link service: the consumer-supplier partnership state machine.
//!
//! Pending -> Approved | Declined, and Pending | Approved -> Blocked.
//! Declined and Blocked are terminal. Every transition on a missing link is
//! a `NotFound` error, every bad edge a `Conflict`.

use chrono::Utc;
use scp_common::{AppError, AppResult, IdGenerator};
use scp_db::{
    entities::{chat_thread, link, link::LinkStatus},
    repositories::{ChatRepository, LinkRepository, SupplierRepository},
};
use sea_orm::Set;

use crate::services::access::{Role, Viewer, Visibility};

/// Link service.
#[derive(Clone)]
pub struct LinkService {
    link_repo: LinkRepository,
    supplier_repo: SupplierRepository,
    chat_repo: ChatRepository,
    id_gen: IdGenerator,
}

impl LinkService {
    /// Create a new link service.
    #[must_use]
    pub const fn new(
        link_repo: LinkRepository,
        supplier_repo: SupplierRepository,
        chat_repo: ChatRepository,
    ) -> Self {
        Self {
            link_repo,
            supplier_repo,
            chat_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Request a link to a supplier.
    pub async fn request(&self, viewer: &Viewer, supplier_id: &str) -> AppResult<link::Model> {
        viewer.require_consumer("request supplier links")?;

        let supplier = self.supplier_repo.get_by_id(supplier_id).await?;
        if !supplier.is_active || !supplier.is_verified {
            return Err(AppError::BadRequest(
                "Supplier is not accepting link requests".to_string(),
            ));
        }

        if self
            .link_repo
            .find_by_pair(supplier_id, &viewer.user_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Link request already exists".to_string(),
            ));
        }

        let model = link::ActiveModel {
            id: Set(self.id_gen.generate()),
            supplier_id: Set(supplier_id.to_string()),
            consumer_id: Set(viewer.user_id.clone()),
            status: Set(LinkStatus::Pending),
            requested_at: Set(Utc::now().into()),
            responded_at: Set(None),
            responded_by: Set(None),
            archived: Set(false),
        };

        self.link_repo.create(model).await
    }

    /// Approve a pending link and open the partnership chat thread.
    pub async fn approve(&self, viewer: &Viewer, link_id: &str) -> AppResult<link::Model> {
        let link = self.respond(viewer, link_id, LinkStatus::Approved).await?;

        // One thread per partnership; idempotent if it already exists.
        if self
            .chat_repo
            .find_thread_by_pair(&link.supplier_id, &link.consumer_id)
            .await?
            .is_none()
        {
            let thread = chat_thread::ActiveModel {
                id: Set(self.id_gen.generate()),
                supplier_id: Set(link.supplier_id.clone()),
                consumer_id: Set(link.consumer_id.clone()),
                assigned_sales_id: Set(None),
                escalated: Set(false),
                escalated_at: Set(None),
                escalated_by: Set(None),
                archived: Set(false),
                created_at: Set(Utc::now().into()),
                updated_at: Set(None),
            };
            self.chat_repo.create_thread(thread).await?;
        }

        Ok(link)
    }

    /// Decline a pending link.
    pub async fn decline(&self, viewer: &Viewer, link_id: &str) -> AppResult<link::Model> {
        self.respond(viewer, link_id, LinkStatus::Declined).await
    }

    /// Block a pending or approved link.
    pub async fn block(&self, viewer: &Viewer, link_id: &str) -> AppResult<link::Model> {
        viewer.require(viewer.permissions().can_approve_links, "block links")?;

        let link = self.link_repo.get_by_id(link_id).await?;
        link.check_visible(viewer)?;

        if !matches!(link.status, LinkStatus::Pending | LinkStatus::Approved) {
            return Err(AppError::Conflict(format!(
                "Cannot block a {:?} link",
                link.status
            )));
        }

        let mut active: link::ActiveModel = link.into();
        active.status = Set(LinkStatus::Blocked);
        active.responded_at = Set(Some(Utc::now().into()));
        active.responded_by = Set(Some(viewer.user_id.clone()));

        self.link_repo.update(active).await
    }

    /// Withdraw (archive) the consumer's own link.
    pub async fn withdraw(&self, viewer: &Viewer, link_id: &str) -> AppResult<()> {
        viewer.require_consumer("withdraw links")?;

        let link = self.link_repo.get_by_id(link_id).await?;
        link.check_visible(viewer)?;

        let mut active: link::ActiveModel = link.into();
        active.archived = Set(true);

        self.link_repo.update(active).await?;
        Ok(())
    }

    /// Get a link visible to the viewer.
    pub async fn get(&self, viewer: &Viewer, link_id: &str) -> AppResult<link::Model> {
        let link = self.link_repo.get_by_id(link_id).await?;
        link.check_visible(viewer)?;
        Ok(link)
    }

    /// List links in the viewer's scope.
    pub async fn list(
        &self,
        viewer: &Viewer,
        status: Option<LinkStatus>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<link::Model>> {
        if viewer.role == Role::Consumer {
            let links = self
                .link_repo
                .find_for_consumer(&viewer.user_id, limit, until_id)
                .await?;
            Ok(match status {
                Some(s) => links.into_iter().filter(|l| l.status == s).collect(),
                None => links,
            })
        } else {
            let supplier_id = viewer.supplier_scope()?;
            self.link_repo
                .find_for_supplier(supplier_id, status, limit, until_id)
                .await
        }
    }

    /// Shared approve/decline transition: Pending only.
    async fn respond(
        &self,
        viewer: &Viewer,
        link_id: &str,
        status: LinkStatus,
    ) -> AppResult<link::Model> {
        viewer.require(viewer.permissions().can_approve_links, "respond to links")?;

        let link = self.link_repo.get_by_id(link_id).await?;
        link.check_visible(viewer)?;

        if link.status != LinkStatus::Pending {
            return Err(AppError::Conflict(
                "Link request already processed".to_string(),
            ));
        }

        let mut active: link::ActiveModel = link.into();
        active.status = Set(status);
        active.responded_at = Set(Some(Utc::now().into()));
        active.responded_by = Set(Some(viewer.user_id.clone()));

        self.link_repo.update(active).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn owner_viewer(supplier_id: &str) -> Viewer {
        Viewer {
            user_id: "owner-1".to_string(),
            role: Role::Owner,
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

    fn create_mock_link(id: &str, supplier_id: &str, status: LinkStatus) -> link::Model {
        link::Model {
            id: id.to_string(),
            supplier_id: supplier_id.to_string(),
            consumer_id: "consumer-1".to_string(),
            status,
            requested_at: Utc::now().into(),
            responded_at: None,
            responded_by: None,
            archived: false,
        }
    }

    fn create_mock_thread(supplier_id: &str) -> chat_thread::Model {
        chat_thread::Model {
            id: "thread-1".to_string(),
            supplier_id: supplier_id.to_string(),
            consumer_id: "consumer-1".to_string(),
            assigned_sales_id: None,
            escalated: false,
            escalated_at: None,
            escalated_by: None,
            archived: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> LinkService {
        LinkService::new(
            LinkRepository::new(Arc::clone(&db)),
            SupplierRepository::new(Arc::clone(&db)),
            ChatRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_approve_pending_link_sets_responded_at() {
        let pending = create_mock_link("l1", "sup1", LinkStatus::Pending);
        let approved = link::Model {
            status: LinkStatus::Approved,
            responded_at: Some(Utc::now().into()),
            responded_by: Some("owner-1".to_string()),
            ..pending.clone()
        };
        let thread = create_mock_thread("sup1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // SELECT link, UPDATE..RETURNING, SELECT thread (none), INSERT thread
                .append_query_results([vec![pending]])
                .append_query_results([vec![approved]])
                .append_query_results([Vec::<chat_thread::Model>::new()])
                .append_query_results([vec![thread]])
                .into_connection(),
        );

        let result = service(db)
            .approve(&owner_viewer("sup1"), "l1")
            .await
            .unwrap();

        assert_eq!(result.status, LinkStatus::Approved);
        assert!(result.responded_at.is_some());
        assert_eq!(result.responded_by.as_deref(), Some("owner-1"));
    }

    #[tokio::test]
    async fn test_approve_missing_link_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<link::Model>::new()])
                .into_connection(),
        );

        let result = service(db).approve(&owner_viewer("sup1"), "missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_approve_already_processed_is_conflict() {
        let approved = create_mock_link("l1", "sup1", LinkStatus::Approved);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[approved]])
                .into_connection(),
        );

        let result = service(db).approve(&owner_viewer("sup1"), "l1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_sales_may_not_approve() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(db).approve(&sales_viewer("sup1"), "l1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_approve_out_of_scope_is_forbidden() {
        let pending = create_mock_link("l1", "sup2", LinkStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[pending]])
                .into_connection(),
        );

        let result = service(db).approve(&owner_viewer("sup1"), "l1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_block_declined_link_is_conflict() {
        let declined = create_mock_link("l1", "sup1", LinkStatus::Declined);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[declined]])
                .into_connection(),
        );

        let result = service(db).block(&owner_viewer("sup1"), "l1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_consumer_cannot_respond_to_links() {
        let viewer = Viewer {
            user_id: "consumer-1".to_string(),
            role: Role::Consumer,
            supplier_id: None,
        };
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(db).decline(&viewer, "l1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
