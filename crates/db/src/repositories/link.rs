//! Link repository.

use std::sync::Arc;

use crate::entities::{Link, link};
use scp_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Link repository for database operations.
#[derive(Clone)]
pub struct LinkRepository {
    db: Arc<DatabaseConnection>,
}

impl LinkRepository {
    /// Create a new link repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a link by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<link::Model>> {
        Link::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a link by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<link::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Link not found: {id}")))
    }

    /// Find a link by supplier and consumer pair, archived included.
    ///
    /// The (supplier, consumer) pair is unique; declined or blocked history
    /// therefore blocks re-requests until the old link is archived.
    pub async fn find_by_pair(
        &self,
        supplier_id: &str,
        consumer_id: &str,
    ) -> AppResult<Option<link::Model>> {
        Link::find()
            .filter(link::Column::SupplierId.eq(supplier_id))
            .filter(link::Column::ConsumerId.eq(consumer_id))
            .filter(link::Column::Archived.eq(false))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether an approved link exists between the pair.
    pub async fn is_linked(&self, supplier_id: &str, consumer_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_pair(supplier_id, consumer_id)
            .await?
            .is_some_and(|l| l.status == link::LinkStatus::Approved))
    }

    /// Create a new link.
    pub async fn create(&self, model: link::ActiveModel) -> AppResult<link::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a link.
    pub async fn update(&self, model: link::ActiveModel) -> AppResult<link::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Links of a consumer, archived excluded (paginated).
    pub async fn find_for_consumer(
        &self,
        consumer_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<link::Model>> {
        let mut query = Link::find()
            .filter(link::Column::ConsumerId.eq(consumer_id))
            .filter(link::Column::Archived.eq(false))
            .order_by_desc(link::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(link::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Links of a supplier, archived excluded, optionally filtered by status (paginated).
    pub async fn find_for_supplier(
        &self,
        supplier_id: &str,
        status: Option<link::LinkStatus>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<link::Model>> {
        let mut query = Link::find()
            .filter(link::Column::SupplierId.eq(supplier_id))
            .filter(link::Column::Archived.eq(false))
            .order_by_desc(link::Column::Id);

        if let Some(status) = status {
            query = query.filter(link::Column::Status.eq(status));
        }

        if let Some(id) = until_id {
            query = query.filter(link::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Approved supplier ids for a consumer (for catalog gating).
    pub async fn approved_supplier_ids(&self, consumer_id: &str) -> AppResult<Vec<String>> {
        let links = Link::find()
            .filter(link::Column::ConsumerId.eq(consumer_id))
            .filter(link::Column::Status.eq(link::LinkStatus::Approved))
            .filter(link::Column::Archived.eq(false))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(links.into_iter().map(|l| l.supplier_id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::link::LinkStatus;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_link(id: &str, supplier_id: &str, consumer_id: &str) -> link::Model {
        link::Model {
            id: id.to_string(),
            supplier_id: supplier_id.to_string(),
            consumer_id: consumer_id.to_string(),
            status: LinkStatus::Pending,
            requested_at: Utc::now().into(),
            responded_at: None,
            responded_by: None,
            archived: false,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let link = create_test_link("l1", "sup1", "con1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[link.clone()]])
                .into_connection(),
        );

        let repo = LinkRepository::new(db);
        let result = repo.find_by_id("l1").await.unwrap();

        assert!(result.is_some());
        let found = result.unwrap();
        assert_eq!(found.supplier_id, "sup1");
        assert_eq!(found.consumer_id, "con1");
        assert_eq!(found.status, LinkStatus::Pending);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<link::Model>::new()])
                .into_connection(),
        );

        let repo = LinkRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_is_linked_requires_approved() {
        let pending = create_test_link("l1", "sup1", "con1");
        let approved = link::Model {
            status: LinkStatus::Approved,
            ..create_test_link("l2", "sup2", "con1")
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![pending], vec![approved]])
                .into_connection(),
        );

        let repo = LinkRepository::new(db);
        assert!(!repo.is_linked("sup1", "con1").await.unwrap());
        assert!(repo.is_linked("sup2", "con1").await.unwrap());
    }

    #[tokio::test]
    async fn test_approved_supplier_ids() {
        let approved = link::Model {
            status: LinkStatus::Approved,
            ..create_test_link("l1", "sup1", "con1")
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![approved]])
                .into_connection(),
        );

        let repo = LinkRepository::new(db);
        let ids = repo.approved_supplier_ids("con1").await.unwrap();
        assert_eq!(ids, vec!["sup1".to_string()]);
    }
}
