//! Chat thread and message repository.

use std::sync::Arc;

use crate::entities::{ChatMessage, ChatThread, chat_message, chat_thread};
use scp_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Repository for chat operations.
#[derive(Clone)]
pub struct ChatRepository {
    db: Arc<DatabaseConnection>,
}

impl ChatRepository {
    /// Create a new chat repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ========== Threads ==========

    /// Find a thread by ID.
    pub async fn find_thread(&self, id: &str) -> AppResult<Option<chat_thread::Model>> {
        ChatThread::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a thread by ID, failing if absent.
    pub async fn get_thread(&self, id: &str) -> AppResult<chat_thread::Model> {
        self.find_thread(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Thread not found: {id}")))
    }

    /// Find the thread of a consumer-supplier pair, archived excluded.
    pub async fn find_thread_by_pair(
        &self,
        supplier_id: &str,
        consumer_id: &str,
    ) -> AppResult<Option<chat_thread::Model>> {
        ChatThread::find()
            .filter(chat_thread::Column::SupplierId.eq(supplier_id))
            .filter(chat_thread::Column::ConsumerId.eq(consumer_id))
            .filter(chat_thread::Column::Archived.eq(false))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new thread.
    pub async fn create_thread(
        &self,
        model: chat_thread::ActiveModel,
    ) -> AppResult<chat_thread::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a thread.
    pub async fn update_thread(
        &self,
        model: chat_thread::ActiveModel,
    ) -> AppResult<chat_thread::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Threads of a consumer, archived excluded (paginated).
    pub async fn find_threads_for_consumer(
        &self,
        consumer_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<chat_thread::Model>> {
        let mut query = ChatThread::find()
            .filter(chat_thread::Column::ConsumerId.eq(consumer_id))
            .filter(chat_thread::Column::Archived.eq(false))
            .order_by_desc(chat_thread::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(chat_thread::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Threads of a supplier, archived excluded (paginated).
    pub async fn find_threads_for_supplier(
        &self,
        supplier_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<chat_thread::Model>> {
        let mut query = ChatThread::find()
            .filter(chat_thread::Column::SupplierId.eq(supplier_id))
            .filter(chat_thread::Column::Archived.eq(false))
            .order_by_desc(chat_thread::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(chat_thread::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ========== Messages ==========

    /// Append a message.
    pub async fn create_message(
        &self,
        model: chat_message::ActiveModel,
    ) -> AppResult<chat_message::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Messages of a thread, newest first (paginated).
    pub async fn find_messages(
        &self,
        thread_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<chat_message::Model>> {
        let mut query = ChatMessage::find()
            .filter(chat_message::Column::ThreadId.eq(thread_id))
            .order_by_desc(chat_message::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(chat_message::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Latest message of a thread, if any.
    pub async fn find_latest_message(
        &self,
        thread_id: &str,
    ) -> AppResult<Option<chat_message::Model>> {
        ChatMessage::find()
            .filter(chat_message::Column::ThreadId.eq(thread_id))
            .order_by_desc(chat_message::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark messages from other senders as read. Returns rows affected.
    pub async fn mark_read(&self, thread_id: &str, reader_id: &str) -> AppResult<u64> {
        use sea_orm::sea_query::Expr;

        let result = ChatMessage::update_many()
            .col_expr(chat_message::Column::IsRead, Expr::value(true))
            .filter(chat_message::Column::ThreadId.eq(thread_id))
            .filter(chat_message::Column::SenderId.ne(reader_id))
            .filter(chat_message::Column::IsRead.eq(false))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Unread messages in one thread, from the reader's point of view.
    pub async fn count_unread_in_thread(
        &self,
        thread_id: &str,
        reader_id: &str,
    ) -> AppResult<u64> {
        ChatMessage::find()
            .filter(chat_message::Column::ThreadId.eq(thread_id))
            .filter(chat_message::Column::SenderId.ne(reader_id))
            .filter(chat_message::Column::IsRead.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_thread(id: &str, supplier_id: &str, consumer_id: &str) -> chat_thread::Model {
        chat_thread::Model {
            id: id.to_string(),
            supplier_id: supplier_id.to_string(),
            consumer_id: consumer_id.to_string(),
            assigned_sales_id: None,
            escalated: false,
            escalated_at: None,
            escalated_by: None,
            archived: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_thread_by_pair() {
        let thread = create_test_thread("t1", "sup1", "con1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[thread.clone()]])
                .into_connection(),
        );

        let repo = ChatRepository::new(db);
        let result = repo.find_thread_by_pair("sup1", "con1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().id, "t1");
    }

    #[tokio::test]
    async fn test_get_thread_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<chat_thread::Model>::new()])
                .into_connection(),
        );

        let repo = ChatRepository::new(db);
        let result = repo.get_thread("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
