//! Chat service: partnership threads and messages.

use chrono::Utc;
use scp_common::{AppError, AppResult, IdGenerator};
use scp_db::{
    entities::{chat_message, chat_message::MessageKind, chat_thread},
    repositories::{ChatRepository, UserRepository},
};
use sea_orm::Set;

use crate::services::access::{Role, Viewer, Visibility};

/// Input for sending a message.
pub struct SendMessageInput {
    pub content: String,
    pub kind: MessageKind,
    pub attachment_url: Option<String>,
}

/// Thread listing entry: the thread plus conversation state.
pub struct ThreadSummary {
    pub thread: chat_thread::Model,
    pub last_message: Option<chat_message::Model>,
    pub unread_count: u64,
}

/// Chat service.
#[derive(Clone)]
pub struct ChatService {
    chat_repo: ChatRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl ChatService {
    /// Create a new chat service.
    #[must_use]
    pub const fn new(chat_repo: ChatRepository, user_repo: UserRepository) -> Self {
        Self {
            chat_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List threads in the viewer's scope, with last message and unread count.
    pub async fn list_threads(
        &self,
        viewer: &Viewer,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<ThreadSummary>> {
        viewer.require(viewer.permissions().can_chat, "use chat")?;

        let threads = if viewer.role == Role::Consumer {
            self.chat_repo
                .find_threads_for_consumer(&viewer.user_id, limit, until_id)
                .await?
        } else {
            let supplier_id = viewer.supplier_scope()?;
            self.chat_repo
                .find_threads_for_supplier(supplier_id, limit, until_id)
                .await?
        };

        let mut summaries = Vec::with_capacity(threads.len());
        for thread in threads {
            let last_message = self.chat_repo.find_latest_message(&thread.id).await?;
            let unread_count = self
                .chat_repo
                .count_unread_in_thread(&thread.id, &viewer.user_id)
                .await?;

            summaries.push(ThreadSummary {
                thread,
                last_message,
                unread_count,
            });
        }

        Ok(summaries)
    }

    /// Send a message into a thread.
    pub async fn send_message(
        &self,
        viewer: &Viewer,
        thread_id: &str,
        input: SendMessageInput,
    ) -> AppResult<chat_message::Model> {
        viewer.require(viewer.permissions().can_chat, "use chat")?;

        if input.kind == MessageKind::System {
            return Err(AppError::BadRequest(
                "System messages are platform-generated".to_string(),
            ));
        }

        let content = input.content.trim();
        if content.is_empty() {
            return Err(AppError::BadRequest("Message is empty".to_string()));
        }
        if content.len() > 8192 {
            return Err(AppError::BadRequest("Message is too long".to_string()));
        }

        let thread = self.chat_repo.get_thread(thread_id).await?;
        thread.check_visible(viewer)?;

        if thread.archived {
            return Err(AppError::Conflict("Thread is archived".to_string()));
        }

        let model = chat_message::ActiveModel {
            id: Set(self.id_gen.generate()),
            thread_id: Set(thread.id),
            sender_id: Set(viewer.user_id.clone()),
            kind: Set(input.kind),
            content: Set(content.to_string()),
            attachment_url: Set(input.attachment_url),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
        };

        self.chat_repo.create_message(model).await
    }

    /// Messages of a thread, newest first.
    pub async fn list_messages(
        &self,
        viewer: &Viewer,
        thread_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<chat_message::Model>> {
        viewer.require(viewer.permissions().can_chat, "use chat")?;

        let thread = self.chat_repo.get_thread(thread_id).await?;
        thread.check_visible(viewer)?;

        self.chat_repo
            .find_messages(thread_id, limit, until_id)
            .await
    }

    /// Mark counterparty messages in a thread as read.
    pub async fn mark_read(&self, viewer: &Viewer, thread_id: &str) -> AppResult<u64> {
        viewer.require(viewer.permissions().can_chat, "use chat")?;

        let thread = self.chat_repo.get_thread(thread_id).await?;
        thread.check_visible(viewer)?;

        self.chat_repo.mark_read(thread_id, &viewer.user_id).await
    }

    /// Total unread messages across the viewer's threads.
    pub async fn unread_total(&self, viewer: &Viewer) -> AppResult<u64> {
        // Bounded sweep over the most recent threads.
        let summaries = self.list_threads(viewer, 100, None).await?;
        Ok(summaries.iter().map(|s| s.unread_count).sum())
    }

    /// Escalate a thread to supplier admins. Appends a system message.
    pub async fn escalate(&self, viewer: &Viewer, thread_id: &str) -> AppResult<chat_thread::Model> {
        viewer.require(viewer.permissions().can_escalate, "escalate chats")?;

        let thread = self.chat_repo.get_thread(thread_id).await?;
        thread.check_visible(viewer)?;

        if thread.escalated {
            return Err(AppError::Conflict("Thread is already escalated".to_string()));
        }

        let mut active: chat_thread::ActiveModel = thread.into();
        active.escalated = Set(true);
        active.escalated_at = Set(Some(Utc::now().into()));
        active.escalated_by = Set(Some(viewer.user_id.clone()));
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.chat_repo.update_thread(active).await?;

        let notice = chat_message::ActiveModel {
            id: Set(self.id_gen.generate()),
            thread_id: Set(updated.id.clone()),
            sender_id: Set(viewer.user_id.clone()),
            kind: Set(MessageKind::System),
            content: Set("Chat has been escalated to supplier admins".to_string()),
            attachment_url: Set(None),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
        };
        self.chat_repo.create_message(notice).await?;

        Ok(updated)
    }

    /// Assign a sales contact to a thread.
    pub async fn assign_sales(
        &self,
        viewer: &Viewer,
        thread_id: &str,
        sales_user_id: &str,
    ) -> AppResult<chat_thread::Model> {
        let supplier_id = viewer.supplier_scope()?;

        let thread = self.chat_repo.get_thread(thread_id).await?;
        thread.check_visible(viewer)?;

        let assignee = self.user_repo.get_by_id(sales_user_id).await?;
        if !assignee.role.is_supplier_side()
            || assignee.supplier_id.as_deref() != Some(supplier_id)
        {
            return Err(AppError::BadRequest(
                "Assignee must be staff of the same supplier".to_string(),
            ));
        }

        let mut active: chat_thread::ActiveModel = thread.into();
        active.assigned_sales_id = Set(Some(assignee.id));
        active.updated_at = Set(Some(Utc::now().into()));

        self.chat_repo.update_thread(active).await
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

    fn mock_thread(id: &str, supplier_id: &str, consumer_id: &str) -> chat_thread::Model {
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

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> ChatService {
        ChatService::new(
            ChatRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_send_message_to_foreign_thread_is_forbidden() {
        let thread = mock_thread("t1", "sup1", "consumer-2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[thread]])
                .into_connection(),
        );

        let input = SendMessageInput {
            content: "hello".to_string(),
            kind: MessageKind::Text,
            attachment_url: None,
        };
        let result = service(db)
            .send_message(&consumer_viewer(), "t1", input)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_send_empty_message_is_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let input = SendMessageInput {
            content: "   ".to_string(),
            kind: MessageKind::Text,
            attachment_url: None,
        };
        let result = service(db)
            .send_message(&consumer_viewer(), "t1", input)
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_clients_cannot_send_system_messages() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let input = SendMessageInput {
            content: "fake notice".to_string(),
            kind: MessageKind::System,
            attachment_url: None,
        };
        let result = service(db)
            .send_message(&sales_viewer("sup1"), "t1", input)
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_consumer_cannot_escalate() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(db).escalate(&consumer_viewer(), "t1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_escalate_twice_is_conflict() {
        let escalated = chat_thread::Model {
            escalated: true,
            ..mock_thread("t1", "sup1", "consumer-1")
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[escalated]])
                .into_connection(),
        );

        let result = service(db).escalate(&sales_viewer("sup1"), "t1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
