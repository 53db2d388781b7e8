//! Chat endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use scp_common::AppResult;
use scp_core::ThreadSummary;
use scp_db::entities::{
    chat_message::{self, MessageKind},
    chat_thread,
};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthViewer, middleware::AppState, response::ApiResponse};

/// Message payload returned by the API.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub thread_id: String,
    pub sender_id: String,
    pub kind: MessageKind,
    pub content: String,
    pub attachment_url: Option<String>,
    pub read: bool,
    pub created_at: String,
}

impl From<chat_message::Model> for MessageResponse {
    fn from(m: chat_message::Model) -> Self {
        Self {
            id: m.id,
            thread_id: m.thread_id,
            sender_id: m.sender_id,
            kind: m.kind,
            content: m.content,
            attachment_url: m.attachment_url,
            read: m.is_read,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Thread payload with conversation state.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadResponse {
    pub id: String,
    pub supplier_id: String,
    pub consumer_id: String,
    pub assigned_sales_id: Option<String>,
    pub escalated: bool,
    pub escalated_at: Option<String>,
    pub last_message: Option<MessageResponse>,
    pub unread_count: u64,
    pub created_at: String,
}

impl From<ThreadSummary> for ThreadResponse {
    fn from(s: ThreadSummary) -> Self {
        let t = s.thread;
        Self {
            id: t.id,
            supplier_id: t.supplier_id,
            consumer_id: t.consumer_id,
            assigned_sales_id: t.assigned_sales_id,
            escalated: t.escalated,
            escalated_at: t.escalated_at.map(|ts| ts.to_rfc3339()),
            last_message: s.last_message.map(Into::into),
            unread_count: s.unread_count,
            created_at: t.created_at.to_rfc3339(),
        }
    }
}

/// Bare thread payload (no conversation state).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BareThreadResponse {
    pub id: String,
    pub supplier_id: String,
    pub consumer_id: String,
    pub assigned_sales_id: Option<String>,
    pub escalated: bool,
    pub escalated_at: Option<String>,
    pub created_at: String,
}

impl From<chat_thread::Model> for BareThreadResponse {
    fn from(t: chat_thread::Model) -> Self {
        Self {
            id: t.id,
            supplier_id: t.supplier_id,
            consumer_id: t.consumer_id,
            assigned_sales_id: t.assigned_sales_id,
            escalated: t.escalated,
            escalated_at: t.escalated_at.map(|ts| ts.to_rfc3339()),
            created_at: t.created_at.to_rfc3339(),
        }
    }
}

/// Pagination params.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    50
}

/// List the caller's threads.
async fn list_threads(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<ApiResponse<Vec<ThreadResponse>>> {
    let limit = params.limit.min(100);
    let threads = state
        .chat_service
        .list_threads(&viewer, limit, params.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        threads.into_iter().map(Into::into).collect(),
    ))
}

/// Messages of a thread, newest first.
async fn list_messages(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PageParams>,
) -> AppResult<ApiResponse<Vec<MessageResponse>>> {
    let limit = params.limit.min(200);
    let messages = state
        .chat_service
        .list_messages(&viewer, &id, limit, params.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        messages.into_iter().map(Into::into).collect(),
    ))
}

/// Message sending request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(default)]
    pub kind: MessageKind,
    pub attachment_url: Option<String>,
}

/// Send a message into a thread.
async fn send_message(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<ApiResponse<MessageResponse>> {
    let input = scp_core::SendMessageInput {
        content: req.content,
        kind: req.kind,
        attachment_url: req.attachment_url,
    };

    let message = state.chat_service.send_message(&viewer, &id, input).await?;
    Ok(ApiResponse::ok(message.into()))
}

/// Read-marking response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    pub marked: u64,
}

/// Mark counterparty messages in a thread as read.
async fn mark_read(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MarkReadResponse>> {
    let marked = state.chat_service.mark_read(&viewer, &id).await?;
    Ok(ApiResponse::ok(MarkReadResponse { marked }))
}

/// Escalate a thread to supplier admins.
async fn escalate(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<BareThreadResponse>> {
    let thread = state.chat_service.escalate(&viewer, &id).await?;
    Ok(ApiResponse::ok_with_message(
        thread.into(),
        "Chat escalated successfully",
    ))
}

/// Sales assignment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignSalesRequest {
    pub sales_user_id: String,
}

/// Assign a sales contact to a thread.
async fn assign_sales(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AssignSalesRequest>,
) -> AppResult<ApiResponse<BareThreadResponse>> {
    let thread = state
        .chat_service
        .assign_sales(&viewer, &id, &req.sales_user_id)
        .await?;
    Ok(ApiResponse::ok(thread.into()))
}

/// Unread count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadResponse {
    pub unread: u64,
}

/// Total unread messages across the caller's threads.
async fn unread(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UnreadResponse>> {
    let unread = state.chat_service.unread_total(&viewer).await?;
    Ok(ApiResponse::ok(UnreadResponse { unread }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/threads", get(list_threads))
        .route("/threads/{id}/messages", get(list_messages).post(send_message))
        .route("/threads/{id}/read", post(mark_read))
        .route("/threads/{id}/escalate", post(escalate))
        .route("/threads/{id}/assign", post(assign_sales))
        .route("/unread", get(unread))
}
