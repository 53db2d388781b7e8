//! Complaint endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use scp_common::AppResult;
use scp_db::entities::complaint::{self, ComplaintStatus};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthViewer, middleware::AppState, response::ApiResponse};

/// Complaint payload returned by the API.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintResponse {
    pub id: String,
    pub order_id: String,
    pub thread_id: Option<String>,
    pub reported_by: String,
    pub supplier_id: String,
    pub subject: String,
    pub description: String,
    pub status: ComplaintStatus,
    pub assigned_to: Option<String>,
    pub resolution: Option<String>,
    pub escalated_at: Option<String>,
    pub closed_at: Option<String>,
    pub created_at: String,
}

impl From<complaint::Model> for ComplaintResponse {
    fn from(c: complaint::Model) -> Self {
        Self {
            id: c.id,
            order_id: c.order_id,
            thread_id: c.thread_id,
            reported_by: c.reported_by,
            supplier_id: c.supplier_id,
            subject: c.subject,
            description: c.description,
            status: c.status,
            assigned_to: c.assigned_to,
            resolution: c.resolution,
            escalated_at: c.escalated_at.map(|t| t.to_rfc3339()),
            closed_at: c.closed_at.map(|t| t.to_rfc3339()),
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// Complaint listing params.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub status: Option<ComplaintStatus>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

/// List complaints in the caller's scope.
async fn list(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<ApiResponse<Vec<ComplaintResponse>>> {
    let limit = params.limit.min(100);
    let complaints = state
        .complaint_service
        .list(&viewer, params.status, limit, params.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        complaints.into_iter().map(Into::into).collect(),
    ))
}

/// Complaint creation request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateComplaintRequest {
    pub order_id: String,

    #[validate(length(min = 1, max = 256))]
    pub subject: String,

    #[validate(length(min = 1, max = 4096))]
    pub description: String,
}

/// File a complaint about an order.
async fn create(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Json(req): Json<CreateComplaintRequest>,
) -> AppResult<ApiResponse<ComplaintResponse>> {
    req.validate()?;

    let input = scp_core::CreateComplaintInput {
        order_id: req.order_id,
        subject: req.subject,
        description: req.description,
    };

    let complaint = state.complaint_service.create(&viewer, input).await?;
    Ok(ApiResponse::ok(complaint.into()))
}

/// Get a complaint.
async fn get_one(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ComplaintResponse>> {
    let complaint = state.complaint_service.get(&viewer, &id).await?;
    Ok(ApiResponse::ok(complaint.into()))
}

/// Status transition request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    pub status: ComplaintStatus,
    pub resolution: Option<String>,
}

/// Advance a complaint's status.
async fn set_status(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> AppResult<ApiResponse<ComplaintResponse>> {
    let complaint = state
        .complaint_service
        .set_status(&viewer, &id, req.status, req.resolution)
        .await?;
    Ok(ApiResponse::ok(complaint.into()))
}

/// Assignment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub assignee_id: String,
}

/// Assign a complaint to a staff member.
async fn assign(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> AppResult<ApiResponse<ComplaintResponse>> {
    let complaint = state
        .complaint_service
        .assign(&viewer, &id, &req.assignee_id)
        .await?;
    Ok(ApiResponse::ok(complaint.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one))
        .route("/{id}/status", post(set_status))
        .route("/{id}/assign", post(assign))
}
