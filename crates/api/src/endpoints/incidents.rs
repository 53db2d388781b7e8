//! Incident endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use scp_common::AppResult;
use scp_db::entities::{
    incident::{self, IncidentPriority, IncidentStatus},
    incident_log,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthViewer, middleware::AppState, response::ApiResponse};

/// Incident payload returned by the API.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentResponse {
    pub id: String,
    pub supplier_id: String,
    pub title: String,
    pub description: String,
    pub status: IncidentStatus,
    pub priority: IncidentPriority,
    pub reported_by: String,
    pub assigned_to: Option<String>,
    pub resolved_at: Option<String>,
    pub created_at: String,
}

impl From<incident::Model> for IncidentResponse {
    fn from(i: incident::Model) -> Self {
        Self {
            id: i.id,
            supplier_id: i.supplier_id,
            title: i.title,
            description: i.description,
            status: i.status,
            priority: i.priority,
            reported_by: i.reported_by,
            assigned_to: i.assigned_to,
            resolved_at: i.resolved_at.map(|t| t.to_rfc3339()),
            created_at: i.created_at.to_rfc3339(),
        }
    }
}

/// Incident log entry payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentLogResponse {
    pub id: String,
    pub user_id: String,
    pub action: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<incident_log::Model> for IncidentLogResponse {
    fn from(l: incident_log::Model) -> Self {
        Self {
            id: l.id,
            user_id: l.user_id,
            action: l.action,
            old_value: l.old_value,
            new_value: l.new_value,
            notes: l.notes,
            created_at: l.created_at.to_rfc3339(),
        }
    }
}

/// Incident listing params.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub status: Option<IncidentStatus>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

/// List incidents of the caller's company.
async fn list(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<ApiResponse<Vec<IncidentResponse>>> {
    let limit = params.limit.min(100);
    let incidents = state
        .incident_service
        .list(&viewer, params.status, limit, params.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        incidents.into_iter().map(Into::into).collect(),
    ))
}

/// Incident creation request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncidentRequest {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1, max = 4096))]
    pub description: String,

    #[serde(default)]
    pub priority: IncidentPriority,
}

/// File an incident.
async fn create(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Json(req): Json<CreateIncidentRequest>,
) -> AppResult<ApiResponse<IncidentResponse>> {
    req.validate()?;

    let input = scp_core::CreateIncidentInput {
        title: req.title,
        description: req.description,
        priority: req.priority,
    };

    let incident = state.incident_service.create(&viewer, input).await?;
    Ok(ApiResponse::ok(incident.into()))
}

/// Get an incident.
async fn get_one(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<IncidentResponse>> {
    let incident = state.incident_service.get(&viewer, &id).await?;
    Ok(ApiResponse::ok(incident.into()))
}

/// Status transition request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    pub status: IncidentStatus,
    pub notes: Option<String>,
}

/// Advance an incident's status.
async fn set_status(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> AppResult<ApiResponse<IncidentResponse>> {
    let incident = state
        .incident_service
        .set_status(&viewer, &id, req.status, req.notes)
        .await?;
    Ok(ApiResponse::ok(incident.into()))
}

/// Priority change request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPriorityRequest {
    pub priority: IncidentPriority,
    pub notes: Option<String>,
}

/// Change an incident's priority.
async fn set_priority(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetPriorityRequest>,
) -> AppResult<ApiResponse<IncidentResponse>> {
    let incident = state
        .incident_service
        .set_priority(&viewer, &id, req.priority, req.notes)
        .await?;
    Ok(ApiResponse::ok(incident.into()))
}

/// Assignment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub assignee_id: String,
}

/// Assign an incident to a staff member.
async fn assign(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> AppResult<ApiResponse<IncidentResponse>> {
    let incident = state
        .incident_service
        .assign(&viewer, &id, &req.assignee_id)
        .await?;
    Ok(ApiResponse::ok(incident.into()))
}

/// Audit log of an incident.
async fn logs(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<IncidentLogResponse>>> {
    let logs = state.incident_service.logs(&viewer, &id).await?;
    Ok(ApiResponse::ok(logs.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one))
        .route("/{id}/status", post(set_status))
        .route("/{id}/priority", post(set_priority))
        .route("/{id}/assign", post(assign))
        .route("/{id}/logs", get(logs))
}
