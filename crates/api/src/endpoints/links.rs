//! Partnership link endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use scp_common::AppResult;
use scp_db::entities::link::{self, LinkStatus};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthViewer, middleware::AppState, response::ApiResponse};

/// Link payload returned by the API.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub id: String,
    pub supplier_id: String,
    pub consumer_id: String,
    pub status: LinkStatus,
    pub requested_at: String,
    pub responded_at: Option<String>,
    pub responded_by: Option<String>,
}

impl From<link::Model> for LinkResponse {
    fn from(l: link::Model) -> Self {
        Self {
            id: l.id,
            supplier_id: l.supplier_id,
            consumer_id: l.consumer_id,
            status: l.status,
            requested_at: l.requested_at.to_rfc3339(),
            responded_at: l.responded_at.map(|t| t.to_rfc3339()),
            responded_by: l.responded_by,
        }
    }
}

/// Link listing params.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub status: Option<LinkStatus>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

/// List links in the caller's scope.
async fn list(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<ApiResponse<Vec<LinkResponse>>> {
    let limit = params.limit.min(100);
    let links = state
        .link_service
        .list(&viewer, params.status, limit, params.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(links.into_iter().map(Into::into).collect()))
}

/// Link creation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    pub supplier_id: String,
}

/// Request a link to a supplier.
async fn create(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Json(req): Json<CreateLinkRequest>,
) -> AppResult<ApiResponse<LinkResponse>> {
    let link = state.link_service.request(&viewer, &req.supplier_id).await?;
    Ok(ApiResponse::ok(link.into()))
}

/// Approve a pending link.
async fn approve(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<LinkResponse>> {
    let link = state.link_service.approve(&viewer, &id).await?;
    Ok(ApiResponse::ok_with_message(
        link.into(),
        "Link approved successfully",
    ))
}

/// Decline a pending link.
async fn decline(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<LinkResponse>> {
    let link = state.link_service.decline(&viewer, &id).await?;
    Ok(ApiResponse::ok_with_message(
        link.into(),
        "Link declined",
    ))
}

/// Block a pending or approved link.
async fn block(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<LinkResponse>> {
    let link = state.link_service.block(&viewer, &id).await?;
    Ok(ApiResponse::ok(link.into()))
}

/// Withdraw the caller's own link.
async fn withdraw(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.link_service.withdraw(&viewer, &id).await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}/approve", post(approve))
        .route("/{id}/decline", post(decline))
        .route("/{id}/block", post(block))
        .route("/{id}/withdraw", post(withdraw))
}
