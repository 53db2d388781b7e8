//! Staff management endpoints (supplier admins).

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use scp_common::AppResult;
use scp_core::Role;
use serde::Deserialize;
use validator::Validate;

use crate::{
    endpoints::auth::UserResponse, extractors::AuthViewer, middleware::AppState,
    response::ApiResponse,
};

/// Listing params.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    50
}

/// List staff of the caller's company.
async fn list(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let limit = params.limit.min(100);
    let users = state
        .user_service
        .list_staff(&viewer, limit, params.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

/// Staff creation request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 256))]
    pub name: String,

    pub phone: Option<String>,

    pub role: Role,
}

/// Create a staff account in the caller's company.
async fn create(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Json(req): Json<CreateStaffRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    req.validate()?;

    let input = scp_core::CreateStaffInput {
        email: req.email,
        password: req.password,
        name: req.name,
        phone: req.phone,
        role: req.role,
    };

    let user = state.user_service.create_staff(&viewer, input).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Deactivate a staff account.
async fn deactivate(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.deactivate_staff(&viewer, &id).await?;
    Ok(ApiResponse::ok(user.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list).post(create))
        .route("/users/{id}/deactivate", post(deactivate))
}
