//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::{get, post}};
use scp_common::AppResult;
use scp_core::Role;
use scp_db::entities::user;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// User payload returned by the API.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub supplier_id: Option<String>,
    pub company_name: Option<String>,
    pub active: bool,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role,
            supplier_id: u.supplier_id,
            company_name: u.company_name,
            active: u.is_active,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 256))]
    pub name: String,

    pub phone: Option<String>,

    pub role: Role,

    pub company_name: Option<String>,
}

/// Authentication response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Register a new account.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    req.validate()?;

    let input = scp_core::RegisterInput {
        email: req.email,
        password: req.password,
        name: req.name,
        phone: req.phone,
        role: req.role,
        company_name: req.company_name,
    };

    let user = state.user_service.register(input).await?;
    let token = user.token.clone().unwrap_or_default();

    Ok(ApiResponse::ok(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Login request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Sign in to an existing account.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let user = state
        .user_service
        .authenticate(&req.email, &req.password)
        .await?;
    let token = user.token.clone().unwrap_or_default();

    Ok(ApiResponse::ok(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Regenerate token response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateTokenResponse {
    pub token: String,
}

/// Regenerate the caller's access token.
async fn regenerate_token(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<RegenerateTokenResponse>> {
    let token = state.user_service.regenerate_token(&user.id).await?;
    Ok(ApiResponse::ok(RegenerateTokenResponse { token }))
}

/// Get the authenticated user.
async fn me(AuthUser(user): AuthUser) -> AppResult<ApiResponse<UserResponse>> {
    Ok(ApiResponse::ok(user.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/token/regenerate", post(regenerate_token))
        .route("/me", get(me))
}
