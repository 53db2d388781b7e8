//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use scp_core::Viewer;
use scp_db::entities::user;

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get user from request extensions (set by auth middleware)
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

/// Authenticated viewer extractor: the scoped identity services run against.
#[derive(Debug, Clone)]
pub struct AuthViewer(pub Viewer);

impl<S> FromRequestParts<S> for AuthViewer
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<user::Model>()
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))?;

        Viewer::from_user(user)
            .map(AuthViewer)
            .map_err(|_| (StatusCode::FORBIDDEN, "Forbidden"))
    }
}
