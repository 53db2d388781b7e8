//! API endpoints.

mod analytics;
mod auth;
mod catalog;
mod chat;
mod complaints;
mod incidents;
mod links;
mod orders;
mod suppliers;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .nest("/suppliers", suppliers::router())
        .nest("/catalog", catalog::router())
        .nest("/links", links::router())
        .nest("/orders", orders::router())
        .nest("/chat", chat::router())
        .nest("/complaints", complaints::router())
        .nest("/incidents", incidents::router())
        .nest("/analytics", analytics::router())
        .nest("/admin", users::router())
}
