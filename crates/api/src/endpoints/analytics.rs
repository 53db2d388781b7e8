//! Analytics endpoints.

use axum::{Router, extract::State, routing::get};
use scp_common::AppResult;
use scp_core::Dashboard;

use crate::{extractors::AuthViewer, middleware::AppState, response::ApiResponse};

/// Supplier dashboard figures.
async fn dashboard(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Dashboard>> {
    let dashboard = state.analytics_service.dashboard(&viewer).await?;
    Ok(ApiResponse::ok(dashboard))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}
