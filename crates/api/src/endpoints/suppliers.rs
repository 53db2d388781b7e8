//! Supplier directory endpoints.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use scp_common::AppResult;
use scp_db::entities::supplier;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthViewer, middleware::AppState, response::ApiResponse};

/// Supplier payload returned by the API.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierResponse {
    pub id: String,
    pub company_name: String,
    pub description: Option<String>,
    pub city: Option<String>,
    pub verified: bool,
}

impl From<supplier::Model> for SupplierResponse {
    fn from(s: supplier::Model) -> Self {
        Self {
            id: s.id,
            company_name: s.company_name,
            description: s.description,
            city: s.city,
            verified: s.is_verified,
        }
    }
}

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

/// List suppliers the caller may request links to.
async fn list(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<ApiResponse<Vec<SupplierResponse>>> {
    let limit = params.limit.min(100);
    let suppliers = state
        .supplier_service
        .list_linkable(&viewer, limit, params.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        suppliers.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list))
}
