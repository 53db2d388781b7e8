//! Catalog endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use scp_common::AppResult;
use scp_db::entities::product;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthViewer, middleware::AppState, response::ApiResponse};

/// Product payload returned by the API.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub supplier_id: String,
    pub name: String,
    pub description: Option<String>,
    pub unit: String,
    pub price_kzt: i64,
    pub stock: i32,
    pub moq: i32,
    pub archived: bool,
    pub created_at: String,
}

impl From<product::Model> for ProductResponse {
    fn from(p: product::Model) -> Self {
        Self {
            id: p.id,
            supplier_id: p.supplier_id,
            name: p.name,
            description: p.description,
            unit: p.unit,
            price_kzt: p.price_kzt,
            stock: p.stock,
            moq: p.moq,
            archived: p.archived,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Catalog listing params.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub include_archived: bool,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    50
}

/// List the catalog in the caller's scope.
async fn list(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<ApiResponse<Vec<ProductResponse>>> {
    let limit = params.limit.min(200);
    let products = state
        .catalog_service
        .list(
            &viewer,
            params.include_archived,
            limit,
            params.until_id.as_deref(),
        )
        .await?;

    Ok(ApiResponse::ok(
        products.into_iter().map(Into::into).collect(),
    ))
}

/// Product creation request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    pub description: Option<String>,

    #[validate(length(min = 1, max = 32))]
    pub unit: String,

    pub price_kzt: i64,
    pub stock: i32,
    pub moq: i32,
}

/// Create a product.
async fn create(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> AppResult<ApiResponse<ProductResponse>> {
    req.validate()?;

    let input = scp_core::CreateProductInput {
        name: req.name,
        description: req.description,
        unit: req.unit,
        price_kzt: req.price_kzt,
        stock: req.stock,
        moq: req.moq,
    };

    let product = state.catalog_service.create_product(&viewer, input).await?;
    Ok(ApiResponse::ok(product.into()))
}

/// Product update request. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub price_kzt: Option<i64>,
    pub stock: Option<i32>,
    pub moq: Option<i32>,
}

/// Update a product.
async fn update(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let input = scp_core::UpdateProductInput {
        name: req.name,
        description: req.description,
        unit: req.unit,
        price_kzt: req.price_kzt,
        stock: req.stock,
        moq: req.moq,
    };

    let product = state
        .catalog_service
        .update_product(&viewer, &id, input)
        .await?;
    Ok(ApiResponse::ok(product.into()))
}

/// Archive a product.
async fn archive(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let product = state.catalog_service.archive_product(&viewer, &id).await?;
    Ok(ApiResponse::ok(product.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", put(update))
        .route("/{id}/archive", post(archive))
}
