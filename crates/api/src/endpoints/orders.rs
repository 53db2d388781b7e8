//! Order endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use scp_common::AppResult;
use scp_core::OrderWithItems;
use scp_db::entities::{
    order::{self, OrderStatus},
    order_item,
};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthViewer, middleware::AppState, response::ApiResponse};

/// Order item payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub unit: String,
    pub quantity: i32,
    pub price_kzt: i64,
    pub total_kzt: i64,
}

impl From<order_item::Model> for OrderItemResponse {
    fn from(i: order_item::Model) -> Self {
        Self {
            id: i.id,
            product_id: i.product_id,
            product_name: i.product_name,
            unit: i.unit,
            quantity: i.quantity,
            price_kzt: i.price_kzt,
            total_kzt: i.total_kzt,
        }
    }
}

/// Order payload returned by the API.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub supplier_id: String,
    pub consumer_id: String,
    pub status: OrderStatus,
    pub total_kzt: i64,
    pub notes: Option<String>,
    pub responded_at: Option<String>,
    pub responded_by: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItemResponse>>,
}

impl From<order::Model> for OrderResponse {
    fn from(o: order::Model) -> Self {
        Self {
            id: o.id,
            supplier_id: o.supplier_id,
            consumer_id: o.consumer_id,
            status: o.status,
            total_kzt: o.total_kzt,
            notes: o.notes,
            responded_at: o.responded_at.map(|t| t.to_rfc3339()),
            responded_by: o.responded_by,
            created_at: o.created_at.to_rfc3339(),
            items: None,
        }
    }
}

impl From<OrderWithItems> for OrderResponse {
    fn from(o: OrderWithItems) -> Self {
        let mut resp: Self = o.order.into();
        resp.items = Some(o.items.into_iter().map(Into::into).collect());
        resp
    }
}

/// Order listing params.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub status: Option<OrderStatus>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

/// List orders in the caller's scope.
async fn list(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<ApiResponse<Vec<OrderResponse>>> {
    let limit = params.limit.min(100);
    let orders = state
        .order_service
        .list(&viewer, params.status, limit, params.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(orders.into_iter().map(Into::into).collect()))
}

/// Order item request line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: String,
    pub quantity: i32,
}

/// Order creation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub supplier_id: String,
    pub items: Vec<OrderItemRequest>,
    pub notes: Option<String>,
}

/// Place a new order.
async fn create(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let input = scp_core::CreateOrderInput {
        supplier_id: req.supplier_id,
        items: req
            .items
            .into_iter()
            .map(|i| scp_core::OrderItemInput {
                product_id: i.product_id,
                quantity: i.quantity,
            })
            .collect(),
        notes: req.notes,
    };

    let order = state.order_service.create(&viewer, input).await?;
    Ok(ApiResponse::ok(order.into()))
}

/// Get an order with its items.
async fn get_one(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let order = state.order_service.get(&viewer, &id).await?;
    Ok(ApiResponse::ok(order.into()))
}

/// Accept a pending order.
async fn accept(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let order = state.order_service.accept(&viewer, &id).await?;
    Ok(ApiResponse::ok(order.into()))
}

/// Reject a pending order.
async fn reject(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let order = state.order_service.reject(&viewer, &id).await?;
    Ok(ApiResponse::ok(order.into()))
}

/// Complete an accepted order.
async fn complete(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let order = state.order_service.complete(&viewer, &id).await?;
    Ok(ApiResponse::ok(order.into()))
}

/// Cancel an accepted order.
async fn cancel(
    AuthViewer(viewer): AuthViewer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let order = state.order_service.cancel(&viewer, &id).await?;
    Ok(ApiResponse::ok(order.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one))
        .route("/{id}/accept", post(accept))
        .route("/{id}/reject", post(reject))
        .route("/{id}/complete", post(complete))
        .route("/{id}/cancel", post(cancel))
}
