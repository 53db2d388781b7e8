//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use scp_core::{
    AnalyticsService, CatalogService, ChatService, ComplaintService, IncidentService, LinkService,
    OrderService, SupplierService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub supplier_service: SupplierService,
    pub link_service: LinkService,
    pub catalog_service: CatalogService,
    pub order_service: OrderService,
    pub chat_service: ChatService,
    pub complaint_service: ComplaintService,
    pub incident_service: IncidentService,
    pub analytics_service: AnalyticsService,
}

/// Authentication middleware.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Try to extract token from header
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        // Authenticate user by token
        if let Ok(user) = state.user_service.authenticate_by_token(token).await {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}
