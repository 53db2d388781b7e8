//! API integration tests.
//!
//! These tests verify the API endpoints work correctly together.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use scp_api::{middleware::AppState, router as api_router};
use scp_core::{
    AnalyticsService, CatalogService, ChatService, ComplaintService, IncidentService, LinkService,
    OrderService, SupplierService, UserService,
};
use scp_db::entities::user;
use scp_db::repositories::{
    ChatRepository, ComplaintRepository, IncidentRepository, LinkRepository, OrderRepository,
    ProductRepository, SupplierRepository, UserRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;

/// Create test app state around the given (mock) database connection.
fn create_test_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let supplier_repo = SupplierRepository::new(Arc::clone(&db));
    let link_repo = LinkRepository::new(Arc::clone(&db));
    let product_repo = ProductRepository::new(Arc::clone(&db));
    let order_repo = OrderRepository::new(Arc::clone(&db));
    let chat_repo = ChatRepository::new(Arc::clone(&db));
    let complaint_repo = ComplaintRepository::new(Arc::clone(&db));
    let incident_repo = IncidentRepository::new(Arc::clone(&db));

    AppState {
        user_service: UserService::new(user_repo.clone(), supplier_repo.clone()),
        supplier_service: SupplierService::new(supplier_repo.clone()),
        link_service: LinkService::new(link_repo.clone(), supplier_repo, chat_repo.clone()),
        catalog_service: CatalogService::new(product_repo.clone(), link_repo.clone()),
        order_service: OrderService::new(order_repo.clone(), product_repo, link_repo),
        chat_service: ChatService::new(chat_repo.clone(), user_repo.clone()),
        complaint_service: ComplaintService::new(
            complaint_repo.clone(),
            order_repo.clone(),
            chat_repo,
            user_repo.clone(),
        ),
        incident_service: IncidentService::new(incident_repo, user_repo),
        analytics_service: AnalyticsService::new(order_repo, complaint_repo),
    }
}

/// Test router with an empty mock database; requests are unauthenticated
/// (the auth middleware layer is not mounted, so no extension user exists).
fn create_test_router() -> Router {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    api_router().with_state(create_test_state(db))
}

#[tokio::test]
async fn test_me_without_auth_is_unauthorized() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/me")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_links_without_auth_is_unauthorized() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/links")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_catalog_without_auth_is_unauthorized() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/catalog")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_unknown_email_is_unauthorized() {
    // One empty SELECT result for the email lookup
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let app = api_router().with_state(create_test_state(db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/login")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"email":"ghost@example.kz","password":"wrongpassword"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_with_short_password_is_rejected() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/register")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"email":"new@example.kz","password":"short","name":"New User","role":"consumer"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
