//! SCP platform server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use scp_api::{middleware::AppState, router as api_router};
use scp_common::Config;
use scp_core::{
    AnalyticsService, CatalogService, ChatService, ComplaintService, IncidentService, LinkService,
    OrderService, SupplierService, UserService,
};
use scp_db::repositories::{
    ChatRepository, ComplaintRepository, IncidentRepository, LinkRepository, OrderRepository,
    ProductRepository, SupplierRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scp=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting SCP platform server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = scp_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    scp_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let supplier_repo = SupplierRepository::new(Arc::clone(&db));
    let link_repo = LinkRepository::new(Arc::clone(&db));
    let product_repo = ProductRepository::new(Arc::clone(&db));
    let order_repo = OrderRepository::new(Arc::clone(&db));
    let chat_repo = ChatRepository::new(Arc::clone(&db));
    let complaint_repo = ComplaintRepository::new(Arc::clone(&db));
    let incident_repo = IncidentRepository::new(Arc::clone(&db));

    // Initialize services
    let user_service = UserService::new(user_repo.clone(), supplier_repo.clone());
    let supplier_service = SupplierService::new(supplier_repo.clone());
    let link_service = LinkService::new(
        link_repo.clone(),
        supplier_repo.clone(),
        chat_repo.clone(),
    );
    let catalog_service = CatalogService::new(product_repo.clone(), link_repo.clone());
    let order_service = OrderService::new(
        order_repo.clone(),
        product_repo.clone(),
        link_repo.clone(),
    );
    let chat_service = ChatService::new(chat_repo.clone(), user_repo.clone());
    let complaint_service = ComplaintService::new(
        complaint_repo.clone(),
        order_repo.clone(),
        chat_repo.clone(),
        user_repo.clone(),
    );
    let incident_service = IncidentService::new(incident_repo, user_repo.clone());
    let analytics_service = AnalyticsService::new(order_repo, complaint_repo);

    let state = AppState {
        user_service,
        supplier_service,
        link_service,
        catalog_service,
        order_service,
        chat_service,
        complaint_service,
        incident_service,
        analytics_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            scp_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
