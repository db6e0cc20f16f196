//! Router setup and server startup.

use std::net::SocketAddr;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use ifw_core::error::Result;
use tower_http::trace::TraceLayer;

use crate::auth::{require_page_token, require_token};
use crate::handlers;
use crate::state::AppState;

/// Maximum accepted request body.
pub const BODY_LIMIT: usize = 1024 * 1024;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new().route("/health", get(handlers::health));

    // The page honours the permanent-link exemption; /send never does.
    let page_routes = Router::new()
        .route("/", get(handlers::index))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_page_token,
        ));

    let send_routes = Router::new()
        .route("/send", post(handlers::send))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_token,
        ));

    public_routes
        .merge(page_routes)
        .merge(send_routes)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until `shutdown` resolves.
pub async fn start_server<F>(addr: SocketAddr, state: AppState, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
