//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod public;
pub mod routes;
mod state;

use axum::{http::Method, middleware as axum_middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::create_router;
pub use state::AppState;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // The public changelog may be embedded by other sites
    let public = public::create_router(&state.settings.changelog_path).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET]),
    );

    // Layers run outside-in: context first, then logging
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1/admin", routes::create_router())
        .merge(public)
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::context_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
