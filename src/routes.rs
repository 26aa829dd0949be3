//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /api/traffic` - Traffic snapshot lookup (public)
//! - `GET  /health`      - Health check: snapshot store, upstream configuration
//! - anything else       - `404 {"message": "Not Found"}`
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Any origin
//! - **Security headers** - nosniff, frame denial, referrer policy, HSTS
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{fallback_handler, health_handler};
use crate::api::middleware::{security_headers, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Routes and middleware without path normalization.
pub fn router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api::routes::api_routes())
        .fallback(fallback_handler)
        .with_state(state);

    security_headers::apply(router)
        .layer(security_headers::cors())
        .layer(tracing::layer())
}
