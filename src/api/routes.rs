//! API route configuration.
//!
//! The API is public: callers are not authenticated.

use crate::api::handlers::traffic_handler;
use crate::state::AppState;
use axum::{Router, routing::get};

/// All routes nested under `/api`.
///
/// # Endpoints
///
/// - `GET /traffic?domain=` - Traffic snapshot for a domain
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/traffic", get(traffic_handler))
}
