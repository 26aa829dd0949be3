//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: Snapshot store reachable
/// - **503 Service Unavailable**: Snapshot store unreachable
///
/// An unconfigured upstream is reported but does not make the service
/// unhealthy: cached snapshots are still served.
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "store": { "status": "ok", "message": "Connected, 12 snapshots" },
///     "upstream": { "status": "ok", "message": "Configured" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let store_check = check_store(&state).await;
    let upstream_check = check_upstream(&state);

    let healthy = store_check.is_ok();

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            store: store_check,
            upstream: upstream_check,
        },
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Pings the snapshot store and reports how many snapshots it holds.
async fn check_store(state: &AppState) -> CheckStatus {
    if let Err(e) = state.repository.ping().await {
        return CheckStatus::error(format!("Store error: {}", e));
    }

    match state.repository.count().await {
        Ok(count) => CheckStatus::ok(format!("Connected, {} snapshots", count)),
        Err(e) => CheckStatus::error(format!("Store error: {}", e)),
    }
}

fn check_upstream(state: &AppState) -> CheckStatus {
    if state.provider.is_configured() {
        CheckStatus::ok("Configured")
    } else {
        CheckStatus::error("RAPIDAPI_KEY or RAPIDAPI_HOST not set")
    }
}
