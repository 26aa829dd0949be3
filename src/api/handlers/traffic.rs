//! Handler for the traffic lookup endpoint.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde_json::json;

use crate::api::dto::traffic::{TrafficQuery, TrafficResponse};
use crate::application::services::traffic_service::INVALID_DOMAIN_MESSAGE;
use crate::error::AppError;
use crate::state::AppState;

/// Returns a traffic snapshot for a domain, reusing a recent one when possible.
///
/// # Endpoint
///
/// `GET /api/traffic?domain=example.com`
///
/// The domain may be given as a bare host or a full URL; it is lowercased,
/// reduced to its hostname and stripped of a leading `www.`.
///
/// # Response
///
/// ```json
/// {
///   "data": {
///     "id": 42,
///     "domain": "example.com",
///     "SiteName": "example.com",
///     "GlobalRank": 123,
///     "TopKeywords": [],
///     "fetchedAt": "2025-01-01T12:00:00Z",
///     "createdAt": "2025-01-01T12:00:00Z",
///     "updatedAt": "2025-01-01T12:00:00Z"
///   },
///   "message": "Cache hit"
/// }
/// ```
///
/// `message` is `"Traffic data fetched successfully"` when the snapshot was
/// fetched for this request.
///
/// # Errors
///
/// - **400** `domain query param is required` for a missing or invalid domain
/// - **500** `Failed to fetch from RapidAPI` when the upstream call fails
/// - **500** `Internal Server Error` on storage failures
pub async fn traffic_handler(
    State(state): State<AppState>,
    query: Result<Query<TrafficQuery>, QueryRejection>,
) -> Result<Json<TrafficResponse>, AppError> {
    let Query(query) = query.map_err(|e| {
        AppError::bad_request(INVALID_DOMAIN_MESSAGE, json!({ "reason": e.body_text() }))
    })?;

    let raw = query.domain.unwrap_or_default();
    let outcome = state.traffic_service.lookup(&raw).await?;

    Ok(Json(TrafficResponse::from(outcome)))
}
