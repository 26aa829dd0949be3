//! DTOs for the traffic lookup endpoint.

use serde::{Deserialize, Serialize};

use crate::application::services::LookupOutcome;
use crate::domain::entities::Snapshot;

pub const CACHE_HIT_MESSAGE: &str = "Cache hit";
pub const FETCHED_MESSAGE: &str = "Traffic data fetched successfully";

/// Query string of `GET /api/traffic`.
///
/// `domain` is optional here so that a missing parameter reaches the
/// normalizer and produces the standard 400 body.
#[derive(Debug, Default, Deserialize)]
pub struct TrafficQuery {
    pub domain: Option<String>,
}

/// Successful lookup response.
#[derive(Debug, Serialize)]
pub struct TrafficResponse {
    pub data: Snapshot,
    pub message: &'static str,
}

impl From<LookupOutcome> for TrafficResponse {
    fn from(outcome: LookupOutcome) -> Self {
        let message = if outcome.is_cache_hit() {
            CACHE_HIT_MESSAGE
        } else {
            FETCHED_MESSAGE
        };

        Self {
            data: outcome.into_snapshot(),
            message,
        }
    }
}
