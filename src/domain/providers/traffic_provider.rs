//! Upstream traffic provider trait and fetch errors.

use crate::domain::entities::{CanonicalDomain, TrafficPayload};
use async_trait::async_trait;

/// Why a fetch produced no usable metrics.
///
/// Every variant ends the lookup as an upstream failure. The tags exist so logs
/// and health checks can tell them apart; callers only see a generic message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    /// API key or host is missing; no request was attempted.
    #[error("upstream provider is not configured")]
    NotConfigured,

    /// The request never produced a response.
    #[error("upstream network error: {0}")]
    Network(String),

    /// The provider answered with a non-success status and an error body.
    #[error("upstream returned HTTP {status}: {body}")]
    ErrorEnvelope { status: u16, body: String },

    /// The provider answered 2xx but the body was not a metrics object.
    #[error("upstream payload could not be decoded: {0}")]
    Decode(String),
}

/// A source of traffic metrics for a domain.
///
/// Implementations perform at most one outbound call per invocation and never
/// retry.
///
/// # Implementations
///
/// - [`crate::infrastructure::upstream::RapidApiProvider`] - RapidAPI-hosted traffic endpoint
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrafficProvider: Send + Sync {
    /// Fetches metrics for a canonical domain.
    ///
    /// # Errors
    ///
    /// See [`FetchError`] for the failure tags.
    async fn fetch_metrics(&self, domain: &CanonicalDomain) -> Result<TrafficPayload, FetchError>;

    /// Whether credentials are present. An unconfigured provider always fails
    /// with [`FetchError::NotConfigured`].
    fn is_configured(&self) -> bool;
}
