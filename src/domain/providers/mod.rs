//! Upstream data source abstractions.
//!
//! - [`TrafficProvider`] - Fetches raw traffic metrics for a domain
//! - [`FetchError`] - Tagged fetch failures

pub mod traffic_provider;

pub use traffic_provider::{FetchError, TrafficProvider};

#[cfg(test)]
pub use traffic_provider::MockTrafficProvider;
