//! Core domain entities.
//!
//! - [`CanonicalDomain`] - Validated lookup key
//! - [`Snapshot`] / [`NewSnapshot`] - Stored traffic fetch and its creation input
//! - [`TrafficMetrics`] - Provider metrics in their stored shape
//! - [`TrafficPayload`] - Provider metrics as received, before mapping

pub mod canonical_domain;
pub mod snapshot;
pub mod traffic_metrics;
pub mod traffic_payload;

pub use canonical_domain::CanonicalDomain;
pub use snapshot::{NewSnapshot, Snapshot};
pub use traffic_metrics::TrafficMetrics;
pub use traffic_payload::TrafficPayload;
