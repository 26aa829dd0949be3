//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating the snapshot
//! store and the upstream provider. Services consume the domain traits and
//! provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::traffic_service::TrafficService`] - Freshness-gated traffic lookup
//! - [`services::single_flight::SingleFlight`] - Optional per-domain fetch coordination

pub mod services;
