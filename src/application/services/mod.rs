//! Business logic services for the application layer.

pub mod single_flight;
pub mod traffic_service;

pub use single_flight::SingleFlight;
pub use traffic_service::{LookupOutcome, TrafficService};
