//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod fallback;
pub mod health;
pub mod traffic;

pub use fallback::fallback_handler;
pub use health::health_handler;
pub use traffic::traffic_handler;
