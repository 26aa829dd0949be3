//! HTTP middleware for request processing.
//!
//! Provides security headers, CORS and observability middleware.

pub mod security_headers;
pub mod tracing;
