//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - Snapshot storage (PostgreSQL and in-memory)
//! - [`upstream`] - HTTP client for the traffic metrics provider

pub mod persistence;
pub mod upstream;
