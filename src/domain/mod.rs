//! Domain layer containing business entities and contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Snapshots, metrics and the canonical domain key
//! - [`repositories`] - Snapshot storage trait
//! - [`providers`] - Upstream traffic provider trait
//! - [`expiry_worker`] - Background retention sweep
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. The lookup protocol itself lives in
//! [`crate::application::services::TrafficService`].

pub mod entities;
pub mod expiry_worker;
pub mod providers;
pub mod repositories;
