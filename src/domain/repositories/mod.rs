//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated via
//! `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`SnapshotRepository`] - Traffic snapshot storage and freshness lookups
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod snapshot_repository;

pub use snapshot_repository::SnapshotRepository;

#[cfg(test)]
pub use snapshot_repository::MockSnapshotRepository;
