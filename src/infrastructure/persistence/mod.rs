//! Snapshot repository implementations.
//!
//! - [`PgSnapshotRepository`] - PostgreSQL storage via SQLx
//! - [`InMemorySnapshotRepository`] - Process-local storage when no database is configured

pub mod in_memory_snapshot_repository;
pub mod pg_snapshot_repository;

pub use in_memory_snapshot_repository::InMemorySnapshotRepository;
pub use pg_snapshot_repository::PgSnapshotRepository;
