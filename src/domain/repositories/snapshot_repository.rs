//! Repository trait for traffic snapshots.

use crate::domain::entities::{NewSnapshot, Snapshot};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Append-only store of traffic snapshots keyed by domain.
///
/// Snapshots are identified by `(domain, fetched_at)`; a domain accumulates
/// history until the retention sweep removes old rows.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgSnapshotRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemorySnapshotRepository`] - Process-local store
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_snapshot.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Finds the most recent snapshot for `domain` fetched at or after `since`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Snapshot))` with the largest `fetched_at` among qualifying rows
    /// - `Ok(None)` if no snapshot is fresh enough
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_freshest(
        &self,
        domain: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<Snapshot>, AppError>;

    /// Persists a new snapshot and returns it with identity and timestamps.
    ///
    /// `fetched_at` defaults to the insertion time. Inserting a second snapshot
    /// with the same `(domain, fetched_at)` returns the existing one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn insert(&self, new_snapshot: NewSnapshot) -> Result<Snapshot, AppError>;

    /// Lists stored snapshots for a domain, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn history(&self, domain: &str, limit: i64) -> Result<Vec<Snapshot>, AppError>;

    /// Deletes snapshots created before `cutoff` and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;

    /// Counts all stored snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn count(&self) -> Result<i64, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
