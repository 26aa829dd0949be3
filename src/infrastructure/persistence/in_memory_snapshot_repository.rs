//! Process-local snapshot repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::domain::entities::{NewSnapshot, Snapshot};
use crate::domain::repositories::SnapshotRepository;
use crate::error::AppError;

/// Snapshot store held in process memory.
///
/// Used when no database is configured and by integration tests. Data is lost
/// on restart; retention is enforced by the same expiry worker as PostgreSQL.
pub struct InMemorySnapshotRepository {
    snapshots: RwLock<Vec<Snapshot>>,
    next_id: AtomicI64,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        tracing::debug!("Using in-memory snapshot store");
        Self {
            snapshots: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemorySnapshotRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotRepository for InMemorySnapshotRepository {
    async fn find_freshest(
        &self,
        domain: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<Snapshot>, AppError> {
        let snapshots = self.snapshots.read().await;

        Ok(snapshots
            .iter()
            .filter(|s| s.domain == domain && s.is_fresh_since(since))
            .max_by_key(|s| s.fetched_at)
            .cloned())
    }

    async fn insert(&self, new_snapshot: NewSnapshot) -> Result<Snapshot, AppError> {
        let mut snapshots = self.snapshots.write().await;
        let now = Utc::now();
        let fetched_at = new_snapshot.fetched_at.unwrap_or(now);

        if let Some(existing) = snapshots
            .iter()
            .find(|s| s.domain == new_snapshot.domain && s.fetched_at == fetched_at)
        {
            return Ok(existing.clone());
        }

        let snapshot = Snapshot {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            domain: new_snapshot.domain,
            metrics: new_snapshot.metrics,
            fetched_at,
            created_at: now,
            updated_at: now,
        };

        snapshots.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn history(&self, domain: &str, limit: i64) -> Result<Vec<Snapshot>, AppError> {
        let snapshots = self.snapshots.read().await;

        let mut matching: Vec<Snapshot> = snapshots
            .iter()
            .filter(|s| s.domain == domain)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.fetched_at.cmp(&a.fetched_at));
        matching.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(matching)
    }

    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let mut snapshots = self.snapshots.write().await;
        let before = snapshots.len();
        snapshots.retain(|s| s.created_at >= cutoff);

        Ok((before - snapshots.len()) as u64)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.snapshots.read().await.len() as i64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
