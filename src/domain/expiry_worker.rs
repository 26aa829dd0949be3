//! Background retention sweep for old snapshots.
//!
//! Runs independently of the freshness window: a snapshot may be stale for
//! lookups long before it is old enough to be deleted.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};

use crate::domain::repositories::SnapshotRepository;

/// Periodically deletes snapshots older than `retention`.
///
/// The first sweep runs immediately. Failures are logged and the worker keeps
/// going; the next tick retries. Exits when `shutdown` flips to `true` or its
/// sender is dropped.
pub async fn run_expiry_worker(
    repository: Arc<dyn SnapshotRepository>,
    retention: Duration,
    sweep_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let retention = match chrono::Duration::from_std(retention) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("Invalid snapshot retention {:?}: {}", retention, e);
            return;
        }
    };

    let mut ticker = interval(sweep_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        retention_secs = retention.num_seconds(),
        interval_secs = sweep_interval.as_secs(),
        "Expiry worker started"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                sweep_once(repository.as_ref(), retention).await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    tracing::info!("Expiry worker stopped");
}

/// Runs a single retention sweep and returns the number of deleted snapshots.
pub async fn sweep_once(repository: &dyn SnapshotRepository, retention: chrono::Duration) -> u64 {
    let cutoff = Utc::now() - retention;

    match repository.purge_created_before(cutoff).await {
        Ok(0) => 0,
        Ok(deleted) => {
            tracing::info!(deleted, %cutoff, "Expired snapshots removed");
            deleted
        }
        Err(e) => {
            tracing::warn!("Snapshot expiry sweep failed: {}", e);
            0
        }
    }
}
