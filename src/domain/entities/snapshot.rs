//! Snapshot entity: one immutable traffic fetch for one domain.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::TrafficMetrics;

/// A stored traffic snapshot.
///
/// Snapshots are never updated. A newer fetch produces a new snapshot; old
/// ones are removed only by the retention sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: i64,
    pub domain: String,
    #[serde(flatten)]
    pub metrics: TrafficMetrics,
    pub fetched_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Snapshot {
    /// Returns true when the snapshot was fetched at or after `since`.
    pub fn is_fresh_since(&self, since: DateTime<Utc>) -> bool {
        self.fetched_at >= since
    }
}

/// Input data for persisting a new snapshot.
///
/// `fetched_at` is normally left `None` so the store stamps the insertion
/// time; an explicit value is used when importing or seeding history.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSnapshot {
    pub domain: String,
    pub metrics: TrafficMetrics,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl NewSnapshot {
    pub fn new(domain: impl Into<String>, metrics: TrafficMetrics) -> Self {
        Self {
            domain: domain.into(),
            metrics,
            fetched_at: None,
        }
    }

    pub fn fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = Some(fetched_at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn snapshot_at(fetched_at: DateTime<Utc>) -> Snapshot {
        Snapshot {
            id: 1,
            domain: "example.com".to_string(),
            metrics: TrafficMetrics::default(),
            fetched_at,
            created_at: fetched_at,
            updated_at: fetched_at,
        }
    }

    #[test]
    fn test_freshness_boundary_is_inclusive() {
        let now = Utc::now();
        let snapshot = snapshot_at(now - Duration::minutes(15));

        assert!(snapshot.is_fresh_since(now - Duration::minutes(15)));
        assert!(!snapshot.is_fresh_since(now - Duration::minutes(14)));
    }

    #[test]
    fn test_serialized_shape() {
        let mut snapshot = snapshot_at(Utc::now());
        snapshot.metrics.site_name = Some("example.com".to_string());
        snapshot.metrics.global_rank = Some(42);

        let value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(value["id"], 1);
        assert_eq!(value["domain"], "example.com");
        assert_eq!(value["SiteName"], "example.com");
        assert_eq!(value["GlobalRank"], 42);
        assert!(value["fetchedAt"].is_string());
        assert!(value["createdAt"].is_string());
        assert!(value["updatedAt"].is_string());
        assert!(value["TopKeywords"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_new_snapshot_defaults_fetch_time_to_store() {
        let new_snapshot = NewSnapshot::new("example.com", TrafficMetrics::default());
        assert!(new_snapshot.fetched_at.is_none());

        let at = Utc::now() - Duration::minutes(20);
        let seeded = new_snapshot.fetched_at(at);
        assert_eq!(seeded.fetched_at, Some(at));
    }
}
