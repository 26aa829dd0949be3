//! Freshness-gated traffic lookup.
//!
//! # Lookup Flow
//!
//! 1. Normalize the raw domain; invalid input ends the request
//! 2. Probe the store for a snapshot fetched within the freshness window
//! 3. On a hit, return it without touching the provider
//! 4. On a miss, fetch once from the provider; any failure ends the request
//! 5. Map the payload and persist it as a new snapshot
//!
//! There is no retry loop. Concurrent misses for the same domain may both
//! fetch and persist unless single-flight is enabled.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::sync::Arc;

use super::single_flight::SingleFlight;
use crate::domain::entities::{CanonicalDomain, NewSnapshot, Snapshot};
use crate::domain::providers::TrafficProvider;
use crate::domain::repositories::SnapshotRepository;
use crate::error::AppError;
use crate::utils::domain_normalizer::normalize_domain;

pub const INVALID_DOMAIN_MESSAGE: &str = "domain query param is required";
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to fetch from RapidAPI";

/// Result of a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// A snapshot inside the freshness window was reused.
    CacheHit(Snapshot),
    /// A new snapshot was fetched and stored.
    Fetched(Snapshot),
}

impl LookupOutcome {
    pub fn snapshot(&self) -> &Snapshot {
        match self {
            LookupOutcome::CacheHit(s) | LookupOutcome::Fetched(s) => s,
        }
    }

    pub fn into_snapshot(self) -> Snapshot {
        match self {
            LookupOutcome::CacheHit(s) | LookupOutcome::Fetched(s) => s,
        }
    }

    pub fn is_cache_hit(&self) -> bool {
        matches!(self, LookupOutcome::CacheHit(_))
    }
}

/// Orchestrates normalization, cache probe, upstream fetch and persistence.
pub struct TrafficService {
    repository: Arc<dyn SnapshotRepository>,
    provider: Arc<dyn TrafficProvider>,
    freshness_window: Duration,
    single_flight: Option<SingleFlight>,
}

impl TrafficService {
    /// Creates a lookup service with the given freshness window.
    pub fn new(
        repository: Arc<dyn SnapshotRepository>,
        provider: Arc<dyn TrafficProvider>,
        freshness_window: Duration,
    ) -> Self {
        Self {
            repository,
            provider,
            freshness_window,
            single_flight: None,
        }
    }

    /// Serializes misses per domain so concurrent callers share one fetch.
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled.then(SingleFlight::new);
        self
    }

    /// Returns a snapshot for `raw_domain`, from cache when fresh enough.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the domain is missing or invalid.
    /// Returns [`AppError::Upstream`] if the provider yields no usable metrics.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn lookup(&self, raw_domain: &str) -> Result<LookupOutcome, AppError> {
        let domain = normalize_domain(raw_domain).map_err(|e| {
            tracing::debug!(input = raw_domain, "Rejected domain: {}", e);
            AppError::bad_request(INVALID_DOMAIN_MESSAGE, json!({ "reason": e.to_string() }))
        })?;

        if let Some(snapshot) = self.probe(&domain).await? {
            return Ok(LookupOutcome::CacheHit(snapshot));
        }

        let _flight = match &self.single_flight {
            Some(flights) => {
                let guard = flights.acquire(domain.as_str()).await;
                // Whoever held the key before us has likely just stored a snapshot.
                if let Some(snapshot) = self.probe(&domain).await? {
                    return Ok(LookupOutcome::CacheHit(snapshot));
                }
                Some(guard)
            }
            None => None,
        };

        self.fetch_and_store(domain).await.map(LookupOutcome::Fetched)
    }

    async fn probe(&self, domain: &CanonicalDomain) -> Result<Option<Snapshot>, AppError> {
        let since = Utc::now()
            .checked_sub_signed(self.freshness_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let cached = self.repository.find_freshest(domain.as_str(), since).await?;

        match &cached {
            Some(snapshot) => {
                tracing::debug!(%domain, fetched_at = %snapshot.fetched_at, "Cache HIT")
            }
            None => tracing::debug!(%domain, "Cache MISS"),
        }

        Ok(cached)
    }

    async fn fetch_and_store(&self, domain: CanonicalDomain) -> Result<Snapshot, AppError> {
        let payload = self.provider.fetch_metrics(&domain).await.map_err(|e| {
            tracing::warn!(%domain, "Upstream fetch failed: {}", e);
            AppError::upstream(
                UPSTREAM_FAILURE_MESSAGE,
                json!({ "domain": domain.as_str(), "reason": e.to_string() }),
            )
        })?;

        let new_snapshot = NewSnapshot::new(domain.into_inner(), payload.into_metrics());
        let snapshot = self.repository.insert(new_snapshot).await?;

        tracing::info!(
            domain = %snapshot.domain,
            id = snapshot.id,
            "Stored new traffic snapshot"
        );

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{TrafficMetrics, TrafficPayload};
    use crate::domain::providers::{FetchError, MockTrafficProvider};
    use crate::domain::repositories::MockSnapshotRepository;

    fn snapshot(domain: &str, fetched_at: DateTime<Utc>) -> Snapshot {
        Snapshot {
            id: 7,
            domain: domain.to_string(),
            metrics: TrafficMetrics::default(),
            fetched_at,
            created_at: fetched_at,
            updated_at: fetched_at,
        }
    }

    fn service(repo: MockSnapshotRepository, provider: MockTrafficProvider) -> TrafficService {
        TrafficService::new(Arc::new(repo), Arc::new(provider), Duration::minutes(15))
    }

    #[tokio::test]
    async fn test_invalid_domain_touches_nothing() {
        let mut mock_repo = MockSnapshotRepository::new();
        let mut mock_provider = MockTrafficProvider::new();
        mock_repo.expect_find_freshest().times(0);
        mock_repo.expect_insert().times(0);
        mock_provider.expect_fetch_metrics().times(0);

        let result = service(mock_repo, mock_provider).lookup("not a domain").await;

        match result {
            Err(AppError::Validation { message, .. }) => {
                assert_eq!(message, INVALID_DOMAIN_MESSAGE)
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fresh_snapshot_short_circuits_upstream() {
        let mut mock_repo = MockSnapshotRepository::new();
        let mut mock_provider = MockTrafficProvider::new();
        let cached = snapshot("example.com", Utc::now() - Duration::minutes(10));
        let returned = cached.clone();

        mock_repo
            .expect_find_freshest()
            .withf(|domain, since| {
                let expected = Utc::now() - Duration::minutes(15);
                domain == "example.com" && (expected - *since).num_seconds().abs() < 5
            })
            .times(1)
            .returning(move |_, _| Ok(Some(returned.clone())));
        mock_repo.expect_insert().times(0);
        mock_provider.expect_fetch_metrics().times(0);

        let outcome = service(mock_repo, mock_provider)
            .lookup("WWW.Example.COM")
            .await
            .unwrap();

        assert!(outcome.is_cache_hit());
        assert_eq!(outcome.into_snapshot(), cached);
    }

    #[tokio::test]
    async fn test_stale_snapshot_fetches_exactly_once() {
        let mut mock_repo = MockSnapshotRepository::new();
        let mut mock_provider = MockTrafficProvider::new();

        // A 20-minute-old snapshot is outside the window, so the store reports nothing fresh.
        mock_repo
            .expect_find_freshest()
            .times(1)
            .returning(|_, _| Ok(None));
        mock_provider
            .expect_fetch_metrics()
            .withf(|domain| domain.as_str() == "example.com")
            .times(1)
            .returning(|_| {
                Ok(TrafficPayload {
                    site_name: Some("example.com".to_string()),
                    ..Default::default()
                })
            });
        mock_repo
            .expect_insert()
            .withf(|new| new.domain == "example.com" && new.fetched_at.is_none())
            .times(1)
            .returning(|new| {
                let mut stored = snapshot(&new.domain, Utc::now());
                stored.metrics = new.metrics;
                Ok(stored)
            });

        let outcome = service(mock_repo, mock_provider)
            .lookup("example.com")
            .await
            .unwrap();

        assert!(!outcome.is_cache_hit());
        assert_eq!(
            outcome.snapshot().metrics.site_name.as_deref(),
            Some("example.com")
        );
    }

    #[tokio::test]
    async fn test_missing_keywords_persist_as_empty_list() {
        let mut mock_repo = MockSnapshotRepository::new();
        let mut mock_provider = MockTrafficProvider::new();

        mock_repo.expect_find_freshest().returning(|_, _| Ok(None));
        mock_provider.expect_fetch_metrics().returning(|_| {
            let payload: TrafficPayload =
                serde_json::from_value(json!({ "SiteName": "example.com" })).unwrap();
            Ok(payload)
        });
        mock_repo
            .expect_insert()
            .withf(|new| new.metrics.top_keywords.is_empty())
            .times(1)
            .returning(|new| {
                let mut stored = snapshot(&new.domain, Utc::now());
                stored.metrics = new.metrics;
                Ok(stored)
            });

        let outcome = service(mock_repo, mock_provider)
            .lookup("example.com")
            .await
            .unwrap();

        let value = serde_json::to_value(outcome.snapshot()).unwrap();
        assert_eq!(value["TopKeywords"], json!([]));
    }

    #[tokio::test]
    async fn test_upstream_failure_creates_no_snapshot() {
        for failure in [
            FetchError::NotConfigured,
            FetchError::Network("connection refused".to_string()),
            FetchError::ErrorEnvelope {
                status: 429,
                body: r#"{"message":"quota exceeded"}"#.to_string(),
            },
            FetchError::Decode("expected value".to_string()),
        ] {
            let mut mock_repo = MockSnapshotRepository::new();
            let mut mock_provider = MockTrafficProvider::new();

            mock_repo.expect_find_freshest().returning(|_, _| Ok(None));
            mock_repo.expect_insert().times(0);
            mock_provider
                .expect_fetch_metrics()
                .times(1)
                .returning(move |_| Err(failure.clone()));

            let result = service(mock_repo, mock_provider).lookup("example.com").await;

            match result {
                Err(AppError::Upstream { message, .. }) => {
                    assert_eq!(message, UPSTREAM_FAILURE_MESSAGE)
                }
                other => panic!("expected upstream error, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_unbounded_window_probes_from_the_beginning() {
        let mut mock_repo = MockSnapshotRepository::new();
        let mut mock_provider = MockTrafficProvider::new();
        let cached = snapshot("example.com", Utc::now() - Duration::days(365));
        let returned = cached.clone();

        mock_repo
            .expect_find_freshest()
            .withf(|_, since| *since == DateTime::<Utc>::MIN_UTC)
            .times(1)
            .returning(move |_, _| Ok(Some(returned.clone())));
        mock_provider.expect_fetch_metrics().times(0);

        let service = TrafficService::new(
            Arc::new(mock_repo),
            Arc::new(mock_provider),
            Duration::MAX,
        );
        let outcome = service.lookup("example.com").await.unwrap();

        assert!(outcome.is_cache_hit());
        assert_eq!(outcome.into_snapshot(), cached);
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let mut mock_repo = MockSnapshotRepository::new();
        let mut mock_provider = MockTrafficProvider::new();

        mock_repo
            .expect_find_freshest()
            .returning(|_, _| Err(AppError::internal("Database error", json!({}))));
        mock_provider.expect_fetch_metrics().times(0);

        let result = service(mock_repo, mock_provider).lookup("example.com").await;
        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_single_flight_reprobes_before_fetching() {
        let mut mock_repo = MockSnapshotRepository::new();
        let mut mock_provider = MockTrafficProvider::new();
        let mut seq = mockall::Sequence::new();
        let fresh = snapshot("example.com", Utc::now());

        mock_repo
            .expect_find_freshest()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(None));
        mock_repo
            .expect_find_freshest()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Ok(Some(fresh.clone())));
        mock_provider.expect_fetch_metrics().times(0);

        let outcome = service(mock_repo, mock_provider)
            .with_single_flight(true)
            .lookup("example.com")
            .await
            .unwrap();

        assert!(outcome.is_cache_hit());
    }
}
