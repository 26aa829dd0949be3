#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use traffic_lookup::domain::entities::{CanonicalDomain, TrafficPayload};
use traffic_lookup::domain::providers::{FetchError, TrafficProvider};
use traffic_lookup::domain::repositories::SnapshotRepository;
use traffic_lookup::infrastructure::persistence::InMemorySnapshotRepository;
use traffic_lookup::routes::router;
use traffic_lookup::state::AppState;

/// Provider that replays queued results and counts calls.
///
/// When the queue is empty every call returns [`ScriptedProvider::fallback`].
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<TrafficPayload, FetchError>>>,
    fallback: Result<TrafficPayload, FetchError>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
    delay: Duration,
    configured: bool,
}

impl ScriptedProvider {
    /// Always answers with `payload`.
    pub fn returning(payload: Value) -> Self {
        Self::with_fallback(Ok(payload_from(payload)))
    }

    /// Always fails with `error`.
    pub fn failing(error: FetchError) -> Self {
        Self::with_fallback(Err(error))
    }

    fn with_fallback(fallback: Result<TrafficPayload, FetchError>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            configured: true,
        }
    }

    /// Queues a one-off result ahead of the fallback.
    pub fn then(self, result: Result<Value, FetchError>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(result.map(payload_from));
        self
    }

    /// Sleeps before answering, to widen race windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_domains(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrafficProvider for ScriptedProvider {
    async fn fetch_metrics(&self, domain: &CanonicalDomain) -> Result<TrafficPayload, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested
            .lock()
            .unwrap()
            .push(domain.as_str().to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

pub fn payload_from(value: Value) -> TrafficPayload {
    serde_json::from_value(value).unwrap()
}

/// A realistic provider payload for `example.com`.
pub fn sample_payload() -> Value {
    json!({
        "SiteName": "example.com",
        "Title": "Example Domain",
        "Description": "Illustrative examples",
        "Category": "Computers_Electronics_and_Technology/Programming_and_Developer_Software",
        "IsSmall": false,
        "Policy": 0,
        "GlobalRank": { "Rank": 1234 },
        "CountryRank": { "Country": 840, "CountryCode": "US", "Rank": 987 },
        "CategoryRank": { "Rank": "45", "Category": "Programming" },
        "Engagments": {
            "BounceRate": "0.52",
            "Month": "5",
            "Year": "2024",
            "PagePerVisit": "2.1",
            "Visits": "1200000",
            "TimeOnSite": "95.3"
        },
        "EstimatedMonthlyVisits": {
            "2024-03-01": 1100000,
            "2024-04-01": 1150000,
            "2024-05-01": 1200000
        },
        "TopCountryShares": [
            { "Country": 840, "CountryCode": "US", "Value": 0.41 }
        ],
        "TrafficSources": {
            "Social": 0.02,
            "Paid Referrals": 0.01,
            "Mail": 0.0,
            "Referrals": 0.1,
            "Search": 0.45,
            "Direct": 0.42
        },
        "Competitors": { "TopSimilarityCompetitors": ["example.org"] },
        "SnapshotDate": "2024-05-01T00:00:00+00:00"
    })
}

pub fn create_test_state(
    repository: Arc<dyn SnapshotRepository>,
    provider: Arc<dyn TrafficProvider>,
) -> AppState {
    AppState::new(repository, provider, chrono::Duration::minutes(15), false)
}

/// Application routes and middleware over an in-memory store.
pub fn create_test_server(
    provider: Arc<ScriptedProvider>,
) -> (TestServer, Arc<InMemorySnapshotRepository>) {
    let repository = Arc::new(InMemorySnapshotRepository::new());
    let state = create_test_state(repository.clone(), provider);

    let server = TestServer::new(router(state)).unwrap();
    (server, repository)
}
