//! Shared state injected into every handler.

use std::sync::Arc;

use crate::application::services::TrafficService;
use crate::domain::providers::TrafficProvider;
use crate::domain::repositories::SnapshotRepository;

/// Handles created once at startup and cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub traffic_service: Arc<TrafficService>,
    pub repository: Arc<dyn SnapshotRepository>,
    pub provider: Arc<dyn TrafficProvider>,
}

impl AppState {
    /// Wires the lookup service over the given store and provider.
    pub fn new(
        repository: Arc<dyn SnapshotRepository>,
        provider: Arc<dyn TrafficProvider>,
        freshness_window: chrono::Duration,
        single_flight: bool,
    ) -> Self {
        let traffic_service = Arc::new(
            TrafficService::new(repository.clone(), provider.clone(), freshness_window)
                .with_single_flight(single_flight),
        );

        Self {
            traffic_service,
            repository,
            provider,
        }
    }
}
