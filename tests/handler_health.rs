mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use common::{ScriptedProvider, create_test_state, sample_payload};
use serde_json::{Value, json};
use std::sync::Arc;
use traffic_lookup::AppError;
use traffic_lookup::api::handlers::health_handler;
use traffic_lookup::domain::entities::{NewSnapshot, Snapshot};
use traffic_lookup::domain::repositories::SnapshotRepository;
use traffic_lookup::infrastructure::persistence::InMemorySnapshotRepository;
use traffic_lookup::state::AppState;

/// Store whose every call fails, as if the database were down.
struct UnreachableRepository;

fn down() -> AppError {
    AppError::internal("Database error", json!({ "reason": "connection refused" }))
}

#[async_trait]
impl SnapshotRepository for UnreachableRepository {
    async fn find_freshest(
        &self,
        _domain: &str,
        _since: DateTime<Utc>,
    ) -> Result<Option<Snapshot>, AppError> {
        Err(down())
    }

    async fn insert(&self, _new_snapshot: NewSnapshot) -> Result<Snapshot, AppError> {
        Err(down())
    }

    async fn history(&self, _domain: &str, _limit: i64) -> Result<Vec<Snapshot>, AppError> {
        Err(down())
    }

    async fn purge_created_before(&self, _cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        Err(down())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Err(down())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(down())
    }
}

fn health_server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_endpoint_success() {
    let state = create_test_state(
        Arc::new(InMemorySnapshotRepository::new()),
        Arc::new(ScriptedProvider::returning(sample_payload())),
    );
    let server = health_server(state);

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["store"]["message"], "Connected, 0 snapshots");
    assert_eq!(json["checks"]["upstream"]["status"], "ok");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let state = create_test_state(
        Arc::new(InMemorySnapshotRepository::new()),
        Arc::new(ScriptedProvider::returning(sample_payload())),
    );
    let server = health_server(state);

    let json = server.get("/health").await.json::<Value>();

    assert!(json.get("status").is_some());
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["checks"].get("store").is_some());
    assert!(json["checks"].get("upstream").is_some());
}

#[tokio::test]
async fn test_unconfigured_upstream_is_reported_but_healthy() {
    let state = create_test_state(
        Arc::new(InMemorySnapshotRepository::new()),
        Arc::new(ScriptedProvider::returning(sample_payload()).unconfigured()),
    );
    let server = health_server(state);

    let response = server.get("/health").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["upstream"]["status"], "error");
}

#[tokio::test]
async fn test_unreachable_store_returns_503() {
    let state = create_test_state(
        Arc::new(UnreachableRepository),
        Arc::new(ScriptedProvider::returning(sample_payload())),
    );
    let server = health_server(state);

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["store"]["status"], "error");
}

#[tokio::test]
async fn test_store_failure_during_lookup_is_generic_500() {
    let provider = Arc::new(ScriptedProvider::returning(sample_payload()));
    let state = create_test_state(Arc::new(UnreachableRepository), provider.clone());
    let server = TestServer::new(traffic_lookup::routes::router(state)).unwrap();

    let response = server
        .get("/api/traffic")
        .add_query_param("domain", "example.com")
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({ "message": "Internal Server Error", "data": [] })
    );
    assert_eq!(provider.calls(), 0);
}
