//! HTTP server initialization and runtime setup.
//!
//! Handles store selection, migrations, the upstream client, the expiry worker
//! and the Axum server lifecycle.

use crate::config::Config;
use crate::domain::expiry_worker::run_expiry_worker;
use crate::domain::providers::TrafficProvider;
use crate::domain::repositories::SnapshotRepository;
use crate::infrastructure::persistence::{InMemorySnapshotRepository, PgSnapshotRepository};
use crate::infrastructure::upstream::RapidApiProvider;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Connects to PostgreSQL with the configured pool settings and applies migrations.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn connect_database(config: &Config, database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations (or the in-memory store)
/// - RapidAPI client
/// - Background expiry worker
/// - Axum HTTP server with graceful shutdown on Ctrl+C / SIGTERM
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - The HTTP client cannot be built
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = match &config.database_url {
        Some(url) => Some(connect_database(&config, url).await?),
        None => {
            tracing::warn!("No database configured; snapshots are kept in memory");
            None
        }
    };

    let repository: Arc<dyn SnapshotRepository> = match &pool {
        Some(pool) => Arc::new(PgSnapshotRepository::new(Arc::new(pool.clone()))),
        None => Arc::new(InMemorySnapshotRepository::new()),
    };

    let provider: Arc<dyn TrafficProvider> = Arc::new(
        RapidApiProvider::new(config.rapidapi()).context("Failed to build upstream HTTP client")?,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let expiry_worker = tokio::spawn(run_expiry_worker(
        repository.clone(),
        config.snapshot_retention(),
        config.expiry_interval(),
        shutdown_rx,
    ));

    let state = AppState::new(
        repository,
        provider,
        config.freshness_window(),
        config.single_flight,
    );

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped, shutting down background tasks");

    // The receiver may already be gone if the worker exited early.
    let _ = shutdown_tx.send(true);
    if let Err(e) = expiry_worker.await {
        tracing::warn!("Expiry worker terminated abnormally: {}", e);
    }

    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database pool closed");
    }

    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
