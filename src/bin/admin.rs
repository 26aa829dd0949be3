//! CLI administration tool for traffic-lookup.
//!
//! Provides commands for inspecting stored snapshots, purging expired ones,
//! and checking the database without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Show the latest snapshots for a domain
//! cargo run --bin admin -- snapshots history example.com --limit 5
//!
//! # Delete snapshots past the retention period
//! cargo run --bin admin -- snapshots purge
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` (required): PostgreSQL connection
//! - `SNAPSHOT_RETENTION_SECONDS`: default retention for `purge`

use traffic_lookup::config::{self, Config};
use traffic_lookup::domain::entities::Snapshot;
use traffic_lookup::domain::repositories::SnapshotRepository;
use traffic_lookup::infrastructure::persistence::PgSnapshotRepository;
use traffic_lookup::server::connect_database;
use traffic_lookup::utils::domain_normalizer::normalize_domain;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing traffic-lookup.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect and expire stored snapshots
    Snapshots {
        #[command(subcommand)]
        action: SnapshotAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Snapshot subcommands.
#[derive(Subcommand)]
enum SnapshotAction {
    /// List the most recent snapshots for a domain
    History {
        /// Domain or URL (normalized like API input)
        domain: String,

        /// Maximum number of snapshots to show
        #[arg(short, long, default_value_t = 10)]
        limit: i64,
    },

    /// Delete snapshots older than the retention period
    Purge {
        /// Retention in seconds (defaults to SNAPSHOT_RETENTION_SECONDS)
        #[arg(long)]
        older_than: Option<u64>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL (or DB_USER/DB_PASSWORD/DB_NAME) must be set")?;

    let pool = connect_database(&config, &database_url).await?;

    match cli.command {
        Commands::Snapshots { action } => handle_snapshot_action(action, &config, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    pool.close().await;

    Ok(())
}

/// Dispatches snapshot commands.
async fn handle_snapshot_action(
    action: SnapshotAction,
    config: &Config,
    pool: &PgPool,
) -> Result<()> {
    let repo = PgSnapshotRepository::new(Arc::new(pool.clone()));

    match action {
        SnapshotAction::History { domain, limit } => {
            show_history(&repo, config, &domain, limit).await?;
        }
        SnapshotAction::Purge { older_than, yes } => {
            let retention = older_than.unwrap_or(config.snapshot_retention_seconds);
            purge_snapshots(&repo, retention, yes).await?;
        }
    }

    Ok(())
}

/// Prints the newest snapshots for a domain, marking those still fresh.
///
/// # Output Format
///
/// ```text
/// 📈 Snapshot history for example.com
///
///   ID    Fetched              Global rank  Monthly visits   Status
///   ─────────────────────────────────────────────────────────────────────────
///   42    2025-01-15 10:30     123          1,200,000        FRESH
///   17    2025-01-15 09:50     125          1,180,000        STALE
/// ```
async fn show_history(
    repo: &PgSnapshotRepository,
    config: &Config,
    raw_domain: &str,
    limit: i64,
) -> Result<()> {
    let domain = normalize_domain(raw_domain)
        .with_context(|| format!("'{}' is not a valid domain", raw_domain))?;

    println!(
        "{} {}",
        "📈 Snapshot history for".bright_blue().bold(),
        domain.as_str().cyan().bold()
    );
    println!();

    let snapshots = repo
        .history(domain.as_str(), limit.max(1))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load snapshots: {}", e))?;

    if snapshots.is_empty() {
        println!("{}", "  No snapshots found".yellow());
        println!();
        println!(
            "  Fetch one with: {}",
            format!("curl 'http://localhost:4000/api/traffic?domain={}'", domain).bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<5} {:<20} {:<12} {:<16} {:<6}",
        "ID".bright_white().bold(),
        "Fetched".bright_white().bold(),
        "Global rank".bright_white().bold(),
        "Monthly visits".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    let since = Utc::now()
        .checked_sub_signed(config.freshness_window())
        .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC);

    for snapshot in &snapshots {
        let status = if snapshot.is_fresh_since(since) {
            "FRESH".green()
        } else {
            "STALE".bright_black()
        };

        let rank = snapshot
            .metrics
            .global_rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "  {:<5} {:<20} {:<12} {:<16} {}",
            snapshot.id.to_string().bright_black(),
            snapshot
                .fetched_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            rank.cyan(),
            latest_visits(snapshot),
            status
        );
    }

    println!();
    println!(
        "  Total: {}",
        snapshots.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Visits for the most recent month the provider reported.
fn latest_visits(snapshot: &Snapshot) -> String {
    snapshot
        .metrics
        .estimated_monthly_visits
        .iter()
        .next_back()
        .map(|(_, visits)| visits.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Deletes snapshots created more than `retention_secs` ago, after confirmation.
async fn purge_snapshots(
    repo: &PgSnapshotRepository,
    retention_secs: u64,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🧹 Purge Expired Snapshots".bright_blue().bold());
    println!();

    let retention = chrono::Duration::seconds(
        i64::try_from(retention_secs).context("Retention is out of range")?,
    );
    let cutoff = Utc::now() - retention;

    println!(
        "  Deleting snapshots created before {}",
        cutoff.format("%Y-%m-%d %H:%M:%S UTC").to_string().cyan()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete these snapshots?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let deleted = repo
        .purge_created_before(cutoff)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to purge snapshots: {}", e))?;

    println!();
    println!(
        "{} {}",
        "✅ Snapshots deleted:".green().bold(),
        deleted.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Displays store statistics.
///
/// Shows:
/// - Total number of snapshots
/// - Number of distinct domains
/// - Newest fetch time
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let repo = PgSnapshotRepository::new(Arc::new(pool.clone()));
    let snapshots_count = repo
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count snapshots: {}", e))?;

    let domains_count: i64 =
        sqlx::query_scalar("SELECT COUNT(DISTINCT domain) FROM traffic_snapshots")
            .fetch_one(pool)
            .await?;

    let newest: Option<chrono::DateTime<Utc>> =
        sqlx::query_scalar("SELECT MAX(fetched_at) FROM traffic_snapshots")
            .fetch_one(pool)
            .await?;

    println!(
        "  Snapshots:     {}",
        snapshots_count.to_string().bright_green().bold()
    );
    println!(
        "  Domains:       {}",
        domains_count.to_string().bright_green().bold()
    );
    println!(
        "  Last fetch:    {}",
        newest
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "never".to_string())
            .bright_white()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
