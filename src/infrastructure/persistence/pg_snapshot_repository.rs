//! PostgreSQL implementation of the snapshot repository.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::entities::traffic_metrics::{
    CategoryRank, Competitors, Country, CountryRank, CountryShare, Engagements, Keyword,
    Notification, TrafficSources,
};
use crate::domain::entities::{NewSnapshot, Snapshot, TrafficMetrics};
use crate::domain::repositories::SnapshotRepository;
use crate::error::AppError;

const SNAPSHOT_COLUMNS: &str = r#"
    id, domain,
    site_name, title, description, category, large_screenshot,
    is_small, is_data_from_ga, policy, snapshot_date, cached, global_rank,
    country_rank, category_rank, global_category_rank,
    top_country_shares, engagements, estimated_monthly_visits, traffic_sources,
    competitors, top_keywords, countries, notification,
    fetched_at, created_at, updated_at
"#;

/// Row shape of `traffic_snapshots`; structured metric groups live in JSONB.
#[derive(sqlx::FromRow)]
struct SnapshotRow {
    id: i64,
    domain: String,
    site_name: Option<String>,
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    large_screenshot: Option<String>,
    is_small: Option<bool>,
    is_data_from_ga: Option<bool>,
    policy: Option<i64>,
    snapshot_date: Option<DateTime<Utc>>,
    cached: Option<i64>,
    global_rank: Option<i64>,
    country_rank: Option<Json<CountryRank>>,
    category_rank: Option<Json<CategoryRank>>,
    global_category_rank: Option<Json<CategoryRank>>,
    top_country_shares: Json<Vec<CountryShare>>,
    engagements: Json<Engagements>,
    estimated_monthly_visits: Json<BTreeMap<String, i64>>,
    traffic_sources: Json<TrafficSources>,
    competitors: Json<Competitors>,
    top_keywords: Json<Vec<Keyword>>,
    countries: Json<Vec<Country>>,
    notification: Json<Notification>,
    fetched_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SnapshotRow> for Snapshot {
    fn from(r: SnapshotRow) -> Self {
        Snapshot {
            id: r.id,
            domain: r.domain,
            metrics: TrafficMetrics {
                site_name: r.site_name,
                title: r.title,
                description: r.description,
                category: r.category,
                large_screenshot: r.large_screenshot,
                is_small: r.is_small,
                is_data_from_ga: r.is_data_from_ga,
                policy: r.policy,
                snapshot_date: r.snapshot_date,
                cached: r.cached,
                top_country_shares: r.top_country_shares.0,
                engagements: r.engagements.0,
                estimated_monthly_visits: r.estimated_monthly_visits.0,
                global_rank: r.global_rank,
                country_rank: r.country_rank.map(|j| j.0),
                category_rank: r.category_rank.map(|j| j.0),
                global_category_rank: r.global_category_rank.map(|j| j.0),
                traffic_sources: r.traffic_sources.0,
                competitors: r.competitors.0,
                top_keywords: r.top_keywords.0,
                countries: r.countries.0,
                notification: r.notification.0,
            },
            fetched_at: r.fetched_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL repository for traffic snapshots.
///
/// Freshness probes are served by the `(domain, fetched_at DESC)` index.
/// Duplicate `(domain, fetched_at)` inserts resolve to the existing row.
pub struct PgSnapshotRepository {
    pool: Arc<PgPool>,
}

impl PgSnapshotRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn find_exact(
        &self,
        domain: &str,
        fetched_at: DateTime<Utc>,
    ) -> Result<Option<Snapshot>, AppError> {
        let query = format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM traffic_snapshots WHERE domain = $1 AND fetched_at = $2"
        );

        let row = sqlx::query_as::<_, SnapshotRow>(&query)
            .bind(domain)
            .bind(fetched_at)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Snapshot::from))
    }
}

#[async_trait]
impl SnapshotRepository for PgSnapshotRepository {
    async fn find_freshest(
        &self,
        domain: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<Snapshot>, AppError> {
        let query = format!(
            r#"
            SELECT {SNAPSHOT_COLUMNS}
            FROM traffic_snapshots
            WHERE domain = $1 AND fetched_at >= $2
            ORDER BY fetched_at DESC
            LIMIT 1
            "#
        );

        let row = sqlx::query_as::<_, SnapshotRow>(&query)
            .bind(domain)
            .bind(since)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Snapshot::from))
    }

    async fn insert(&self, new_snapshot: NewSnapshot) -> Result<Snapshot, AppError> {
        let NewSnapshot {
            domain,
            metrics: m,
            fetched_at,
        } = new_snapshot;
        // Stored with microsecond precision, so stamp at that precision to look it up on conflict.
        let fetched_at = fetched_at.unwrap_or_else(Utc::now).trunc_subsecs(6);

        let query = format!(
            r#"
            INSERT INTO traffic_snapshots (
                domain,
                site_name, title, description, category, large_screenshot,
                is_small, is_data_from_ga, policy, snapshot_date, cached, global_rank,
                country_rank, category_rank, global_category_rank,
                top_country_shares, engagements, estimated_monthly_visits, traffic_sources,
                competitors, top_keywords, countries, notification,
                fetched_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23,
                    $24)
            ON CONFLICT (domain, fetched_at) DO NOTHING
            RETURNING {SNAPSHOT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, SnapshotRow>(&query)
            .bind(&domain)
            .bind(m.site_name)
            .bind(m.title)
            .bind(m.description)
            .bind(m.category)
            .bind(m.large_screenshot)
            .bind(m.is_small)
            .bind(m.is_data_from_ga)
            .bind(m.policy)
            .bind(m.snapshot_date)
            .bind(m.cached)
            .bind(m.global_rank)
            .bind(m.country_rank.map(Json))
            .bind(m.category_rank.map(Json))
            .bind(m.global_category_rank.map(Json))
            .bind(Json(m.top_country_shares))
            .bind(Json(m.engagements))
            .bind(Json(m.estimated_monthly_visits))
            .bind(Json(m.traffic_sources))
            .bind(Json(m.competitors))
            .bind(Json(m.top_keywords))
            .bind(Json(m.countries))
            .bind(Json(m.notification))
            .bind(fetched_at)
            .fetch_optional(self.pool.as_ref())
            .await?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        // Conflict on (domain, fetched_at): hand back the row that won.
        self.find_exact(&domain, fetched_at).await?.ok_or_else(|| {
            AppError::internal(
                "Conflicting snapshot disappeared",
                serde_json::json!({ "domain": domain }),
            )
        })
    }

    async fn history(&self, domain: &str, limit: i64) -> Result<Vec<Snapshot>, AppError> {
        let query = format!(
            r#"
            SELECT {SNAPSHOT_COLUMNS}
            FROM traffic_snapshots
            WHERE domain = $1
            ORDER BY fetched_at DESC
            LIMIT $2
            "#
        );

        let rows = sqlx::query_as::<_, SnapshotRow>(&query)
            .bind(domain)
            .bind(limit)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Snapshot::from).collect())
    }

    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM traffic_snapshots WHERE created_at < $1")
            .bind(cutoff)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM traffic_snapshots")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
