//! Raw metrics payload returned by the upstream provider and its mapping onto
//! [`TrafficMetrics`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_with::{DefaultOnError, DisplayFromStr, PickFirst, serde_as};
use std::collections::BTreeMap;

use super::traffic_metrics::{
    CategoryRank, Competitors, Country, CountryRank, CountryShare, Engagements, Keyword,
    Notification, TrafficMetrics, TrafficSources,
};

/// `GlobalRank` arrives wrapped: `{ "Rank": 123 }`.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GlobalRank {
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub rank: Option<i64>,
}

/// Provider payload as received.
///
/// Every field is optional. Unknown fields are ignored; fields with an
/// unexpected type deserialize as `None`.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TrafficPayload {
    #[serde_as(as = "DefaultOnError")]
    pub site_name: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub title: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub description: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub category: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub large_screenshot: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub is_small: Option<bool>,
    #[serde_as(as = "DefaultOnError")]
    pub is_data_from_ga: Option<bool>,
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub policy: Option<i64>,
    #[serde_as(as = "DefaultOnError")]
    pub snapshot_date: Option<String>,
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub cached: Option<i64>,

    #[serde_as(as = "DefaultOnError")]
    pub top_country_shares: Option<Vec<CountryShare>>,
    #[serde(rename = "Engagments")]
    #[serde_as(as = "DefaultOnError")]
    pub engagements: Option<Engagements>,
    #[serde_as(as = "DefaultOnError<Option<BTreeMap<_, PickFirst<(_, DisplayFromStr)>>>>")]
    pub estimated_monthly_visits: Option<BTreeMap<String, i64>>,
    #[serde_as(as = "DefaultOnError")]
    pub global_rank: Option<GlobalRank>,
    #[serde_as(as = "DefaultOnError")]
    pub country_rank: Option<CountryRank>,
    #[serde_as(as = "DefaultOnError")]
    pub category_rank: Option<CategoryRank>,
    #[serde_as(as = "DefaultOnError")]
    pub global_category_rank: Option<CategoryRank>,
    #[serde_as(as = "DefaultOnError")]
    pub traffic_sources: Option<TrafficSources>,
    #[serde_as(as = "DefaultOnError")]
    pub competitors: Option<Competitors>,
    #[serde_as(as = "DefaultOnError")]
    pub top_keywords: Option<Vec<Keyword>>,
    #[serde_as(as = "DefaultOnError")]
    pub countries: Option<Vec<Country>>,
    #[serde_as(as = "DefaultOnError")]
    pub notification: Option<Notification>,
}

impl TrafficPayload {
    /// Maps the payload onto the stored metric shape.
    ///
    /// Scalars pass through as-is. Collections and groups the provider omitted
    /// become empty, and `GlobalRank.Rank` is flattened to a plain number.
    pub fn into_metrics(self) -> TrafficMetrics {
        TrafficMetrics {
            site_name: self.site_name,
            title: self.title,
            description: self.description,
            category: self.category,
            large_screenshot: self.large_screenshot,
            is_small: self.is_small,
            is_data_from_ga: self.is_data_from_ga,
            policy: self.policy,
            snapshot_date: self.snapshot_date.as_deref().and_then(parse_snapshot_date),
            cached: self.cached,

            top_country_shares: self.top_country_shares.unwrap_or_default(),
            engagements: self.engagements.unwrap_or_default(),
            estimated_monthly_visits: self.estimated_monthly_visits.unwrap_or_default(),
            global_rank: self.global_rank.and_then(|g| g.rank),
            country_rank: self.country_rank,
            category_rank: self.category_rank,
            global_category_rank: self.global_category_rank,
            traffic_sources: self.traffic_sources.unwrap_or_default(),
            competitors: self.competitors.unwrap_or_default(),
            top_keywords: self.top_keywords.unwrap_or_default(),
            countries: self.countries.unwrap_or_default(),
            notification: self.notification.unwrap_or_default(),
        }
    }
}

/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS` (taken as UTC), or a bare date.
fn parse_snapshot_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
