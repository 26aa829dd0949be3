//! Provider-reported traffic metrics carried by a snapshot.
//!
//! Field names follow the provider's PascalCase wire names (including its
//! `Engagments` spelling) so stored and served snapshots look like the data
//! the provider returned. Numeric fields accept numbers or numeric strings, and
//! a malformed field deserializes as absent rather than failing the whole
//! record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, DisplayFromStr, PickFirst, serde_as};
use std::collections::BTreeMap;

/// Share of traffic coming from one country.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CountryShare {
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub country: Option<i64>,
    pub country_code: Option<String>,
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub value: Option<f64>,
}

/// Monthly engagement figures.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Engagements {
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub bounce_rate: Option<f64>,
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub month: Option<i64>,
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub year: Option<i64>,
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub page_per_visit: Option<f64>,
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub visits: Option<f64>,
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub time_on_site: Option<f64>,
}

/// Rank of the site within one country.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CountryRank {
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub country: Option<i64>,
    pub country_code: Option<String>,
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub rank: Option<i64>,
}

/// A rank the provider reports either as a number or as free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RankValue {
    Number(i64),
    Text(String),
}

/// Rank of the site within its category.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CategoryRank {
    #[serde_as(as = "DefaultOnError")]
    pub rank: Option<RankValue>,
    pub category: Option<String>,
}

/// Traffic split by acquisition channel.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficSources {
    #[serde(rename = "Social")]
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub social: Option<f64>,
    #[serde(rename = "Paid Referrals")]
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub paid_referrals: Option<f64>,
    #[serde(rename = "Mail")]
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub mail: Option<f64>,
    #[serde(rename = "Referrals")]
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub referrals: Option<f64>,
    #[serde(rename = "Search")]
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub search: Option<f64>,
    #[serde(rename = "Direct")]
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub direct: Option<f64>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Competitors {
    #[serde_as(as = "DefaultOnError")]
    pub top_similarity_competitors: Vec<String>,
}

/// An organic keyword driving traffic to the site.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Keyword {
    pub name: Option<String>,
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub estimated_value: Option<f64>,
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub volume: Option<f64>,
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub cpc: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Country {
    pub code: Option<String>,
    pub url_code: Option<String>,
    pub name: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Notification {
    #[serde_as(as = "DefaultOnError")]
    pub content: Option<String>,
}

/// The full metric set stored with each snapshot.
///
/// Scalars are `None` when the provider omitted them. Collections and
/// structured groups are always present, empty when the provider sent nothing,
/// so every stored snapshot has the same shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrafficMetrics {
    pub site_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub large_screenshot: Option<String>,
    pub is_small: Option<bool>,
    pub is_data_from_ga: Option<bool>,
    pub policy: Option<i64>,
    pub snapshot_date: Option<DateTime<Utc>>,
    pub cached: Option<i64>,

    pub top_country_shares: Vec<CountryShare>,
    #[serde(rename = "Engagments")]
    pub engagements: Engagements,
    pub estimated_monthly_visits: BTreeMap<String, i64>,
    pub global_rank: Option<i64>,
    pub country_rank: Option<CountryRank>,
    pub category_rank: Option<CategoryRank>,
    pub global_category_rank: Option<CategoryRank>,
    pub traffic_sources: TrafficSources,
    pub competitors: Competitors,
    pub top_keywords: Vec<Keyword>,
    pub countries: Vec<Country>,
    pub notification: Notification,
}
