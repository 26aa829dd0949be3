//! RapidAPI-hosted traffic metrics client.
//!
//! ### Endpoint
//!
//! - **Request**: `GET https://{RAPIDAPI_HOST}/traffic?domain={domain}`
//! - **Authentication**: `x-rapidapi-key` and `x-rapidapi-host` headers.
//! - **Policy**: one request per lookup, no retries, transport default timeout.
//!
//! Without both credentials the client is inert: every fetch fails with
//! [`FetchError::NotConfigured`] and no request is sent.

use async_trait::async_trait;
use reqwest::header;

use crate::domain::entities::{CanonicalDomain, TrafficPayload};
use crate::domain::providers::{FetchError, TrafficProvider};

const TRAFFIC_PATH: &str = "/traffic";
const DEFAULT_USER_AGENT: &str = concat!("traffic-lookup/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "x-rapidapi-key";
const API_HOST_HEADER: &str = "x-rapidapi-host";

/// Longest error body kept in a [`FetchError::ErrorEnvelope`].
const MAX_ERROR_BODY: usize = 2048;

/// Provider credentials and endpoint override.
#[derive(Debug, Clone, Default)]
pub struct RapidApiConfig {
    pub api_key: Option<String>,
    pub api_host: Option<String>,
    /// Overrides `https://{api_host}` (staging, proxies, tests).
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
struct Credentials {
    api_key: String,
    api_host: String,
    base_url: String,
}

impl RapidApiConfig {
    fn credentials(&self) -> Option<Credentials> {
        let api_key = self.api_key.as_deref().filter(|k| !k.is_empty())?;
        let api_host = self.api_host.as_deref().filter(|h| !h.is_empty())?;

        let base_url = self
            .base_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://{api_host}"));

        Some(Credentials {
            api_key: api_key.to_string(),
            api_host: api_host.to_string(),
            base_url,
        })
    }
}

/// Traffic provider backed by the RapidAPI traffic endpoint.
#[derive(Debug, Clone)]
pub struct RapidApiProvider {
    http: reqwest::Client,
    credentials: Option<Credentials>,
}

impl RapidApiProvider {
    /// Creates a provider. Missing credentials are not an error; the provider
    /// is simply inert.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(config: RapidApiConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;

        let credentials = config.credentials();
        if credentials.is_none() {
            tracing::warn!("RAPIDAPI_KEY or RAPIDAPI_HOST not set; upstream fetches are disabled");
        }

        Ok(Self { http, credentials })
    }

    /// Full request URL for the traffic endpoint, if configured.
    pub fn endpoint(&self) -> Option<String> {
        self.credentials
            .as_ref()
            .map(|c| format!("{}{}", c.base_url, TRAFFIC_PATH))
    }
}

#[async_trait]
impl TrafficProvider for RapidApiProvider {
    async fn fetch_metrics(&self, domain: &CanonicalDomain) -> Result<TrafficPayload, FetchError> {
        let Some(credentials) = &self.credentials else {
            return Err(FetchError::NotConfigured);
        };

        let url = format!("{}{}", credentials.base_url, TRAFFIC_PATH);
        tracing::debug!(%domain, %url, "Requesting traffic metrics");

        let response = self
            .http
            .get(&url)
            .query(&[("domain", domain.as_str())])
            .header(API_KEY_HEADER, &credentials.api_key)
            .header(API_HOST_HEADER, &credentials.api_host)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%domain, "Upstream request failed: {}", e);
                FetchError::Network(e.to_string())
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            tracing::warn!(%domain, "Upstream body read failed: {}", e);
            FetchError::Network(e.to_string())
        })?;

        if !status.is_success() {
            let body = truncate(String::from_utf8_lossy(&body).into_owned());
            tracing::warn!(%domain, status = status.as_u16(), %body, "Upstream returned an error");
            return Err(FetchError::ErrorEnvelope {
                status: status.as_u16(),
                body,
            });
        }

        let payload: TrafficPayload = decode_payload(&body)?;
        tracing::debug!(%domain, ?payload, "Upstream payload received");

        Ok(payload)
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

/// Decodes a 2xx body. Anything but a JSON object is rejected.
fn decode_payload(body: &[u8]) -> Result<TrafficPayload, FetchError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    if !value.is_object() {
        return Err(FetchError::Decode(
            "expected a JSON object with traffic metrics".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| FetchError::Decode(e.to_string()))
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}
