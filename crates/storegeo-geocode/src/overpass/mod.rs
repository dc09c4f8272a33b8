//! Point-of-interest search against an Overpass API endpoint.

mod query;
mod response;
mod variants;

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use reqwest::Client;

use storegeo_core::{AppConfig, Coordinate};

use crate::lookup::{Lookup, LookupError};
use crate::throttle::Throttle;

pub use response::{PoiAddress, PoiCandidate};
pub use variants::{extract_base_name, validate_against_known_point, PoiValidation};

use query::{build_query, exact_filter, fuzzy_filter};
use response::{closest_candidate, OverpassResponse};

/// Connection and fair-use settings for [`OverpassClient`].
#[derive(Debug, Clone)]
pub struct OverpassSettings {
    pub url: String,
    pub timeout: Duration,
    pub user_agent: String,
    /// Minimum spacing between query send times.
    pub min_interval: Duration,
    /// Queries this client may issue over its lifetime.
    pub daily_limit: u32,
}

impl OverpassSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            url: config.overpass_url.clone(),
            timeout: Duration::from_secs(config.overpass_timeout_secs),
            user_agent: config.geocoder_user_agent.clone(),
            min_interval: Duration::from_millis(config.overpass_min_interval_ms),
            daily_limit: config.overpass_daily_limit,
        }
    }
}

/// Overpass client with per-instance throttling and a query ceiling.
///
/// Every search returns a [`Lookup`]; transport, status, and body errors are
/// logged and surfaced as [`Lookup::Failed`], never as `Err`.
#[derive(Debug)]
pub struct OverpassClient {
    client: Client,
    url: String,
    throttle: Throttle,
    queries_sent: AtomicU32,
    daily_limit: u32,
}

impl OverpassClient {
    /// # Errors
    ///
    /// Returns [`LookupError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(settings: OverpassSettings) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(LookupError::Http)?;
        Ok(Self {
            client,
            url: settings.url,
            throttle: Throttle::new(settings.min_interval),
            queries_sent: AtomicU32::new(0),
            daily_limit: settings.daily_limit,
        })
    }

    /// Number of queries issued so far.
    #[must_use]
    pub fn queries_sent(&self) -> u32 {
        self.queries_sent.load(Ordering::SeqCst)
    }

    /// Nodes named exactly `name` within `radius_m` of `center`; closest wins.
    pub async fn search_exact(
        &self,
        name: &str,
        center: Coordinate,
        radius_m: u32,
    ) -> Lookup<PoiCandidate> {
        self.run(&exact_filter(name), center, radius_m).await
    }

    /// Shop nodes whose name matches the regular expression `pattern`.
    pub async fn search_fuzzy(
        &self,
        pattern: &str,
        center: Coordinate,
        radius_m: u32,
    ) -> Lookup<PoiCandidate> {
        self.run(&fuzzy_filter(pattern), center, radius_m).await
    }

    async fn run(&self, filter: &str, center: Coordinate, radius_m: u32) -> Lookup<PoiCandidate> {
        let limit = self.daily_limit;
        if self
            .queries_sent
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < limit).then(|| n + 1)
            })
            .is_err()
        {
            tracing::warn!(limit, "overpass daily query limit reached, skipping query");
            return Lookup::Failed(LookupError::QuotaExhausted { limit });
        }

        self.throttle.wait().await;
        tracing::debug!(filter, radius_m, center = %center, "sending overpass query");

        match self.send(filter, center, radius_m).await {
            Ok(Some(candidate)) => {
                tracing::debug!(
                    osm_id = candidate.osm_id,
                    name = %candidate.name,
                    "overpass match"
                );
                Lookup::Found(candidate)
            }
            Ok(None) => Lookup::NotFound,
            Err(err) => {
                match &err {
                    LookupError::RateLimited => {
                        tracing::warn!(status = 429, filter, "overpass rate limited");
                    }
                    LookupError::GatewayTimeout => {
                        tracing::warn!(status = 504, filter, "overpass server overloaded");
                    }
                    LookupError::UnexpectedStatus { status } => {
                        tracing::warn!(status, filter, "overpass returned unexpected status");
                    }
                    other => tracing::warn!(error = %other, filter, "overpass query failed"),
                }
                Lookup::Failed(err)
            }
        }
    }

    async fn send(
        &self,
        filter: &str,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Option<PoiCandidate>, LookupError> {
        let query = build_query(filter, center, radius_m);
        let response = self
            .client
            .post(&self.url)
            .form(&[("data", query.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::from_status(status));
        }

        let body = response.text().await?;
        let parsed: OverpassResponse = serde_json::from_str(&body)
            .map_err(|e| LookupError::malformed("overpass response", e))?;
        Ok(closest_candidate(&parsed.elements, center))
    }
}
