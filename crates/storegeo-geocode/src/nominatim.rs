//! Address geocoding against a Nominatim search endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use storegeo_core::{AppConfig, Coordinate, GeocodeResult};

use crate::lookup::{Lookup, LookupError};
use crate::throttle::Throttle;

/// Nominatim's usage policy allows one request per second.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// Joins the present, non-blank address parts as
/// `street, postal code, city, country`.
#[must_use]
pub fn build_query(
    street: Option<&str>,
    city: Option<&str>,
    postal_code: Option<&str>,
    country: Option<&str>,
) -> String {
    [street, postal_code, city, country]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug)]
pub struct NominatimClient {
    client: Client,
    url: String,
    throttle: Throttle,
}

impl NominatimClient {
    /// # Errors
    ///
    /// Returns [`LookupError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(LookupError::Http)?;
        Ok(Self {
            client,
            url: url.to_owned(),
            throttle: Throttle::new(MIN_REQUEST_INTERVAL),
        })
    }

    /// # Errors
    ///
    /// See [`NominatimClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, LookupError> {
        Self::new(
            &config.nominatim_url,
            config.nominatim_timeout_secs,
            &config.geocoder_user_agent,
        )
    }

    /// Geocodes a postal address to its best single match.
    ///
    /// Blocks until at least [`MIN_REQUEST_INTERVAL`] has passed since the
    /// previous request. An address with no usable parts is
    /// [`Lookup::NotFound`] without contacting the service.
    pub async fn geocode(
        &self,
        street: Option<&str>,
        city: Option<&str>,
        postal_code: Option<&str>,
        country: Option<&str>,
    ) -> Lookup<GeocodeResult> {
        let query = build_query(street, city, postal_code, country);
        if query.is_empty() {
            tracing::debug!("no address parts to geocode");
            return Lookup::NotFound;
        }

        self.throttle.wait().await;
        tracing::debug!(query = %query, "sending nominatim query");

        match self.send(&query).await {
            Ok(Some(result)) => Lookup::Found(result),
            Ok(None) => {
                tracing::info!(query = %query, "nominatim returned no results");
                Lookup::NotFound
            }
            Err(err) => {
                tracing::warn!(query = %query, error = %err, "nominatim geocoding failed");
                Lookup::Failed(err)
            }
        }
    }

    async fn send(&self, query: &str) -> Result<Option<GeocodeResult>, LookupError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "0"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::from_status(status));
        }

        let body = response.text().await?;
        let hits: Vec<SearchHit> = serde_json::from_str(&body)
            .map_err(|e| LookupError::malformed("nominatim response", e))?;
        let Some(hit) = hits.into_iter().next() else {
            return Ok(None);
        };

        let latitude: f64 = hit
            .lat
            .trim()
            .parse()
            .map_err(|e| LookupError::malformed("nominatim latitude", e))?;
        let longitude: f64 = hit
            .lon
            .trim()
            .parse()
            .map_err(|e| LookupError::malformed("nominatim longitude", e))?;

        Ok(Some(GeocodeResult {
            coordinate: Coordinate::new(latitude, longitude),
            display_name: hit.display_name,
        }))
    }
}
