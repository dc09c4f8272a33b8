use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

/// HTTP client for the vendor's market index (`page-data.json`).
///
/// Transient failures (429, 5xx, network errors) are retried with
/// exponential backoff up to `max_retries` additional attempts.
pub struct MarketIndexClient {
    client: Client,
    url: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl MarketIndexClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            url: url.to_owned(),
            max_retries,
            backoff_base_secs,
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the raw market index document.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`] on 429 after all retries.
    /// - [`ScraperError::NotFound`] on 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`] on any other non-2xx status;
    ///   5xx is retried, 4xx is not.
    /// - [`ScraperError::Http`] on network failure after all retries.
    /// - [`ScraperError::Deserialize`] when the body is not JSON.
    pub async fn fetch_index(&self) -> Result<serde_json::Value, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async {
            let response = self.client.get(&self.url).send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(ScraperError::RateLimited { retry_after_secs });
            }

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ScraperError::NotFound {
                    url: self.url.clone(),
                });
            }

            if !status.is_success() {
                return Err(ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: self.url.clone(),
                });
            }

            let body = response.text().await?;
            serde_json::from_str::<serde_json::Value>(&body).map_err(|e| {
                ScraperError::Deserialize {
                    context: format!("market index from {}", self.url),
                    source: e,
                }
            })
        })
        .await
    }
}
