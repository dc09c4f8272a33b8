//! Outcome type shared by the external lookup clients.
//!
//! Lookups against Overpass and Nominatim never return `Err`: a service
//! failure is reported as [`Lookup::Failed`] so callers can fall through to
//! the next resolution tier while still seeing why the lookup did not match.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("rate limited by upstream (HTTP 429)")]
    RateLimited,

    #[error("upstream gateway timeout (HTTP 504)")]
    GatewayTimeout,

    #[error("unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    #[error("malformed response ({context}): {source}")]
    Malformed {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("daily query limit of {limit} reached")]
    QuotaExhausted { limit: u32 },

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LookupError::Timeout
        } else if err.is_connect() {
            LookupError::Connect(err.to_string())
        } else if err.is_decode() {
            LookupError::Malformed {
                context: "response body",
                source: Box::new(err),
            }
        } else {
            LookupError::Http(err)
        }
    }
}

impl LookupError {
    /// Maps a non-success HTTP status to the matching variant.
    #[must_use]
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status {
            reqwest::StatusCode::TOO_MANY_REQUESTS => LookupError::RateLimited,
            reqwest::StatusCode::GATEWAY_TIMEOUT => LookupError::GatewayTimeout,
            other => LookupError::UnexpectedStatus {
                status: other.as_u16(),
            },
        }
    }

    pub(crate) fn malformed(
        context: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LookupError::Malformed {
            context,
            source: Box::new(source),
        }
    }
}

/// Result of a single external lookup.
#[derive(Debug)]
pub enum Lookup<T> {
    /// The service answered with a usable match.
    Found(T),
    /// The service answered but had nothing matching.
    NotFound,
    /// The lookup could not be completed.
    Failed(LookupError),
}

impl<T> Lookup<T> {
    #[must_use]
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::Failed(_) => None,
        }
    }
}
