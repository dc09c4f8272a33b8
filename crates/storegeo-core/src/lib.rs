pub mod app_config;
pub mod config;
pub mod geo;
pub mod resolution;
pub mod stores;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::Coordinate;
pub use resolution::{
    AddressCorrection, GeocodeResult, GeocodingConfidence, GeocodingSource, ResolutionOutcome,
    ResolutionTier,
};
pub use stores::{NewStore, OpeningHours, StoreRecord};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown geocoding source: {0}")]
    UnknownSource(String),

    #[error("unknown geocoding confidence: {0}")]
    UnknownConfidence(String),
}
