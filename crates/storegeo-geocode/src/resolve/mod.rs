//! Tiered coordinate resolution.
//!
//! For each store the engine tries, in order, a named point-of-interest
//! match, the coordinate supplied by the vendor feed, and an address-level
//! geocode. The first tier that yields a coordinate decides the outcome.

mod batch;
mod tiers;

use storegeo_core::{AppConfig, Coordinate, ResolutionOutcome, StoreRecord};

use crate::lookup::LookupError;
use crate::nominatim::NominatimClient;
use crate::overpass::{OverpassClient, OverpassSettings};

pub use batch::{BatchStats, ResolveError, StoreGeocodeResult};
pub use tiers::country_name;

use tiers::Strategy;

/// Geographic center of Germany, searched when a store has no coordinate.
const DEFAULT_FALLBACK_CENTER: Coordinate = Coordinate::new(51.1657, 10.4515);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverSettings {
    pub poi_radius_m: u32,
    /// POI matches closer than this to the scraped coordinate agree with it.
    pub validation_threshold_m: f64,
    pub fallback_center: Coordinate,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            poi_radius_m: 100,
            validation_threshold_m: 100.0,
            fallback_center: DEFAULT_FALLBACK_CENTER,
        }
    }
}

impl ResolverSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            poi_radius_m: config.poi_radius_m,
            validation_threshold_m: config.poi_validation_threshold_m,
            fallback_center: config.fallback_center,
        }
    }
}

/// The resolution engine. Owns both lookup clients and their rate limits.
#[derive(Debug)]
pub struct Resolver {
    overpass: OverpassClient,
    nominatim: NominatimClient,
    settings: ResolverSettings,
}

impl Resolver {
    #[must_use]
    pub fn new(
        overpass: OverpassClient,
        nominatim: NominatimClient,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            overpass,
            nominatim,
            settings,
        }
    }

    /// # Errors
    ///
    /// Returns [`LookupError::Http`] if either HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, LookupError> {
        Ok(Self::new(
            OverpassClient::new(OverpassSettings::from_app_config(config))?,
            NominatimClient::from_app_config(config)?,
            ResolverSettings::from_app_config(config),
        ))
    }

    #[must_use]
    pub fn overpass(&self) -> &OverpassClient {
        &self.overpass
    }

    /// Decides a coordinate for `store`, or `None` when every tier came up
    /// empty. Nothing is persisted.
    pub async fn resolve_store(&self, store: &StoreRecord) -> Option<ResolutionOutcome> {
        for strategy in Strategy::ORDER {
            if let Some(outcome) = self.attempt(strategy, store).await {
                tracing::debug!(
                    market_id = store.market_id,
                    tier = outcome.tier.number(),
                    source = %outcome.source,
                    confidence = %outcome.confidence,
                    "store resolved"
                );
                return Some(outcome);
            }
        }
        None
    }
}
