//! Result types produced by the coordinate resolution engine.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::CoreError;

/// Which data source produced a store's final coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodingSource {
    OverpassPoi,
    Scraper,
    NominatimAddress,
}

impl GeocodingSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GeocodingSource::OverpassPoi => "overpass_poi",
            GeocodingSource::Scraper => "scraper",
            GeocodingSource::NominatimAddress => "nominatim_address",
        }
    }
}

impl std::fmt::Display for GeocodingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GeocodingSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overpass_poi" => Ok(GeocodingSource::OverpassPoi),
            "scraper" => Ok(GeocodingSource::Scraper),
            "nominatim_address" => Ok(GeocodingSource::NominatimAddress),
            other => Err(CoreError::UnknownSource(other.to_string())),
        }
    }
}

/// Coarse trust label attached to a resolved coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodingConfidence {
    VeryHigh,
    High,
    Medium,
    Low,
}

impl GeocodingConfidence {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GeocodingConfidence::VeryHigh => "very_high",
            GeocodingConfidence::High => "high",
            GeocodingConfidence::Medium => "medium",
            GeocodingConfidence::Low => "low",
        }
    }
}

impl std::fmt::Display for GeocodingConfidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GeocodingConfidence {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "very_high" => Ok(GeocodingConfidence::VeryHigh),
            "high" => Ok(GeocodingConfidence::High),
            "medium" => Ok(GeocodingConfidence::Medium),
            "low" => Ok(GeocodingConfidence::Low),
            other => Err(CoreError::UnknownConfidence(other.to_string())),
        }
    }
}

/// The strategy that produced an outcome, in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionTier {
    /// Named point-of-interest match.
    Poi,
    /// Coordinate supplied by the vendor feed.
    Scraper,
    /// Address-level geocode.
    Address,
}

impl ResolutionTier {
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            ResolutionTier::Poi => 1,
            ResolutionTier::Scraper => 2,
            ResolutionTier::Address => 3,
        }
    }
}

/// One row returned by the address geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub coordinate: Coordinate,
    pub display_name: String,
}

/// Replacement address values proposed from point-of-interest tags.
///
/// Each field is `None` when the tags did not carry that component; a `None`
/// never clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressCorrection {
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
}

impl AddressCorrection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.street.is_none() && self.postal_code.is_none() && self.city.is_none()
    }
}

/// The decision reached for a single store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    pub coordinate: Coordinate,
    pub source: GeocodingSource,
    pub confidence: GeocodingConfidence,
    pub tier: ResolutionTier,
    /// `Some` when the store's address fields should be overwritten.
    pub address_correction: Option<AddressCorrection>,
    /// Name variant that matched, for point-of-interest outcomes.
    pub matched_variant: Option<String>,
    /// Raw address geocode, cached in the `osm_*` columns for Tier 3 outcomes.
    pub address_geocode: Option<GeocodeResult>,
}

impl ResolutionOutcome {
    #[must_use]
    pub fn updates_address(&self) -> bool {
        self.address_correction
            .as_ref()
            .is_some_and(|correction| !correction.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_round_trips_through_str() {
        for source in [
            GeocodingSource::OverpassPoi,
            GeocodingSource::Scraper,
            GeocodingSource::NominatimAddress,
        ] {
            assert_eq!(source.as_str().parse::<GeocodingSource>().unwrap(), source);
        }
    }

    #[test]
    fn confidence_labels_match_storage_values() {
        assert_eq!(GeocodingConfidence::VeryHigh.to_string(), "very_high");
        assert_eq!(GeocodingConfidence::High.to_string(), "high");
        assert_eq!(GeocodingConfidence::Medium.to_string(), "medium");
        assert_eq!(GeocodingConfidence::Low.to_string(), "low");
    }

    #[test]
    fn unknown_labels_are_rejected() {
        assert!("gps".parse::<GeocodingSource>().is_err());
        assert!("certain".parse::<GeocodingConfidence>().is_err());
    }

    #[test]
    fn confidence_serializes_snake_case() {
        let json = serde_json::to_string(&GeocodingConfidence::VeryHigh).unwrap();
        assert_eq!(json, "\"very_high\"");
    }

    #[test]
    fn tiers_are_numbered_in_attempt_order() {
        assert_eq!(ResolutionTier::Poi.number(), 1);
        assert_eq!(ResolutionTier::Scraper.number(), 2);
        assert_eq!(ResolutionTier::Address.number(), 3);
    }

    fn poi_outcome(address_correction: Option<AddressCorrection>) -> ResolutionOutcome {
        ResolutionOutcome {
            coordinate: crate::Coordinate::new(49.57889, 11.00271),
            source: GeocodingSource::OverpassPoi,
            confidence: GeocodingConfidence::High,
            tier: ResolutionTier::Poi,
            address_correction,
            matched_variant: Some("Denns BioMarkt".to_string()),
            address_geocode: None,
        }
    }

    #[test]
    fn only_a_correction_with_values_updates_the_address() {
        assert!(!poi_outcome(None).updates_address());
        assert!(!poi_outcome(Some(AddressCorrection::default())).updates_address());
        assert!(poi_outcome(Some(AddressCorrection {
            city: Some("Erlangen".to_string()),
            ..AddressCorrection::default()
        }))
        .updates_address());
    }
}
