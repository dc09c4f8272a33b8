use storegeo_core::{
    AddressCorrection, Coordinate, GeocodingConfidence, GeocodingSource, ResolutionOutcome,
    ResolutionTier, StoreRecord,
};

use super::Resolver;
use crate::lookup::Lookup;
use crate::overpass::{validate_against_known_point, PoiAddress, PoiCandidate, PoiValidation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Strategy {
    PoiSearch,
    ScrapedCoordinate,
    AddressGeocode,
}

impl Strategy {
    pub(super) const ORDER: [Strategy; 3] = [
        Strategy::PoiSearch,
        Strategy::ScrapedCoordinate,
        Strategy::AddressGeocode,
    ];
}

/// English country name for an ISO 3166-1 alpha-2 code.
///
/// Codes outside the table are passed through unchanged.
#[must_use]
pub fn country_name(code: &str) -> String {
    let name = match code.trim().to_ascii_uppercase().as_str() {
        "DE" => "Germany",
        "AT" => "Austria",
        "CH" => "Switzerland",
        "FR" => "France",
        "IT" => "Italy",
        "ES" => "Spain",
        "NL" => "Netherlands",
        "BE" => "Belgium",
        "PL" => "Poland",
        "CZ" => "Czech Republic",
        _ => return code.to_owned(),
    };
    name.to_owned()
}

fn address_correction(address: &PoiAddress) -> AddressCorrection {
    AddressCorrection {
        street: address.street_line(),
        postal_code: address.postcode.clone(),
        city: address.city.clone(),
    }
}

/// Tier 1 outcome for a matched POI, plus the validation against the scraped
/// coordinate when there was one.
fn poi_outcome(
    candidate: PoiCandidate,
    scraped: Option<Coordinate>,
    threshold_m: f64,
) -> (ResolutionOutcome, Option<PoiValidation>) {
    let validation =
        scraped.map(|known| validate_against_known_point(candidate.coordinate, known, threshold_m));

    let (confidence, address_correction) = match validation {
        Some(v) if v.agrees => (GeocodingConfidence::VeryHigh, None),
        Some(_) => (
            GeocodingConfidence::High,
            Some(address_correction(&candidate.address)),
        ),
        None => (GeocodingConfidence::High, None),
    };

    let outcome = ResolutionOutcome {
        coordinate: candidate.coordinate,
        source: GeocodingSource::OverpassPoi,
        confidence,
        tier: ResolutionTier::Poi,
        address_correction,
        matched_variant: candidate.matched_variant,
        address_geocode: None,
    };
    (outcome, validation)
}

fn scraped_outcome(store: &StoreRecord) -> Option<ResolutionOutcome> {
    store.scraped.map(|coordinate| ResolutionOutcome {
        coordinate,
        source: GeocodingSource::Scraper,
        confidence: GeocodingConfidence::Medium,
        tier: ResolutionTier::Scraper,
        address_correction: None,
        matched_variant: None,
        address_geocode: None,
    })
}

fn format_address(street: Option<&str>, zip: Option<&str>, city: Option<&str>) -> String {
    let locality = [zip, city].into_iter().flatten().collect::<Vec<_>>().join(" ");
    [street.unwrap_or_default(), locality.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Resolver {
    pub(super) async fn attempt(
        &self,
        strategy: Strategy,
        store: &StoreRecord,
    ) -> Option<ResolutionOutcome> {
        match strategy {
            Strategy::PoiSearch => self.poi_tier(store).await,
            Strategy::ScrapedCoordinate => scraped_outcome(store),
            Strategy::AddressGeocode => self.address_tier(store).await,
        }
    }

    async fn poi_tier(&self, store: &StoreRecord) -> Option<ResolutionOutcome> {
        let center = store.scraped.unwrap_or(self.settings.fallback_center);
        let candidate = self
            .overpass
            .search_with_variants(&store.name, center, self.settings.poi_radius_m)
            .await
            .found()?;

        let (outcome, validation) =
            poi_outcome(candidate, store.scraped, self.settings.validation_threshold_m);

        if let (Some(validation), Some(correction)) = (validation, &outcome.address_correction) {
            tracing::warn!(
                market_id = store.market_id,
                distance_m = validation.distance_m,
                old_address = %format_address(
                    store.street.as_deref(),
                    store.zip.as_deref(),
                    store.city.as_deref(),
                ),
                new_address = %format_address(
                    correction.street.as_deref(),
                    correction.postal_code.as_deref(),
                    correction.city.as_deref(),
                ),
                "address mismatch: point of interest is far from the scraped coordinate"
            );
        }
        Some(outcome)
    }

    async fn address_tier(&self, store: &StoreRecord) -> Option<ResolutionOutcome> {
        let country = store.country_code.as_deref().map(country_name);
        let lookup = self
            .nominatim
            .geocode(
                store.street.as_deref(),
                store.city.as_deref(),
                store.zip.as_deref(),
                country.as_deref(),
            )
            .await;

        let Lookup::Found(result) = lookup else {
            return None;
        };
        Some(ResolutionOutcome {
            coordinate: result.coordinate,
            source: GeocodingSource::NominatimAddress,
            confidence: GeocodingConfidence::Low,
            tier: ResolutionTier::Address,
            address_correction: None,
            matched_variant: None,
            address_geocode: Some(result),
        })
    }
}

#[cfg(test)]
#[path = "tiers_test.rs"]
mod tests;
