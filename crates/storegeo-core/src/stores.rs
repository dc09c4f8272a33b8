//! Store records and the rule for merging a resolution outcome into one.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::resolution::{GeocodingConfidence, GeocodingSource, ResolutionOutcome};

/// One opening-hours entry from the vendor feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub weekday: String,
    pub open_from: Option<String>,
    pub open_until: Option<String>,
}

/// A freshly scraped store, ready to be upserted.
///
/// Carries no enrichment state; upserting never touches the geocoding
/// columns of an existing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStore {
    pub market_id: i64,
    pub name: String,
    pub street: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub country_code: Option<String>,
    pub status: Option<String>,
    pub opening_day: Option<NaiveDate>,
    pub is_loyalty_market: Option<bool>,
    pub google_maps_link: Option<String>,
    pub opening_hours: Vec<OpeningHours>,
}

/// A persisted retail location together with its enrichment state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub market_id: i64,
    pub name: String,
    pub street: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub opening_day: Option<NaiveDate>,
    pub is_loyalty_market: Option<bool>,
    pub google_maps_link: Option<String>,
    /// Feed coordinate, already cleaned of the `(0,0)` sentinel.
    pub scraped: Option<Coordinate>,
    pub osm_coordinate: Option<Coordinate>,
    pub osm_display_name: Option<String>,
    pub osm_checked: bool,
    pub osm_checked_at: Option<DateTime<Utc>>,
    pub final_coordinate: Option<Coordinate>,
    pub geocoding_source: Option<GeocodingSource>,
    pub geocoding_confidence: Option<GeocodingConfidence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoreRecord {
    /// A minimal unchecked record, mostly useful for tests and fixtures.
    #[must_use]
    pub fn new(market_id: i64, name: &str, now: DateTime<Utc>) -> Self {
        Self {
            market_id,
            name: name.to_string(),
            street: None,
            zip: None,
            city: None,
            country_code: None,
            phone: None,
            email: None,
            status: None,
            opening_day: None,
            is_loyalty_market: None,
            google_maps_link: None,
            scraped: None,
            osm_coordinate: None,
            osm_display_name: None,
            osm_checked: false,
            osm_checked_at: None,
            final_coordinate: None,
            geocoding_source: None,
            geocoding_confidence: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a resolution outcome into this record.
    ///
    /// Final coordinate, source and confidence are always written together.
    /// Address fields change only when the outcome carries a correction, and
    /// then only for the components the correction actually provides.
    pub fn apply_resolution(&mut self, outcome: &ResolutionOutcome, checked_at: DateTime<Utc>) {
        self.final_coordinate = Some(outcome.coordinate);
        self.geocoding_source = Some(outcome.source);
        self.geocoding_confidence = Some(outcome.confidence);

        if let Some(correction) = &outcome.address_correction {
            if let Some(street) = &correction.street {
                self.street = Some(street.clone());
            }
            if let Some(postal_code) = &correction.postal_code {
                self.zip = Some(postal_code.clone());
            }
            if let Some(city) = &correction.city {
                self.city = Some(city.clone());
            }
        }

        if let Some(geocode) = &outcome.address_geocode {
            self.osm_coordinate = Some(geocode.coordinate);
            self.osm_display_name = Some(geocode.display_name.clone());
        }

        self.mark_checked(checked_at);
    }

    /// Record that a geocoding pass looked at this store.
    pub fn mark_checked(&mut self, checked_at: DateTime<Utc>) {
        self.osm_checked = true;
        self.osm_checked_at = Some(checked_at);
    }
}
