//! Row types for the `stores` and `opening_hours` tables.

use chrono::{DateTime, NaiveDate, Utc};

use storegeo_core::{Coordinate, CoreError, OpeningHours, StoreRecord};

/// A row from the `stores` table, columns as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreRow {
    pub market_id: i64,
    pub name: String,
    pub street: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub country_code: Option<String>,
    pub status: Option<String>,
    pub opening_day: Option<NaiveDate>,
    pub is_loyalty_market: Option<bool>,
    pub google_maps_link: Option<String>,
    pub osm_latitude: Option<f64>,
    pub osm_longitude: Option<f64>,
    pub osm_display_name: Option<String>,
    pub osm_checked: bool,
    pub osm_checked_at: Option<DateTime<Utc>>,
    pub final_latitude: Option<f64>,
    pub final_longitude: Option<f64>,
    pub geocoding_source: Option<String>,
    pub geocoding_confidence: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn pair(latitude: Option<f64>, longitude: Option<f64>) -> Option<Coordinate> {
    Some(Coordinate::new(latitude?, longitude?))
}

impl TryFrom<StoreRow> for StoreRecord {
    type Error = CoreError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        Ok(StoreRecord {
            market_id: row.market_id,
            name: row.name,
            street: row.street,
            zip: row.zip,
            city: row.city,
            country_code: row.country_code,
            phone: row.phone,
            email: row.email,
            status: row.status,
            opening_day: row.opening_day,
            is_loyalty_market: row.is_loyalty_market,
            google_maps_link: row.google_maps_link,
            // Rows written before ingestion cleaning may still hold the sentinel.
            scraped: Coordinate::from_feed(row.latitude, row.longitude),
            osm_coordinate: pair(row.osm_latitude, row.osm_longitude),
            osm_display_name: row.osm_display_name,
            osm_checked: row.osm_checked,
            osm_checked_at: row.osm_checked_at,
            final_coordinate: pair(row.final_latitude, row.final_longitude),
            geocoding_source: row
                .geocoding_source
                .as_deref()
                .map(str::parse)
                .transpose()?,
            geocoding_confidence: row
                .geocoding_confidence
                .as_deref()
                .map(str::parse)
                .transpose()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row from the `opening_hours` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OpeningHoursRow {
    pub id: i64,
    pub market_id: i64,
    pub weekday: String,
    pub open_from: Option<String>,
    pub open_until: Option<String>,
}

impl From<OpeningHoursRow> for OpeningHours {
    fn from(row: OpeningHoursRow) -> Self {
        OpeningHours {
            weekday: row.weekday,
            open_from: row.open_from,
            open_until: row.open_until,
        }
    }
}

/// Aggregate enrichment counts over the whole `stores` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct StoreStats {
    pub total: i64,
    pub checked: i64,
    pub resolved: i64,
    pub with_scraped_coordinate: i64,
    pub source_overpass_poi: i64,
    pub source_scraper: i64,
    pub source_nominatim_address: i64,
    pub confidence_very_high: i64,
    pub confidence_high: i64,
    pub confidence_medium: i64,
    pub confidence_low: i64,
}

impl StoreStats {
    /// Stores that a geocoding pass looked at but could not place.
    #[must_use]
    pub fn unresolved(&self) -> i64 {
        self.checked - self.resolved
    }
}
