//! Database operations for the `stores` and `opening_hours` tables.

mod read;
mod types;
mod write;

pub use read::{get_store, list_opening_hours, list_stores_needing_geocoding, store_stats};
pub use types::{OpeningHoursRow, StoreRow, StoreStats};
pub use write::{apply_resolution, mark_store_checked, replace_opening_hours, upsert_store};

/// Column list shared by every `SELECT` that decodes into [`StoreRow`].
const STORE_COLUMNS: &str = "market_id, name, street, zip, city, latitude, longitude, \
     phone, email, country_code, status, opening_day, is_loyalty_market, google_maps_link, \
     osm_latitude, osm_longitude, osm_display_name, osm_checked, osm_checked_at, \
     final_latitude, final_longitude, geocoding_source, geocoding_confidence, \
     created_at, updated_at";
