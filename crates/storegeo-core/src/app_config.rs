use crate::geo::Coordinate;

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub market_index_url: String,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
    pub overpass_url: String,
    pub overpass_timeout_secs: u64,
    pub overpass_min_interval_ms: u64,
    pub overpass_daily_limit: u32,
    pub nominatim_url: String,
    pub nominatim_timeout_secs: u64,
    pub geocoder_user_agent: String,
    pub poi_radius_m: u32,
    pub poi_validation_threshold_m: f64,
    /// Search center used when a store has no usable scraped coordinate.
    pub fallback_center: Coordinate,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("market_index_url", &self.market_index_url)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_secs",
                &self.scraper_retry_backoff_base_secs,
            )
            .field("overpass_url", &self.overpass_url)
            .field("overpass_timeout_secs", &self.overpass_timeout_secs)
            .field("overpass_min_interval_ms", &self.overpass_min_interval_ms)
            .field("overpass_daily_limit", &self.overpass_daily_limit)
            .field("nominatim_url", &self.nominatim_url)
            .field("nominatim_timeout_secs", &self.nominatim_timeout_secs)
            .field("geocoder_user_agent", &self.geocoder_user_agent)
            .field("poi_radius_m", &self.poi_radius_m)
            .field(
                "poi_validation_threshold_m",
                &self.poi_validation_threshold_m,
            )
            .field("fallback_center", &self.fallback_center)
            .finish()
    }
}
