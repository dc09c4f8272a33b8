use crate::app_config::AppConfig;
use crate::geo::Coordinate;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Does not read `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_secs = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let value = parse_u64(var, default)?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let database_url = require("DATABASE_URL")?;
    let log_level = or_default("STOREGEO_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("STOREGEO_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("STOREGEO_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("STOREGEO_DB_ACQUIRE_TIMEOUT_SECS", "10")?;
    if db_min_connections > db_max_connections {
        return Err(invalid(
            "STOREGEO_DB_MIN_CONNECTIONS",
            format!("{db_min_connections} exceeds max connections {db_max_connections}"),
        ));
    }

    let market_index_url = or_default(
        "STOREGEO_MARKET_INDEX_URL",
        "https://www.biomarkt.de/page-data/marktindex/page-data.json",
    );
    let scraper_request_timeout_secs =
        parse_positive_secs("STOREGEO_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default(
        "STOREGEO_SCRAPER_USER_AGENT",
        "storegeo/0.1 (store-locations)",
    );
    let scraper_max_retries = parse_u32("STOREGEO_SCRAPER_MAX_RETRIES", "3")?;
    let scraper_retry_backoff_base_secs =
        parse_u64("STOREGEO_SCRAPER_RETRY_BACKOFF_BASE_SECS", "5")?;

    let overpass_url = or_default(
        "STOREGEO_OVERPASS_URL",
        "https://overpass-api.de/api/interpreter",
    );
    let overpass_timeout_secs = parse_positive_secs("STOREGEO_OVERPASS_TIMEOUT_SECS", "30")?;
    let overpass_min_interval_ms = parse_u64("STOREGEO_OVERPASS_MIN_INTERVAL_MS", "1500")?;
    let overpass_daily_limit = parse_u32("STOREGEO_OVERPASS_DAILY_LIMIT", "10000")?;

    let nominatim_url = or_default(
        "STOREGEO_NOMINATIM_URL",
        "https://nominatim.openstreetmap.org/search",
    );
    let nominatim_timeout_secs = parse_positive_secs("STOREGEO_NOMINATIM_TIMEOUT_SECS", "10")?;
    let geocoder_user_agent = or_default(
        "STOREGEO_GEOCODER_USER_AGENT",
        "storegeo/0.1 (store-geocoding)",
    );

    let poi_radius_m = parse_u32("STOREGEO_POI_RADIUS_M", "100")?;
    let poi_validation_threshold_m = or_default("STOREGEO_POI_VALIDATION_THRESHOLD_M", "100")
        .parse::<f64>()
        .map_err(|e| invalid("STOREGEO_POI_VALIDATION_THRESHOLD_M", e.to_string()))
        .and_then(|v| {
            if v.is_finite() && v > 0.0 {
                Ok(v)
            } else {
                Err(invalid(
                    "STOREGEO_POI_VALIDATION_THRESHOLD_M",
                    "must be a positive number of meters".to_string(),
                ))
            }
        })?;
    let fallback_center =
        Coordinate::parse_pair(&or_default("STOREGEO_FALLBACK_CENTER", "51.1657,10.4515"))
            .map_err(|reason| invalid("STOREGEO_FALLBACK_CENTER", reason))?;

    Ok(AppConfig {
        database_url,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        market_index_url,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        overpass_url,
        overpass_timeout_secs,
        overpass_min_interval_ms,
        overpass_daily_limit,
        nominatim_url,
        nominatim_timeout_secs,
        geocoder_user_agent,
        poi_radius_m,
        poi_validation_threshold_m,
        fallback_center,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
