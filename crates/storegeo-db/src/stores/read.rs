//! Read operations for the `stores` and `opening_hours` tables.

use sqlx::PgPool;

use super::types::{OpeningHoursRow, StoreRow, StoreStats};
use super::STORE_COLUMNS;
use crate::DbError;

/// List stores that no geocoding pass has looked at yet, ordered by
/// `market_id ASC`. `limit = None` returns every pending store.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_stores_needing_geocoding(
    pool: &PgPool,
    limit: Option<i64>,
) -> Result<Vec<StoreRow>, DbError> {
    let sql = format!(
        "SELECT {STORE_COLUMNS} \
         FROM stores \
         WHERE osm_checked = FALSE \
         ORDER BY market_id ASC \
         LIMIT $1"
    );
    // LIMIT NULL means no limit in Postgres.
    let rows = sqlx::query_as::<_, StoreRow>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Fetch one store by `market_id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the store does not exist, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_store(pool: &PgPool, market_id: i64) -> Result<StoreRow, DbError> {
    let sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE market_id = $1");
    sqlx::query_as::<_, StoreRow>(&sql)
        .bind(market_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Opening hours for one store, in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_opening_hours(
    pool: &PgPool,
    market_id: i64,
) -> Result<Vec<OpeningHoursRow>, DbError> {
    let rows = sqlx::query_as::<_, OpeningHoursRow>(
        "SELECT id, market_id, weekday, open_from, open_until \
         FROM opening_hours \
         WHERE market_id = $1 \
         ORDER BY id ASC",
    )
    .bind(market_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Enrichment counts across all stores.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn store_stats(pool: &PgPool) -> Result<StoreStats, DbError> {
    let stats = sqlx::query_as::<_, StoreStats>(
        "SELECT \
            COUNT(*) AS total, \
            COUNT(*) FILTER (WHERE osm_checked) AS checked, \
            COUNT(*) FILTER (WHERE final_latitude IS NOT NULL) AS resolved, \
            COUNT(*) FILTER (\
                WHERE latitude IS NOT NULL AND longitude IS NOT NULL \
                  AND latitude != 0 AND longitude != 0\
            ) AS with_scraped_coordinate, \
            COUNT(*) FILTER (WHERE geocoding_source = 'overpass_poi') AS source_overpass_poi, \
            COUNT(*) FILTER (WHERE geocoding_source = 'scraper') AS source_scraper, \
            COUNT(*) FILTER (WHERE geocoding_source = 'nominatim_address') \
                AS source_nominatim_address, \
            COUNT(*) FILTER (WHERE geocoding_confidence = 'very_high') AS confidence_very_high, \
            COUNT(*) FILTER (WHERE geocoding_confidence = 'high') AS confidence_high, \
            COUNT(*) FILTER (WHERE geocoding_confidence = 'medium') AS confidence_medium, \
            COUNT(*) FILTER (WHERE geocoding_confidence = 'low') AS confidence_low \
         FROM stores",
    )
    .fetch_one(pool)
    .await?;

    Ok(stats)
}
