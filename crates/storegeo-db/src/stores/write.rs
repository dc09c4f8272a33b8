//! Write operations for the `stores` and `opening_hours` tables.

use sqlx::PgPool;

use storegeo_core::{NewStore, OpeningHours, ResolutionOutcome};

use crate::DbError;

/// Insert a scraped store, or refresh the scraped columns of an existing one.
///
/// Enrichment columns (`osm_*`, `final_*`, `geocoding_*`) are never written
/// here. Returns `true` when the row did not exist before.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_store(pool: &PgPool, store: &NewStore) -> Result<bool, DbError> {
    let is_new = sqlx::query_scalar::<_, bool>(
        "INSERT INTO stores \
             (market_id, name, street, zip, city, latitude, longitude, phone, email, \
              country_code, status, opening_day, is_loyalty_market, google_maps_link) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
         ON CONFLICT (market_id) DO UPDATE SET \
             name              = EXCLUDED.name, \
             street            = EXCLUDED.street, \
             zip               = EXCLUDED.zip, \
             city              = EXCLUDED.city, \
             latitude          = EXCLUDED.latitude, \
             longitude         = EXCLUDED.longitude, \
             phone             = EXCLUDED.phone, \
             email             = EXCLUDED.email, \
             country_code      = EXCLUDED.country_code, \
             status            = EXCLUDED.status, \
             opening_day       = EXCLUDED.opening_day, \
             is_loyalty_market = EXCLUDED.is_loyalty_market, \
             google_maps_link  = EXCLUDED.google_maps_link, \
             updated_at        = NOW() \
         RETURNING (xmax = 0) AS is_new",
    )
    .bind(store.market_id)
    .bind(&store.name)
    .bind(&store.street)
    .bind(&store.zip)
    .bind(&store.city)
    .bind(store.coordinate.map(|c| c.latitude))
    .bind(store.coordinate.map(|c| c.longitude))
    .bind(&store.phone)
    .bind(&store.email)
    .bind(&store.country_code)
    .bind(&store.status)
    .bind(store.opening_day)
    .bind(store.is_loyalty_market)
    .bind(&store.google_maps_link)
    .fetch_one(pool)
    .await?;

    Ok(is_new)
}

/// Replace all opening-hours rows for a store in one transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; the transaction is
/// rolled back and the previous hours remain.
pub async fn replace_opening_hours(
    pool: &PgPool,
    market_id: i64,
    hours: &[OpeningHours],
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM opening_hours WHERE market_id = $1")
        .bind(market_id)
        .execute(&mut *tx)
        .await?;

    for entry in hours {
        sqlx::query(
            "INSERT INTO opening_hours (market_id, weekday, open_from, open_until) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(market_id)
        .bind(&entry.weekday)
        .bind(&entry.open_from)
        .bind(&entry.open_until)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Persist a resolution outcome for one store in a single `UPDATE`.
///
/// Final coordinate, source, confidence and the checked flag are always
/// written. Replacement address values overwrite the stored ones only when
/// present (`COALESCE`), so a partial correction never clears a field. With
/// no correction the address columns are left exactly as they were.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the store does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn apply_resolution(
    pool: &PgPool,
    market_id: i64,
    outcome: &ResolutionOutcome,
) -> Result<(), DbError> {
    let correction = outcome.address_correction.as_ref();
    let geocode = outcome.address_geocode.as_ref();

    let result = sqlx::query(
        "UPDATE stores SET \
             final_latitude       = $2, \
             final_longitude      = $3, \
             geocoding_source     = $4, \
             geocoding_confidence = $5, \
             street               = COALESCE($6, street), \
             zip                  = COALESCE($7, zip), \
             city                 = COALESCE($8, city), \
             osm_latitude         = COALESCE($9, osm_latitude), \
             osm_longitude        = COALESCE($10, osm_longitude), \
             osm_display_name     = COALESCE($11, osm_display_name), \
             osm_checked          = TRUE, \
             osm_checked_at       = NOW() \
         WHERE market_id = $1",
    )
    .bind(market_id)
    .bind(outcome.coordinate.latitude)
    .bind(outcome.coordinate.longitude)
    .bind(outcome.source.as_str())
    .bind(outcome.confidence.as_str())
    .bind(correction.and_then(|c| c.street.as_deref()))
    .bind(correction.and_then(|c| c.postal_code.as_deref()))
    .bind(correction.and_then(|c| c.city.as_deref()))
    .bind(geocode.map(|g| g.coordinate.latitude))
    .bind(geocode.map(|g| g.coordinate.longitude))
    .bind(geocode.map(|g| g.display_name.as_str()))
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Flag a store as looked at without recording any coordinate.
///
/// Used when every tier came up empty, so the store is not retried on the
/// next batch.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the store does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn mark_store_checked(pool: &PgPool, market_id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE stores SET osm_checked = TRUE, osm_checked_at = NOW() WHERE market_id = $1",
    )
    .bind(market_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
