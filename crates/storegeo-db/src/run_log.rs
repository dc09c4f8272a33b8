//! One `run_log` row per batch invocation of `storegeo scrape` or
//! `storegeo geocode`, closed with the counts that batch produced.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Scrape,
    Geocode,
}

impl RunKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunKind::Scrape => "scrape",
            RunKind::Geocode => "geocode",
        }
    }
}

/// Counts recorded when a run finishes. The variant must match the kind the
/// run was opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTally {
    Scrape {
        new: i64,
        updated: i64,
    },
    Geocode {
        total: i64,
        successful: i64,
        failed: i64,
        overpass_queries: i64,
    },
}

impl RunTally {
    #[must_use]
    pub fn kind(&self) -> RunKind {
        match self {
            RunTally::Scrape { .. } => RunKind::Scrape,
            RunTally::Geocode { .. } => RunKind::Geocode,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RunLogRow {
    pub id: i64,
    pub kind: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub abort_reason: Option<String>,
    pub stores_new: Option<i64>,
    pub stores_updated: Option<i64>,
    pub geocode_total: Option<i64>,
    pub geocode_successful: Option<i64>,
    pub geocode_failed: Option<i64>,
    pub overpass_queries: Option<i64>,
}

impl RunLogRow {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.finished_at.is_none()
    }

    /// Short description of the outcome, as printed by `storegeo stats`.
    #[must_use]
    pub fn summary(&self) -> String {
        let count = |value: Option<i64>| value.unwrap_or(0);

        if let Some(reason) = &self.abort_reason {
            return format!("aborted: {reason}");
        }
        if self.is_open() {
            return "in progress".to_string();
        }
        if self.kind == RunKind::Scrape.as_str() {
            format!(
                "new={} updated={}",
                count(self.stores_new),
                count(self.stores_updated)
            )
        } else {
            format!(
                "total={} successful={} failed={} overpass_queries={}",
                count(self.geocode_total),
                count(self.geocode_successful),
                count(self.geocode_failed),
                count(self.overpass_queries)
            )
        }
    }
}

const RUN_LOG_COLUMNS: &str = "id, kind, started_at, finished_at, abort_reason, \
     stores_new, stores_updated, \
     geocode_total, geocode_successful, geocode_failed, overpass_queries";

/// Opens a run and returns its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn open_run(pool: &PgPool, kind: RunKind) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>("INSERT INTO run_log (kind) VALUES ($1) RETURNING id")
        .bind(kind.as_str())
        .fetch_one(pool)
        .await?;
    Ok(id)
}

/// Closes an open run with the counts it produced.
///
/// # Errors
///
/// Returns [`DbError::RunNotOpen`] if no open run of the tally's kind has
/// this id, or [`DbError::Sqlx`] if the update fails, including when a
/// geocode total does not equal successful plus failed.
pub async fn finish_run(pool: &PgPool, id: i64, tally: &RunTally) -> Result<(), DbError> {
    let (stores_new, stores_updated, total, successful, failed, overpass_queries) = match *tally {
        RunTally::Scrape { new, updated } => (Some(new), Some(updated), None, None, None, None),
        RunTally::Geocode {
            total,
            successful,
            failed,
            overpass_queries,
        } => (
            None,
            None,
            Some(total),
            Some(successful),
            Some(failed),
            Some(overpass_queries),
        ),
    };
    let result = sqlx::query(
        "UPDATE run_log \
         SET finished_at = NOW(), \
             stores_new = $3, stores_updated = $4, \
             geocode_total = $5, geocode_successful = $6, geocode_failed = $7, \
             overpass_queries = $8 \
         WHERE id = $1 AND kind = $2 AND finished_at IS NULL",
    )
    .bind(id)
    .bind(tally.kind().as_str())
    .bind(stores_new)
    .bind(stores_updated)
    .bind(total)
    .bind(successful)
    .bind(failed)
    .bind(overpass_queries)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::RunNotOpen { id });
    }
    Ok(())
}

/// Closes an open run without counts, keeping the reason it stopped.
///
/// # Errors
///
/// Returns [`DbError::RunNotOpen`] if the run is already closed or does not
/// exist, or [`DbError::Sqlx`] if the update fails.
pub async fn abort_run(pool: &PgPool, id: i64, reason: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE run_log \
         SET finished_at = NOW(), abort_reason = $2 \
         WHERE id = $1 AND finished_at IS NULL",
    )
    .bind(id)
    .bind(reason)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::RunNotOpen { id });
    }
    Ok(())
}

/// Returns the `limit` most recently started runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn recent_runs(pool: &PgPool, limit: i64) -> Result<Vec<RunLogRow>, DbError> {
    let rows = sqlx::query_as::<_, RunLogRow>(&format!(
        "SELECT {RUN_LOG_COLUMNS} FROM run_log ORDER BY started_at DESC, id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
