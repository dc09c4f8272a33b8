//! Persistence seam used by the resolution engine.

use std::future::Future;

use sqlx::PgPool;

use storegeo_core::{ResolutionOutcome, StoreRecord};
use storegeo_db::DbError;

/// Store access needed to run geocoding passes.
///
/// Each write commits on its own; no transaction spans more than one store.
pub trait StoreRepository: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Stores not yet checked, ordered by `market_id`, at most `limit`.
    fn list_pending(
        &self,
        limit: Option<i64>,
    ) -> impl Future<Output = Result<Vec<StoreRecord>, Self::Error>> + Send;

    fn get(
        &self,
        market_id: i64,
    ) -> impl Future<Output = Result<Option<StoreRecord>, Self::Error>> + Send;

    /// Persists a resolution and marks the store checked, atomically.
    fn apply_resolution(
        &self,
        market_id: i64,
        outcome: &ResolutionOutcome,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Marks the store checked without touching any other column.
    fn mark_checked(&self, market_id: i64) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// [`StoreRepository`] over the Postgres `stores` table.
#[derive(Debug, Clone)]
pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl StoreRepository for PgStoreRepository {
    type Error = DbError;

    async fn list_pending(&self, limit: Option<i64>) -> Result<Vec<StoreRecord>, DbError> {
        storegeo_db::list_stores_needing_geocoding(&self.pool, limit)
            .await?
            .into_iter()
            .map(|row| StoreRecord::try_from(row).map_err(DbError::from))
            .collect()
    }

    async fn get(&self, market_id: i64) -> Result<Option<StoreRecord>, DbError> {
        match storegeo_db::get_store(&self.pool, market_id).await {
            Ok(row) => Ok(Some(StoreRecord::try_from(row)?)),
            Err(DbError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn apply_resolution(
        &self,
        market_id: i64,
        outcome: &ResolutionOutcome,
    ) -> Result<(), DbError> {
        storegeo_db::apply_resolution(&self.pool, market_id, outcome).await
    }

    async fn mark_checked(&self, market_id: i64) -> Result<(), DbError> {
        storegeo_db::mark_store_checked(&self.pool, market_id).await
    }
}
