//! Single-store and batch entry points that persist resolution outcomes.

use serde::Serialize;
use thiserror::Error;

use storegeo_core::{ResolutionOutcome, StoreRecord};

use super::Resolver;
use crate::repository::StoreRepository;

/// Aggregate counts for one batch run.
///
/// `successful` counts stores that received a final coordinate; `failed`
/// counts unresolved stores and stores whose update could not be persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// What happened to a single store requested by id.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreGeocodeResult {
    /// Already checked and re-processing was not forced.
    Skipped,
    Resolved(ResolutionOutcome),
    /// No tier produced a coordinate; the store was marked checked.
    Unresolved,
}

#[derive(Debug, Error)]
pub enum ResolveError<E: std::error::Error + 'static> {
    #[error("store {0} not found")]
    StoreNotFound(i64),
    #[error("store repository error: {0}")]
    Repository(#[source] E),
}

impl Resolver {
    /// Resolves and persists one store.
    ///
    /// A store that is already checked is left alone unless `force` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::StoreNotFound`] for an unknown `market_id` and
    /// [`ResolveError::Repository`] when reading or writing the store fails.
    pub async fn geocode_one<R: StoreRepository>(
        &self,
        repo: &R,
        market_id: i64,
        force: bool,
    ) -> Result<StoreGeocodeResult, ResolveError<R::Error>> {
        let store = repo
            .get(market_id)
            .await
            .map_err(ResolveError::Repository)?
            .ok_or(ResolveError::StoreNotFound(market_id))?;

        if store.osm_checked && !force {
            tracing::info!(market_id, "store already checked, skipping");
            return Ok(StoreGeocodeResult::Skipped);
        }

        let result = self
            .process_store(repo, &store)
            .await
            .map_err(ResolveError::Repository)?;
        Ok(match result {
            Some(outcome) => StoreGeocodeResult::Resolved(outcome),
            None => StoreGeocodeResult::Unresolved,
        })
    }

    /// Resolves every unchecked store (at most `limit`) one at a time.
    ///
    /// A store whose update fails is logged, counted as failed, and marked
    /// checked on a best-effort basis; the batch always continues.
    ///
    /// # Errors
    ///
    /// Returns the repository error only when the pending list cannot be
    /// loaded.
    pub async fn geocode_pending<R: StoreRepository>(
        &self,
        repo: &R,
        limit: Option<i64>,
    ) -> Result<BatchStats, R::Error> {
        let stores = repo.list_pending(limit).await?;
        let mut stats = BatchStats {
            total: stores.len(),
            ..BatchStats::default()
        };
        tracing::info!(total = stats.total, "geocoding pending stores");

        for (index, store) in stores.iter().enumerate() {
            tracing::info!(
                market_id = store.market_id,
                name = %store.name,
                "processing store {}/{}",
                index + 1,
                stats.total
            );

            match self.process_store(repo, store).await {
                Ok(Some(_)) => stats.successful += 1,
                Ok(None) => stats.failed += 1,
                Err(err) => {
                    tracing::error!(
                        market_id = store.market_id,
                        error = %err,
                        "failed to persist geocoding result"
                    );
                    stats.failed += 1;
                    if let Err(mark_err) = repo.mark_checked(store.market_id).await {
                        tracing::error!(
                            market_id = store.market_id,
                            error = %mark_err,
                            "failed to mark store as checked"
                        );
                    }
                }
            }
        }

        tracing::info!(
            total = stats.total,
            successful = stats.successful,
            failed = stats.failed,
            "geocoding batch complete"
        );
        Ok(stats)
    }

    async fn process_store<R: StoreRepository>(
        &self,
        repo: &R,
        store: &StoreRecord,
    ) -> Result<Option<ResolutionOutcome>, R::Error> {
        if let Some(outcome) = self.resolve_store(store).await {
            repo.apply_resolution(store.market_id, &outcome).await?;
            tracing::info!(
                market_id = store.market_id,
                tier = outcome.tier.number(),
                source = %outcome.source,
                confidence = %outcome.confidence,
                address_updated = outcome.updates_address(),
                "store geocoded"
            );
            Ok(Some(outcome))
        } else {
            tracing::warn!(market_id = store.market_id, "no tier produced a coordinate");
            repo.mark_checked(store.market_id).await?;
            Ok(None)
        }
    }
}
