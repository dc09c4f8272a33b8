//! `storegeo geocode`: batch and single-store coordinate resolution.

use anyhow::Context;
use clap::Args;

use storegeo_core::AppConfig;
use storegeo_db::{RunKind, RunTally};
use storegeo_geocode::{BatchStats, PgStoreRepository, ResolveError, Resolver, StoreGeocodeResult};

use crate::abort_run_best_effort;

#[derive(Debug, Args)]
pub(crate) struct GeocodeArgs {
    /// Process at most this many unchecked stores
    #[arg(long, conflicts_with = "market_id")]
    pub limit: Option<i64>,
    /// Resolve only this store
    #[arg(long)]
    pub market_id: Option<i64>,
    /// Re-process the store even if it was already checked
    #[arg(long, requires = "market_id")]
    pub force: bool,
}

pub(crate) async fn run_geocode(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    args: &GeocodeArgs,
) -> anyhow::Result<()> {
    let resolver = build_resolver(config)?;
    let repo = PgStoreRepository::new(pool.clone());

    if let Some(market_id) = args.market_id {
        return geocode_single(&resolver, &repo, market_id, args.force).await;
    }

    if let Some(limit) = args.limit {
        if limit < 1 {
            anyhow::bail!("--limit must be at least 1, got {limit}");
        }
    }

    let run_id = storegeo_db::open_run(pool, RunKind::Geocode).await?;

    match resolver.geocode_pending(&repo, args.limit).await {
        Ok(stats) => {
            let tally = geocode_tally(&stats, resolver.overpass().queries_sent());
            storegeo_db::finish_run(pool, run_id, &tally).await?;
            println!(
                "geocoding complete: total={} successful={} failed={} overpass_queries={}",
                stats.total,
                stats.successful,
                stats.failed,
                resolver.overpass().queries_sent()
            );
            Ok(())
        }
        Err(e) => {
            let e = anyhow::Error::from(e);
            abort_run_best_effort(pool, run_id, &e).await;
            Err(e)
        }
    }
}

pub(crate) fn build_resolver(config: &AppConfig) -> anyhow::Result<Resolver> {
    Resolver::from_app_config(config).context("failed to build geocoding clients")
}

pub(crate) fn geocode_tally(stats: &BatchStats, overpass_queries: u32) -> RunTally {
    let count = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
    RunTally::Geocode {
        total: count(stats.total),
        successful: count(stats.successful),
        failed: count(stats.failed),
        overpass_queries: i64::from(overpass_queries),
    }
}

async fn geocode_single(
    resolver: &Resolver,
    repo: &PgStoreRepository,
    market_id: i64,
    force: bool,
) -> anyhow::Result<()> {
    match resolver.geocode_one(repo, market_id, force).await {
        Ok(StoreGeocodeResult::Skipped) => {
            println!("store {market_id} already checked; pass --force to re-process");
        }
        Ok(StoreGeocodeResult::Resolved(outcome)) => {
            println!(
                "store {market_id}: {} (tier {}, source={}, confidence={}{})",
                outcome.coordinate,
                outcome.tier.number(),
                outcome.source,
                outcome.confidence,
                if outcome.updates_address() {
                    ", address corrected"
                } else {
                    ""
                }
            );
        }
        Ok(StoreGeocodeResult::Unresolved) => {
            println!("store {market_id}: no coordinate found; marked as checked");
        }
        Err(ResolveError::StoreNotFound(id)) => anyhow::bail!("store {id} not found"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
