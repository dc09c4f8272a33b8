//! `storegeo scrape`: market index → `stores` / `opening_hours`.

use anyhow::Context;

use storegeo_core::AppConfig;
use storegeo_db::{RunKind, RunTally};
use storegeo_scraper::{parse_market_index, MarketIndexClient};

use crate::abort_run_best_effort;

pub(crate) fn build_client(config: &AppConfig) -> anyhow::Result<MarketIndexClient> {
    MarketIndexClient::new(
        &config.market_index_url,
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_max_retries,
        config.scraper_retry_backoff_base_secs,
    )
    .context("failed to build market index client")
}

pub(crate) async fn run_scrape(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    dry_run: bool,
) -> anyhow::Result<()> {
    let client = build_client(config)?;

    if dry_run {
        let document = client.fetch_index().await?;
        let stores = parse_market_index(&document)?;
        let with_coordinate = stores.iter().filter(|s| s.coordinate.is_some()).count();
        println!(
            "dry-run: {} stores parsed from {} ({with_coordinate} with a usable coordinate)",
            stores.len(),
            client.url()
        );
        return Ok(());
    }

    let run_id = storegeo_db::open_run(pool, RunKind::Scrape).await?;

    match scrape_into(pool, &client).await {
        Ok((inserted, updated)) => {
            storegeo_db::finish_run(pool, run_id, &scrape_tally(inserted, updated)).await?;
            tracing::info!(run_id, inserted, updated, "scrape complete");
            println!("scrape complete: {inserted} new, {updated} updated");
            Ok(())
        }
        Err(e) => {
            abort_run_best_effort(pool, run_id, &e).await;
            Err(e)
        }
    }
}

pub(crate) fn scrape_tally(inserted: usize, updated: usize) -> RunTally {
    RunTally::Scrape {
        new: i64::try_from(inserted).unwrap_or(i64::MAX),
        updated: i64::try_from(updated).unwrap_or(i64::MAX),
    }
}

/// Returns `(inserted, updated)` store counts.
async fn scrape_into(
    pool: &sqlx::PgPool,
    client: &MarketIndexClient,
) -> anyhow::Result<(usize, usize)> {
    let document = client.fetch_index().await?;
    let stores = parse_market_index(&document)?;

    let mut inserted = 0usize;
    let mut updated = 0usize;
    for store in &stores {
        if storegeo_db::upsert_store(pool, store).await? {
            inserted += 1;
        } else {
            updated += 1;
        }
        storegeo_db::replace_opening_hours(pool, store.market_id, &store.opening_hours).await?;
    }
    Ok((inserted, updated))
}
