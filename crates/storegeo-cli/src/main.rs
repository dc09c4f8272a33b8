mod geocode;
mod scrape;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::geocode::GeocodeArgs;

#[derive(Debug, Parser)]
#[command(name = "storegeo")]
#[command(about = "Collect retail store locations and resolve their coordinates")]
struct Cli {
    /// Log at debug level regardless of RUST_LOG
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Fetch the vendor market index and upsert every store
    Scrape {
        /// Fetch and parse only; do not write to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Resolve coordinates for unchecked stores, or for a single store
    Geocode(GeocodeArgs),
    /// Print enrichment counts and recent runs
    Stats,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("storegeo: no command given, see --help");
        return Ok(());
    };

    let config = storegeo_core::load_app_config()?;
    init_tracing(&config.log_level, cli.verbose)?;

    let pool = storegeo_db::connect_pool(
        &config.database_url,
        storegeo_db::PoolConfig::from_app_config(&config),
    )
    .await?;

    match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            storegeo_db::ping(&pool).await?;
            println!("database ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = storegeo_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Scrape { dry_run } => scrape::run_scrape(&pool, &config, dry_run).await?,
        Commands::Geocode(args) => geocode::run_geocode(&pool, &config, &args).await?,
        Commands::Stats => print_stats(&pool).await?,
    }

    Ok(())
}

fn init_tracing(log_level: &str, verbose: bool) -> anyhow::Result<()> {
    let env_filter = if verbose {
        EnvFilter::try_new("debug")?
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?
    };
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

async fn print_stats(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let stats = storegeo_db::store_stats(pool).await?;

    println!("stores:                {}", stats.total);
    println!("  with feed coordinate {}", stats.with_scraped_coordinate);
    println!("  checked              {}", stats.checked);
    println!("  resolved             {}", stats.resolved);
    println!("  unresolved           {}", stats.unresolved());
    println!("by source:");
    println!("  overpass_poi         {}", stats.source_overpass_poi);
    println!("  scraper              {}", stats.source_scraper);
    println!("  nominatim_address    {}", stats.source_nominatim_address);
    println!("by confidence:");
    println!("  very_high            {}", stats.confidence_very_high);
    println!("  high                 {}", stats.confidence_high);
    println!("  medium               {}", stats.confidence_medium);
    println!("  low                  {}", stats.confidence_low);

    let runs = storegeo_db::recent_runs(pool, 5).await?;
    if !runs.is_empty() {
        println!("recent runs:");
        for run in runs {
            println!(
                "  #{:<5} {:<8} {} {}",
                run.id,
                run.kind,
                run.started_at.format("%Y-%m-%d %H:%M"),
                run.summary()
            );
        }
    }
    Ok(())
}

/// Closes a run as aborted, logging instead of propagating if that also fails.
async fn abort_run_best_effort(pool: &sqlx::PgPool, run_id: i64, error: &anyhow::Error) {
    if let Err(abort_err) = storegeo_db::abort_run(pool, run_id, &format!("{error:#}")).await {
        tracing::error!(run_id, error = %abort_err, "failed to record aborted run");
    }
}

#[cfg(test)]
mod tests;
