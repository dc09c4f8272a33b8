use super::*;

use storegeo_core::{AppConfig, Coordinate};
use storegeo_db::RunTally;
use storegeo_geocode::{BatchStats, LookupError};
use storegeo_scraper::ScraperError;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        log_level: "info".to_string(),
        db_max_connections: 5,
        db_min_connections: 1,
        db_acquire_timeout_secs: 10,
        market_index_url: "http://localhost/page-data.json".to_string(),
        scraper_request_timeout_secs: 30,
        scraper_user_agent: "storegeo-test".to_string(),
        scraper_max_retries: 3,
        scraper_retry_backoff_base_secs: 5,
        overpass_url: "http://localhost/api/interpreter".to_string(),
        overpass_timeout_secs: 30,
        overpass_min_interval_ms: 0,
        overpass_daily_limit: 10_000,
        nominatim_url: "http://localhost/search".to_string(),
        nominatim_timeout_secs: 10,
        geocoder_user_agent: "storegeo-test".to_string(),
        poi_radius_m: 100,
        poi_validation_threshold_m: 100.0,
        fallback_center: Coordinate::new(51.1657, 10.4515),
    }
}

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["storegeo", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli = Cli::try_parse_from(["storegeo", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["storegeo"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
    assert!(!cli.verbose);
}

#[test]
fn scrape_defaults_to_writing() {
    let cli = Cli::try_parse_from(["storegeo", "scrape"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Scrape { dry_run: false })
    ));
}

#[test]
fn scrape_dry_run() {
    let cli = Cli::try_parse_from(["storegeo", "scrape", "--dry-run"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Scrape { dry_run: true })));
}

#[test]
fn geocode_without_flags_processes_everything() {
    let cli = Cli::try_parse_from(["storegeo", "geocode"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Geocode(GeocodeArgs {
            limit: None,
            market_id: None,
            force: false
        }))
    ));
}

#[test]
fn geocode_with_limit() {
    let cli = Cli::try_parse_from(["storegeo", "geocode", "--limit", "25"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Geocode(GeocodeArgs {
            limit: Some(25),
            ..
        }))
    ));
}

#[test]
fn geocode_single_store_with_force() {
    let cli =
        Cli::try_parse_from(["storegeo", "geocode", "--market-id", "3", "--force"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Geocode(GeocodeArgs {
            market_id: Some(3),
            force: true,
            limit: None
        }))
    ));
}

#[test]
fn force_requires_market_id() {
    assert!(Cli::try_parse_from(["storegeo", "geocode", "--force"]).is_err());
}

#[test]
fn limit_conflicts_with_market_id() {
    assert!(
        Cli::try_parse_from(["storegeo", "geocode", "--limit", "5", "--market-id", "3"]).is_err()
    );
}

#[test]
fn verbose_is_global() {
    let cli = Cli::try_parse_from(["storegeo", "stats", "--verbose"]).unwrap();
    assert!(cli.verbose);
    assert!(matches!(cli.command, Some(Commands::Stats)));
}

#[test]
fn unknown_command_is_rejected() {
    assert!(Cli::try_parse_from(["storegeo", "collect"]).is_err());
}

#[test]
fn geocoding_client_errors_keep_their_source() {
    let config = AppConfig {
        geocoder_user_agent: "storegeo\nbroken".to_string(),
        ..app_config()
    };
    let Err(err) = geocode::build_resolver(&config) else {
        panic!("expected an invalid user agent to be rejected");
    };

    assert_eq!(err.to_string(), "failed to build geocoding clients");
    assert!(matches!(
        err.downcast_ref::<LookupError>(),
        Some(LookupError::Http(_))
    ));
}

#[test]
fn market_index_client_errors_keep_their_source() {
    let config = AppConfig {
        scraper_user_agent: "storegeo\nbroken".to_string(),
        ..app_config()
    };
    let Err(err) = scrape::build_client(&config) else {
        panic!("expected an invalid user agent to be rejected");
    };

    assert_eq!(err.to_string(), "failed to build market index client");
    assert!(err.downcast_ref::<ScraperError>().is_some());
}

#[test]
fn valid_config_builds_both_clients() {
    let config = app_config();
    assert!(geocode::build_resolver(&config).is_ok());
    assert!(scrape::build_client(&config).is_ok());
}

#[test]
fn geocode_run_tally_carries_batch_counts() {
    let stats = BatchStats {
        total: 3,
        successful: 1,
        failed: 2,
    };
    assert_eq!(
        geocode::geocode_tally(&stats, 11),
        RunTally::Geocode {
            total: 3,
            successful: 1,
            failed: 2,
            overpass_queries: 11,
        }
    );
}

#[test]
fn scrape_run_tally_splits_new_and_updated() {
    assert_eq!(
        scrape::scrape_tally(4, 311),
        RunTally::Scrape {
            new: 4,
            updated: 311,
        }
    );
}
