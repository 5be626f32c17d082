//! Almoneda main entry point
//!
//! Command-line interface for the auction registry scraper.

use almoneda::config::load_config_with_hash;
use almoneda::crawler::Coordinator;
use almoneda::facets::{facet_space_size, ASSET_TYPES, AUCTION_TYPES, PROVINCES, STATUSES};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Almoneda: an auction registry scraper
///
/// Walks the registry's full facet search space, extracts structured
/// auction records from detail pages, harvests attached media into blob
/// storage, and idempotently persists everything.
#[derive(Parser, Debug)]
#[command(name = "almoneda")]
#[command(version)]
#[command(about = "Auction registry scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be scraped without scraping
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_scrape(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("almoneda=info,warn"),
            1 => EnvFilter::new("almoneda=debug,info"),
            2 => EnvFilter::new("almoneda=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the search space
fn handle_dry_run(config: &almoneda::config::Config) {
    println!("=== Almoneda Dry Run ===\n");

    println!("Registry:");
    println!("  Base URL: {}", config.registry.base_url);

    println!("\nScraper:");
    println!("  Search delay: {}ms", config.scraper.search_delay_ms);
    println!("  Detail delay: {}ms", config.scraper.detail_delay_ms);
    println!(
        "  Request timeout: {}s",
        config.scraper.request_timeout_secs
    );
    println!("  Max retries: {}", config.scraper.max_retries);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nGeocoder:");
    println!("  Endpoint: {}", config.geocoder.endpoint);

    println!("\nBlob Storage:");
    println!("  Endpoint: {}", config.blob.endpoint);
    println!("  Bucket: {}", config.blob.bucket);
    println!("  Public base: {}", config.blob.public_base());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nSearch Space:");
    println!("  Provinces: {}", PROVINCES.len());
    println!("  Asset types: {}", ASSET_TYPES.len());
    println!("  Auction types: {}", AUCTION_TYPES.len());
    println!("  Statuses: {}", STATUSES.len());
    println!("  Total facets: {}", facet_space_size());

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &almoneda::config::Config) -> anyhow::Result<()> {
    use almoneda::output::{load_statistics, print_statistics};
    use almoneda::storage::SqliteStorage;
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(
    config: &almoneda::config::Config,
    config_hash: &str,
) -> anyhow::Result<()> {
    let mut coordinator = Coordinator::new(config, config_hash)?;

    // Ctrl-C stops the run at the next facet or detail-URL boundary.
    let cancel = coordinator.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing current page before stopping");
            cancel.cancel();
        }
    });

    let counters = coordinator.run().await?;

    println!(
        "Scrape finished: {} auctions persisted, {} attachments stored, {} pages failed",
        counters.auctions_persisted, counters.attachments_stored, counters.pages_failed
    );

    Ok(())
}
