//! Reel-Scope main entry point
//!
//! This is the command-line interface for the Reel-Scope profile scraper.

use anyhow::{Context, Result};
use clap::Parser;
use reel_scope::browser;
use reel_scope::config::{apply_env_overrides, load_config_with_hash, validate, Config};
use reel_scope::output::{write_report, OutputFormat, ScrapeReport};
use reel_scope::{Scraper, TtlCache};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Reel-Scope: scrape a profile's recent reels
///
/// Reel-Scope loads each profile's reels listing, scrolls until enough reels
/// are found, and extracts every reel's video URL and metadata.
#[derive(Parser, Debug)]
#[command(name = "reel-scope")]
#[command(version)]
#[command(about = "Scrape recent reels from public profiles", long_about = None)]
struct Cli {
    /// Profiles to scrape, in order
    #[arg(value_name = "USERNAME", required = true)]
    usernames: Vec<String>,

    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum reels per profile (0 means the configured default)
    #[arg(short, long)]
    limit: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be scraped without launching a browser
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config, &cli);
        return Ok(ExitCode::SUCCESS);
    }

    let report = handle_scrape(config, &cli).await?;
    write_report(&report, cli.format, cli.output.as_deref()).context("Failed to write report")?;

    if report.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Sets up the logging/tracing subscriber
///
/// `LOG_LEVEL` takes precedence over the verbosity flags when set.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = match std::env::var("LOG_LEVEL") {
        Ok(level) if !level.trim().is_empty() => EnvFilter::new(level.trim().to_lowercase()),
        _ if quiet => EnvFilter::new("error"),
        _ => match verbose {
            0 => EnvFilter::new("reel_scope=info,warn"),
            1 => EnvFilter::new("reel_scope=debug,info"),
            2 => EnvFilter::new("reel_scope=trace,debug"),
            _ => EnvFilter::new("trace"),
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the defaults plus environment overrides
fn load(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            let mut config = Config::default();
            apply_env_overrides(&mut config).context("Invalid environment override")?;
            validate(&config).context("Invalid configuration")?;
            tracing::debug!("Using default configuration");
            Ok(config)
        }
    }
}

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(config: &Config, cli: &Cli) {
    let scraper = &config.scraper;

    println!("=== Reel-Scope Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Base URL: {}", scraper.base_url);
    println!("  Driver: {:?} (headless: {})", scraper.driver, scraper.headless);
    println!("  Max concurrent pages: {}", scraper.max_concurrent_pages);
    println!("  Max scrolls: {}", scraper.max_scrolls);
    println!("  Scroll settle: {}ms", scraper.scroll_settle_ms);
    println!("  Item settle: {}ms", scraper.item_settle_ms);
    println!("  Profile timeout: {}ms", scraper.profile_timeout_ms);
    println!("  Item timeout: {}ms", scraper.item_timeout_ms);
    match scraper.scrape_timeout_secs {
        Some(secs) => println!("  Scrape deadline: {}s", secs),
        None => println!("  Scrape deadline: none"),
    }

    println!("\nCache:");
    println!("  TTL: {}s", config.cache.ttl_seconds);
    println!("  Max entries: {}", config.cache.max_entries);

    println!("\nSession:");
    match &config.session.storage_state {
        Some(path) => println!("  Storage state: {}", path.display()),
        None => println!("  Storage state: none"),
    }
    println!("  User agent: {}", config.session.user_agent);

    if let Some(dir) = &config.diagnostics.artifact_dir {
        println!("\nDiagnostics:");
        println!("  Artifact dir: {}", dir.display());
    }

    let limit = scraper.effective_limit(cli.limit);
    println!("\nProfiles ({}), up to {} reels each:", cli.usernames.len(), limit);
    for username in &cli.usernames {
        println!("  - {}", username);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main scrape operation
async fn handle_scrape(config: Config, cli: &Cli) -> Result<ScrapeReport> {
    let browser = browser::launch(&config)
        .await
        .context("Failed to start page driver")?;
    let cache = Arc::new(TtlCache::from_config(&config.cache));
    let scraper = Scraper::new(config, browser, cache).context("Failed to build scraper")?;

    let mut report = ScrapeReport::new();
    for username in &cli.usernames {
        match scraper.scrape(username, cli.limit).await {
            Ok(scrape) => report.record_success(scrape),
            Err(e) => report.record_failure(username, &e),
        }
    }

    tracing::info!(
        "Finished: {} profiles, {} reels, {} failures",
        report.results.len(),
        report.total_reels(),
        report.failures.len()
    );

    Ok(report)
}
