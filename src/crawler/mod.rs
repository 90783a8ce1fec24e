//! Crawler module for profile reel scraping
//!
//! This module contains the core scraping logic, including:
//! - Loading a profile and checking that it is accessible
//! - Scrolling the listing to discover reel links
//! - Extracting each reel's metadata on a bounded worker pool
//! - Overall scrape coordination with result caching

mod coordinator;
mod discovery;
mod extractor;
mod gate;
mod metadata;
mod parser;
mod pool;

pub use coordinator::Scraper;
pub use discovery::{DiscoveryOutcome, LinkDiscoverer};
pub use extractor::ItemExtractor;
pub use gate::AccessGate;
pub use metadata::{parse_ld_json, parse_upload_date, InteractionKind};
pub use parser::{
    count_reel_anchors, detect_profile_signals, extract_reel_hrefs, parse_reel_page,
    ProfileSignals, ReelFields,
};
pub use pool::WorkerPool;

use crate::browser::{self, BrowserPage};
use crate::cache::TtlCache;
use crate::config::Config;
use crate::model::ProfileScrape;
use crate::ScrapeError;
use std::sync::Arc;

/// Runs a single scrape with a freshly launched browser
///
/// This is the one-shot entry point. It will:
/// 1. Launch the configured page driver
/// 2. Create an empty cache
/// 3. Scrape the profile
///
/// Callers that scrape repeatedly should build one [`Scraper`] and reuse it
/// so the browser and cache are shared.
///
/// # Arguments
///
/// * `config` - The scraper configuration
/// * `username` - Profile to scrape
/// * `limit` - Maximum number of reels; absent or zero means the default
pub async fn scrape_profile(
    config: Config,
    username: &str,
    limit: Option<u32>,
) -> Result<ProfileScrape, ScrapeError> {
    let browser = browser::launch(&config).await?;
    let cache = Arc::new(TtlCache::from_config(&config.cache));
    let scraper = Scraper::new(config, browser, cache)?;
    scraper.scrape(username, limit).await
}

/// Closes a page, logging rather than returning a failure
pub(crate) async fn close_page(page: &dyn BrowserPage) {
    if let Err(e) = page.close().await {
        tracing::debug!("Failed to close page: {}", e);
    }
}
