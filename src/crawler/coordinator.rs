//! Scrape coordinator
//!
//! Ties together the cache, the access gate, link discovery and the worker
//! pool that extracts individual reels.

use crate::browser::Browser;
use crate::cache::{CacheKey, ScrapeCache};
use crate::config::Config;
use crate::crawler::close_page;
use crate::crawler::discovery::LinkDiscoverer;
use crate::crawler::extractor::ItemExtractor;
use crate::crawler::gate::AccessGate;
use crate::crawler::pool::WorkerPool;
use crate::model::ProfileScrape;
use crate::url::{parse_base_url, profile_urls, validate_username};
use crate::{ErrorKind, ScrapeError};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Scrapes profiles through one browser and one cache
///
/// The browser and cache are injected so a single instance can serve many
/// scrapes.
pub struct Scraper {
    config: Config,
    base_url: Url,
    browser: Arc<dyn Browser>,
    cache: Arc<dyn ScrapeCache>,
    gate: AccessGate,
    discoverer: LinkDiscoverer,
    pool: WorkerPool,
}

impl Scraper {
    /// Creates a new scraper
    ///
    /// # Arguments
    ///
    /// * `config` - The scraper configuration
    /// * `browser` - Page driver shared by every scrape
    /// * `cache` - Result cache shared by every scrape
    pub fn new(
        config: Config,
        browser: Arc<dyn Browser>,
        cache: Arc<dyn ScrapeCache>,
    ) -> Result<Self, ScrapeError> {
        let base_url = parse_base_url(&config.scraper.base_url)?;

        Ok(Self {
            gate: AccessGate::from_config(&config),
            discoverer: LinkDiscoverer::from_config(&config.scraper),
            pool: WorkerPool::new(config.scraper.max_concurrent_pages),
            base_url,
            browser,
            cache,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Scrapes up to `limit` reels from `username`
    ///
    /// An absent or zero limit means the configured default. A fresh cached
    /// result for the same username and limit is returned without touching
    /// the browser; only complete successful scrapes are cached.
    ///
    /// # Returns
    ///
    /// * `Ok(ProfileScrape)` - The reels that could be extracted (possibly none)
    /// * `Err(ScrapeError)` - Invalid input, inaccessible profile or internal failure
    pub async fn scrape(
        &self,
        username: &str,
        limit: Option<u32>,
    ) -> Result<ProfileScrape, ScrapeError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ScrapeError::InvalidInput(
                "username must not be empty".to_string(),
            ));
        }
        validate_username(username)?;

        let limit = self.config.scraper.effective_limit(limit);
        let key = CacheKey::new(username, limit);

        if let Some(cached) = self.cache.get(&key) {
            tracing::info!("Cache hit for {}", key);
            return Ok(cached);
        }

        let result = match self.config.scraper.scrape_timeout_secs {
            Some(seconds) => {
                match tokio::time::timeout(Duration::from_secs(seconds), self.run(username, limit))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ScrapeError::Deadline {
                        username: username.to_string(),
                        seconds,
                    }),
                }
            }
            None => self.run(username, limit).await,
        };

        match result {
            Ok(scrape) => {
                tracing::info!("Scraped {} reels for {}", scrape.count, key);
                self.cache.set(key, scrape.clone());
                Ok(scrape)
            }
            Err(e) => {
                match e.kind() {
                    ErrorKind::NotAccessible => tracing::warn!("{}", e),
                    _ => tracing::error!("Scrape of {} failed: {}", key, e),
                }
                Err(e)
            }
        }
    }

    async fn run(&self, username: &str, limit: u32) -> Result<ProfileScrape, ScrapeError> {
        let urls = profile_urls(&self.base_url, username)?;

        let page = self.gate.open(self.browser.as_ref(), username, &urls).await?;
        let discovered = self.discoverer.discover(page.as_ref(), limit as usize).await;
        close_page(page.as_ref()).await;
        let outcome = discovered?;

        tracing::info!(
            "Extracting {} reels for {} with {} workers",
            outcome.links.len(),
            username,
            self.pool.workers()
        );

        let extractor = Arc::new(ItemExtractor::from_config(
            Arc::clone(&self.browser),
            self.base_url.clone(),
            &self.config.scraper,
        ));
        let reels = self
            .pool
            .run(outcome.links, move |link| {
                let extractor = Arc::clone(&extractor);
                async move { extractor.extract(&link).await }
            })
            .await;

        Ok(ProfileScrape::new(username, Utc::now(), reels))
    }
}
