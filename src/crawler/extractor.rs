//! Per-reel metadata extraction
//!
//! Each extraction opens its own page, reads the reel's metadata and closes
//! the page again. Failures stay local to the reel: they are logged and the
//! reel is left out of the results.

use crate::browser::{Browser, BrowserPage};
use crate::config::ScraperConfig;
use crate::crawler::close_page;
use crate::crawler::parser::parse_reel_page;
use crate::model::{Reel, ReelLink};
use crate::url::resolve_reel_url;
use crate::ScrapeError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a single reel produced no record
#[derive(Error, Debug)]
enum ExtractError {
    #[error(transparent)]
    Page(#[from] ScrapeError),

    #[error("No video URL found on {url}")]
    MissingVideoUrl { url: String },
}

/// Extracts reels through a shared browser
pub struct ItemExtractor {
    browser: Arc<dyn Browser>,
    base_url: Url,
    item_timeout: Duration,
    item_settle: Duration,
}

impl ItemExtractor {
    pub fn new(
        browser: Arc<dyn Browser>,
        base_url: Url,
        item_timeout: Duration,
        item_settle: Duration,
    ) -> Self {
        Self {
            browser,
            base_url,
            item_timeout,
            item_settle,
        }
    }

    pub fn from_config(browser: Arc<dyn Browser>, base_url: Url, config: &ScraperConfig) -> Self {
        Self::new(browser, base_url, config.item_timeout(), config.item_settle())
    }

    /// Produces the reel behind `link`, or None if it could not be extracted
    pub async fn extract(&self, link: &ReelLink) -> Option<Reel> {
        match self.try_extract(link).await {
            Ok(reel) => {
                tracing::debug!("Extracted reel {}", reel.id);
                Some(reel)
            }
            Err(ExtractError::MissingVideoUrl { url }) => {
                tracing::warn!("Discarding {}: no video URL", url);
                None
            }
            Err(ExtractError::Page(e)) if e.is_timeout() => {
                tracing::warn!("Reel {} timed out: {}", link, e);
                None
            }
            Err(ExtractError::Page(e)) => {
                tracing::error!("Failed to extract reel {}: {}", link, e);
                None
            }
        }
    }

    async fn try_extract(&self, link: &ReelLink) -> Result<Reel, ExtractError> {
        let url = resolve_reel_url(&self.base_url, link.href()).map_err(ScrapeError::from)?;

        let page = self.browser.new_page().await?;
        let loaded = self.load(page.as_ref(), url.as_str()).await;
        close_page(page.as_ref()).await;
        let content = loaded?;

        parse_reel_page(&content)
            .into_reel(link, url.as_str())
            .ok_or_else(|| ExtractError::MissingVideoUrl {
                url: url.to_string(),
            })
    }

    async fn load(&self, page: &dyn BrowserPage, url: &str) -> Result<String, ScrapeError> {
        page.goto(url, self.item_timeout).await?;
        if !self.item_settle.is_zero() {
            tokio::time::sleep(self.item_settle).await;
        }
        page.content().await
    }
}
