//! Profile access gate
//!
//! Loads a profile's listing view and decides whether it can be scraped.

use crate::browser::{Browser, BrowserPage};
use crate::config::Config;
use crate::crawler::close_page;
use crate::crawler::parser::{count_reel_anchors, detect_profile_signals};
use crate::url::ProfileUrls;
use crate::ScrapeError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Opens profile listing views
#[derive(Debug, Clone)]
pub struct AccessGate {
    profile_timeout: Duration,
    artifact_dir: Option<PathBuf>,
}

impl AccessGate {
    pub fn new(profile_timeout: Duration, artifact_dir: Option<PathBuf>) -> Self {
        Self {
            profile_timeout,
            artifact_dir,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.scraper.profile_timeout(),
            config.diagnostics.artifact_dir.clone(),
        )
    }

    /// Loads the listing view for `username` and hands back the open page
    ///
    /// The reels tab is tried first; only a timeout there falls back to the
    /// profile root. The page is closed before any error is returned.
    ///
    /// # Returns
    ///
    /// * `Ok(page)` - The listing view, loaded and accessible
    /// * `Err(ScrapeError::ProfileNotAccessible)` - Missing or private profile
    /// * `Err(_)` - Navigation or driver failure
    pub async fn open(
        &self,
        browser: &dyn Browser,
        username: &str,
        urls: &ProfileUrls,
    ) -> Result<Box<dyn BrowserPage>, ScrapeError> {
        let page = browser.new_page().await?;

        match self.load(page.as_ref(), username, urls).await {
            Ok(()) => Ok(page),
            Err(e) => {
                close_page(page.as_ref()).await;
                Err(e)
            }
        }
    }

    async fn load(
        &self,
        page: &dyn BrowserPage,
        username: &str,
        urls: &ProfileUrls,
    ) -> Result<(), ScrapeError> {
        tracing::info!("Loading profile {} ({})", username, urls.reels);

        match page.goto(urls.reels.as_str(), self.profile_timeout).await {
            Ok(()) => {}
            Err(e) if e.is_timeout() => {
                tracing::warn!(
                    "Reels view for {} timed out, falling back to {}",
                    username,
                    urls.root
                );
                page.goto(urls.root.as_str(), self.profile_timeout).await?;
            }
            Err(e) => return Err(e),
        }

        let content = page.content().await?;

        if let Some(dir) = &self.artifact_dir {
            save_artifacts(page, dir, username, &content).await;
        }

        tracing::info!(
            "Profile {}: {} reel anchors on first load",
            username,
            count_reel_anchors(&content)
        );

        let signals = detect_profile_signals(&content);
        if signals.login_wall {
            tracing::warn!("Login wall shown for {}; the saved session may have expired", username);
        }
        if !signals.is_accessible() {
            tracing::warn!(
                "Profile {} not accessible (not available: {}, private: {})",
                username,
                signals.not_available,
                signals.private
            );
            return Err(ScrapeError::ProfileNotAccessible {
                username: username.to_string(),
            });
        }

        Ok(())
    }
}

/// Writes `debug_{username}.html` and `.png`; failures are only logged
async fn save_artifacts(page: &dyn BrowserPage, dir: &Path, username: &str, content: &str) {
    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        tracing::warn!("Cannot create artifact directory {}: {}", dir.display(), e);
        return;
    }

    let html_path = dir.join(format!("debug_{}.html", username));
    if let Err(e) = tokio::fs::write(&html_path, content).await {
        tracing::warn!("Failed to write {}: {}", html_path.display(), e);
    }

    let png_path = dir.join(format!("debug_{}.png", username));
    match page.screenshot().await {
        Ok(Some(png)) => {
            if let Err(e) = tokio::fs::write(&png_path, png).await {
                tracing::warn!("Failed to write {}: {}", png_path.display(), e);
            }
        }
        Ok(None) => tracing::debug!("Driver cannot take screenshots, skipping {}", png_path.display()),
        Err(e) => tracing::warn!("Screenshot for {} failed: {}", username, e),
    }
}
