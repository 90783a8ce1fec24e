//! Reel link discovery on a loaded listing view
//!
//! Polls the page content, merges new reel links, and scrolls until the
//! discovery state machine reaches a terminal state.

use crate::browser::BrowserPage;
use crate::config::ScraperConfig;
use crate::crawler::parser::{extract_reel_hrefs, LISTING_CONTAINER_SELECTOR};
use crate::model::ReelLink;
use crate::state::{DiscoveryPolicy, DiscoveryState, LinkSet};
use crate::ScrapeError;
use std::time::Duration;

/// Result of one discovery run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOutcome {
    /// Unique links, first-seen order, at most the target count
    pub links: Vec<ReelLink>,

    /// Final state of the scroll loop; None when the listing never rendered
    pub state: Option<DiscoveryState>,
}

impl DiscoveryOutcome {
    fn empty(state: Option<DiscoveryState>) -> Self {
        Self {
            links: Vec::new(),
            state,
        }
    }
}

/// Drives the scroll loop on a listing page
#[derive(Debug, Clone)]
pub struct LinkDiscoverer {
    max_scrolls: u32,
    scroll_settle: Duration,
    listing_wait: Duration,
}

impl LinkDiscoverer {
    pub fn new(max_scrolls: u32, scroll_settle: Duration, listing_wait: Duration) -> Self {
        Self {
            max_scrolls,
            scroll_settle,
            listing_wait,
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(
            config.max_scrolls,
            config.scroll_settle(),
            config.listing_wait(),
        )
    }

    /// Collects up to `target` unique reel links from `page`
    ///
    /// # Returns
    ///
    /// * `Ok(outcome)` - Possibly empty; a listing that never renders is not an error
    /// * `Err(_)` - The driver failed while reading or scrolling the page
    pub async fn discover(
        &self,
        page: &dyn BrowserPage,
        target: usize,
    ) -> Result<DiscoveryOutcome, ScrapeError> {
        let policy = DiscoveryPolicy {
            target,
            max_polls: self.max_scrolls,
        };
        let mut state = DiscoveryState::start(&policy);
        if state.is_terminal() {
            return Ok(DiscoveryOutcome::empty(Some(state)));
        }

        if !page
            .wait_for_selector(LISTING_CONTAINER_SELECTOR, self.listing_wait)
            .await?
        {
            tracing::warn!(
                "Listing container did not appear within {:?}",
                self.listing_wait
            );
            return Ok(DiscoveryOutcome::empty(None));
        }

        let mut links = LinkSet::new();
        while !state.is_terminal() {
            let content = page.content().await?;
            let added = links.extend(extract_reel_hrefs(&content).into_iter().map(ReelLink::new));
            state = state.observe(links.len(), &policy);

            tracing::debug!(
                "Poll {}: {} new, {} total ({})",
                state.polls(),
                added,
                links.len(),
                state.as_str()
            );

            if !state.is_terminal() {
                page.scroll_to_end().await?;
                if !self.scroll_settle.is_zero() {
                    tokio::time::sleep(self.scroll_settle).await;
                }
            }
        }

        tracing::info!("Discovered {} reel links, {}", links.len(), state);

        Ok(DiscoveryOutcome {
            links: links.into_truncated(target),
            state: Some(state),
        })
    }
}
