//! Page drivers
//!
//! The scraper never talks to a browser directly; it drives pages through the
//! [`Browser`] and [`BrowserPage`] traits. Three drivers exist:
//! - `ChromeBrowser`: headless Chrome (feature `headless`)
//! - `HttpBrowser`: plain HTTP fetches for server-rendered pages
//! - `ScriptedBrowser`: canned pages served from memory (tests and the
//!   `test-support` feature only)

#[cfg(feature = "headless")]
mod chrome;
mod http;
#[cfg(any(test, feature = "test-support"))]
mod scripted;
mod session;

#[cfg(feature = "headless")]
pub use chrome::ChromeBrowser;
pub use http::{build_http_client, HttpBrowser};
#[cfg(any(test, feature = "test-support"))]
pub use scripted::{DriverStats, PageScript, ScriptedBrowser};
pub use session::{StorageState, StoredCookie};

use crate::config::{Config, DriverKind};
use crate::ScrapeError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A browsing context that can open independent pages
///
/// Implementations are shared read-only between concurrent extractions.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Opens a new, empty page owned by the caller
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, ScrapeError>;
}

/// One open page (a tab)
///
/// The owner must call [`BrowserPage::close`] on every exit path.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigates and waits for the document to load
    ///
    /// Fails with [`ScrapeError::Timeout`] when `timeout` elapses.
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), ScrapeError>;

    /// Current document markup
    async fn content(&self) -> Result<String, ScrapeError>;

    /// Waits until `selector` matches, returning false if it never does
    async fn wait_for_selector(&self, selector: &str, timeout: Duration)
        -> Result<bool, ScrapeError>;

    /// Scrolls to the bottom so lazily loaded content is requested
    async fn scroll_to_end(&self) -> Result<(), ScrapeError>;

    /// Full-page PNG, if the driver can render one
    async fn screenshot(&self) -> Result<Option<Vec<u8>>, ScrapeError>;

    async fn close(&self) -> Result<(), ScrapeError>;
}

/// Starts the driver selected in the configuration
///
/// A configured storage-state file is loaded here; a missing or unreadable
/// file fails with [`ScrapeError::Session`].
pub async fn launch(config: &Config) -> Result<Arc<dyn Browser>, ScrapeError> {
    let session = match &config.session.storage_state {
        Some(path) => Some(StorageState::load(path)?),
        None => None,
    };

    match config.scraper.driver {
        DriverKind::Http => {
            tracing::info!("Using HTTP page driver");
            Ok(Arc::new(HttpBrowser::new(config, session.as_ref())?))
        }
        DriverKind::Chrome => launch_chrome(config, session).await,
    }
}

#[cfg(feature = "headless")]
async fn launch_chrome(
    config: &Config,
    session: Option<StorageState>,
) -> Result<Arc<dyn Browser>, ScrapeError> {
    tracing::info!(
        "Launching Chrome page driver (headless: {})",
        config.scraper.headless
    );
    let config = config.clone();
    let browser = tokio::task::spawn_blocking(move || ChromeBrowser::launch(&config, session))
        .await
        .map_err(|e| ScrapeError::Worker(e.to_string()))??;
    Ok(Arc::new(browser))
}

#[cfg(not(feature = "headless"))]
async fn launch_chrome(
    _config: &Config,
    _session: Option<StorageState>,
) -> Result<Arc<dyn Browser>, ScrapeError> {
    Err(ScrapeError::Browser(
        "built without the `headless` feature; use driver = \"http\"".to_string(),
    ))
}
