//! Headless Chrome page driver
//!
//! headless_chrome is synchronous, so every call runs on the blocking pool.
//! Each page is its own tab in one shared browser process.

use crate::browser::{Browser, BrowserPage, StorageState};
use crate::config::Config;
use crate::url::parse_base_url;
use crate::ScrapeError;
use async_trait::async_trait;
use headless_chrome::protocol::cdp::{Network::CookieParam, Page::CaptureScreenshotFormatOption};
use headless_chrome::{LaunchOptionsBuilder, Tab};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Extra time granted to a blocking call on top of its own timeout
const BLOCKING_GRACE: Duration = Duration::from_secs(5);

/// Browser backed by a Chrome process
pub struct ChromeBrowser {
    browser: Arc<headless_chrome::Browser>,
    user_agent: String,
    cookies: Vec<CookieParam>,
}

impl ChromeBrowser {
    /// Starts Chrome
    ///
    /// Blocks while the process launches; call from a blocking context.
    pub fn launch(config: &Config, session: Option<StorageState>) -> Result<Self, ScrapeError> {
        let chrome_path = config
            .session
            .chrome_path
            .clone()
            .or_else(|| std::env::var("CHROME_PATH").ok().map(PathBuf::from));

        let options = LaunchOptionsBuilder::default()
            .headless(config.scraper.headless)
            .sandbox(false)
            .window_size(Some((1280, 900)))
            .idle_browser_timeout(Duration::from_secs(600))
            .path(chrome_path)
            .build()
            .map_err(|e| ScrapeError::Browser(format!("invalid launch options: {}", e)))?;

        let browser = headless_chrome::Browser::new(options)
            .map_err(|e| ScrapeError::Browser(format!("could not launch chromium: {}", e)))?;

        let base = parse_base_url(&config.scraper.base_url)?;
        let host = base.host_str().unwrap_or_default().to_string();
        let cookies = session
            .map(|state| cookie_params(&state, &host))
            .unwrap_or_default();

        Ok(Self {
            browser: Arc::new(browser),
            user_agent: config.session.user_agent.clone(),
            cookies,
        })
    }
}

/// Converts saved cookies for `host` into DevTools cookie parameters
fn cookie_params(state: &StorageState, host: &str) -> Vec<CookieParam> {
    state
        .cookies_for(host)
        .filter_map(|cookie| {
            let mut param = serde_json::json!({
                "name": cookie.name,
                "value": cookie.value,
                "domain": cookie.domain,
                "path": cookie.path,
                "secure": cookie.secure,
                "httpOnly": cookie.http_only,
            });
            if let Some(expires) = cookie.persistent_expiry() {
                param["expires"] = serde_json::json!(expires);
            }

            match serde_json::from_value::<CookieParam>(param) {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!("Skipping saved cookie {}: {}", cookie.name, e);
                    None
                }
            }
        })
        .collect()
}

fn browser_error(context: &str, error: impl std::fmt::Display) -> ScrapeError {
    ScrapeError::Browser(format!("{}: {}", context, error))
}

fn looks_like_timeout(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("timeout") || message.contains("timed out") || message.contains("never came")
}

/// Runs a headless_chrome call on the blocking pool
async fn blocking<T, F>(f: F) -> Result<T, ScrapeError>
where
    F: FnOnce() -> Result<T, ScrapeError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ScrapeError::Worker(e.to_string()))?
}

#[async_trait]
impl Browser for ChromeBrowser {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, ScrapeError> {
        let browser = Arc::clone(&self.browser);
        let user_agent = self.user_agent.clone();
        let cookies = self.cookies.clone();

        let tab = blocking(move || {
            let tab = browser.new_tab().map_err(|e| browser_error("new tab", e))?;
            tab.set_user_agent(&user_agent, Some("en-US,en"), None)
                .map_err(|e| browser_error("set user agent", e))?;
            if !cookies.is_empty() {
                tab.set_cookies(cookies)
                    .map_err(|e| browser_error("set cookies", e))?;
            }
            Ok(tab)
        })
        .await?;

        Ok(Box::new(ChromePage { tab }))
    }
}

/// One Chrome tab
struct ChromePage {
    tab: Arc<Tab>,
}

#[async_trait]
impl BrowserPage for ChromePage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), ScrapeError> {
        let tab = Arc::clone(&self.tab);
        let target = url.to_string();

        let navigation = blocking(move || {
            tab.set_default_timeout(timeout);
            tab.navigate_to(&target)
                .and_then(|t| t.wait_until_navigated())
                .map(|_| ())
                .map_err(|e| {
                    let message = e.to_string();
                    if looks_like_timeout(&message) {
                        ScrapeError::Timeout { url: target.clone() }
                    } else {
                        ScrapeError::Navigation {
                            url: target.clone(),
                            message,
                        }
                    }
                })
        });

        match tokio::time::timeout(timeout + BLOCKING_GRACE, navigation).await {
            Ok(result) => result,
            Err(_) => Err(ScrapeError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    async fn content(&self) -> Result<String, ScrapeError> {
        let tab = Arc::clone(&self.tab);
        blocking(move || tab.get_content().map_err(|e| browser_error("read content", e))).await
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, ScrapeError> {
        let tab = Arc::clone(&self.tab);
        let selector = selector.to_string();
        blocking(move || {
            Ok(tab
                .wait_for_element_with_custom_timeout(&selector, timeout)
                .is_ok())
        })
        .await
    }

    async fn scroll_to_end(&self) -> Result<(), ScrapeError> {
        let tab = Arc::clone(&self.tab);
        blocking(move || {
            tab.evaluate("window.scrollTo(0, document.body.scrollHeight)", false)
                .map(|_| ())
                .map_err(|e| browser_error("scroll", e))
        })
        .await
    }

    async fn screenshot(&self) -> Result<Option<Vec<u8>>, ScrapeError> {
        let tab = Arc::clone(&self.tab);
        blocking(move || {
            // Clip to the whole document so content below the fold is included
            let clip = match tab.find_element("body").and_then(|body| body.get_box_model()) {
                Ok(model) => Some(model.margin_viewport()),
                Err(e) => {
                    tracing::debug!("Document size unavailable, capturing viewport: {}", e);
                    None
                }
            };
            tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, clip, true)
                .map(Some)
                .map_err(|e| browser_error("screenshot", e))
        })
        .await
    }

    async fn close(&self) -> Result<(), ScrapeError> {
        let tab = Arc::clone(&self.tab);
        blocking(move || {
            tab.close(true)
                .map(|_| ())
                .map_err(|e| browser_error("close tab", e))
        })
        .await
    }
}
