//! HTTP page driver
//!
//! This driver fetches pages with a plain HTTP client. Nothing is executed, so
//! it only sees server-rendered markup: scrolling is a no-op and selectors are
//! matched against the fetched document. It handles:
//! - Building HTTP clients with the configured user agent and saved cookies
//! - Per-request timeouts
//! - Error classification (timeout vs. other failures)

use crate::browser::{Browser, BrowserPage, StorageState};
use crate::config::Config;
use crate::url::parse_base_url;
use crate::ScrapeError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, COOKIE};
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::Mutex;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent string to send
/// * `cookie_header` - Saved session cookies for the target site, if any
///
/// # Example
///
/// ```no_run
/// use reel_scope::browser::build_http_client;
///
/// let client = build_http_client("Mozilla/5.0", None).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &str,
    cookie_header: Option<&str>,
) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    if let Some(cookies) = cookie_header.and_then(|c| HeaderValue::from_str(c).ok()) {
        headers.insert(COOKIE, cookies);
    }

    Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Browser backed by an HTTP client
pub struct HttpBrowser {
    client: Client,
}

impl HttpBrowser {
    pub fn new(config: &Config, session: Option<&StorageState>) -> Result<Self, ScrapeError> {
        let base = parse_base_url(&config.scraper.base_url)?;
        let cookie_header = session
            .zip(base.host_str())
            .and_then(|(state, host)| state.cookie_header(host));

        let client = build_http_client(&config.session.user_agent, cookie_header.as_deref())?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, ScrapeError> {
        Ok(Box::new(HttpPage {
            client: self.client.clone(),
            document: Mutex::new(None),
        }))
    }
}

/// A "page" holding the last fetched document
struct HttpPage {
    client: Client,
    document: Mutex<Option<String>>,
}

impl HttpPage {
    fn document(&self) -> Result<String, ScrapeError> {
        self.document
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| ScrapeError::Browser("no document loaded".to_string()))
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> ScrapeError {
    if error.is_timeout() {
        ScrapeError::Timeout {
            url: url.to_string(),
        }
    } else {
        ScrapeError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

#[async_trait]
impl BrowserPage for HttpPage {
    /// Fetches the document
    ///
    /// Client errors (4xx) still load their body, the way a browser renders a
    /// "not found" page. Server errors (5xx) fail the navigation.
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), ScrapeError> {
        tracing::debug!("{}: requesting", url);

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(ScrapeError::Navigation {
                url: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }
        if !status.is_success() {
            tracing::debug!("{}: HTTP {}", url, status.as_u16());
        }

        let body = response.text().await.map_err(|e| classify_error(url, e))?;
        *self.document.lock().unwrap_or_else(|e| e.into_inner()) = Some(body);
        Ok(())
    }

    async fn content(&self) -> Result<String, ScrapeError> {
        self.document()
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<bool, ScrapeError> {
        let selector = Selector::parse(selector)
            .map_err(|e| ScrapeError::Browser(format!("bad selector {}: {:?}", selector, e)))?;
        let document = Html::parse_document(&self.document()?);
        let found = document.select(&selector).next().is_some();
        Ok(found)
    }

    async fn scroll_to_end(&self) -> Result<(), ScrapeError> {
        Ok(())
    }

    async fn screenshot(&self) -> Result<Option<Vec<u8>>, ScrapeError> {
        Ok(None)
    }

    async fn close(&self) -> Result<(), ScrapeError> {
        self.document.lock().unwrap_or_else(|e| e.into_inner()).take();
        Ok(())
    }
}
