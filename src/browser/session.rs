//! Saved login session
//!
//! Reads the browser storage-state file written after an interactive login
//! (`{"cookies": [...], "origins": [...]}`) so both drivers can reuse it.

use crate::ScrapeError;
use serde::Deserialize;
use std::path::Path;

/// The parts of a saved storage state that the drivers use
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageState {
    #[serde(default)]
    pub cookies: Vec<StoredCookie>,
}

/// One saved cookie
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// Seconds since the epoch, negative for session cookies
    #[serde(default)]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
}

fn default_path() -> String {
    "/".to_string()
}

impl StorageState {
    /// Loads a storage-state file
    ///
    /// # Returns
    ///
    /// * `Ok(StorageState)` - Parsed session
    /// * `Err(ScrapeError::Session)` - File missing, unreadable or malformed
    pub fn load(path: &Path) -> Result<Self, ScrapeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScrapeError::Session(format!("cannot read {}: {}", path.display(), e))
        })?;
        let state = Self::parse(&content).map_err(|e| {
            ScrapeError::Session(format!("cannot parse {}: {}", path.display(), e))
        })?;

        tracing::info!(
            "Loaded saved session from {} ({} cookies)",
            path.display(),
            state.cookies.len()
        );
        Ok(state)
    }

    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Cookies that apply to `host`
    pub fn cookies_for<'a>(&'a self, host: &'a str) -> impl Iterator<Item = &'a StoredCookie> {
        self.cookies.iter().filter(move |c| c.matches_host(host))
    }

    /// `Cookie` request header value for `host`, if any cookie applies
    pub fn cookie_header(&self, host: &str) -> Option<String> {
        let pairs: Vec<String> = self
            .cookies_for(host)
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();

        (!pairs.is_empty()).then(|| pairs.join("; "))
    }
}

impl StoredCookie {
    /// Domain matching per cookie rules (leading dot means subdomains too)
    pub fn matches_host(&self, host: &str) -> bool {
        let domain = self.domain.trim_start_matches('.').to_lowercase();
        let host = host.to_lowercase();
        host == domain || host.ends_with(&format!(".{}", domain))
    }

    /// Whether the cookie outlives the browser session
    pub fn persistent_expiry(&self) -> Option<f64> {
        self.expires.filter(|e| *e > 0.0)
    }
}
