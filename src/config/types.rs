use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// User agent presented by both page drivers
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36";

/// Main configuration structure for Reel-Scope
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub cache: CacheConfig,
    pub session: SessionConfig,
    pub diagnostics: DiagnosticsConfig,
}

/// Which page driver renders profile and reel pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// Headless Chrome over the DevTools protocol
    Chrome,
    /// Plain HTTP fetches, no JavaScript
    Http,
}

/// Scrape pipeline behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScraperConfig {
    /// Site root that profile and reel paths are joined onto
    pub base_url: String,

    pub driver: DriverKind,

    /// Run Chrome without a window
    pub headless: bool,

    /// Maximum number of reel pages open at the same time
    pub max_concurrent_pages: usize,

    /// Maximum number of listing polls (each followed by a scroll)
    pub max_scrolls: u32,

    /// Pause after each scroll before polling again (milliseconds)
    pub scroll_settle_ms: u64,

    /// Pause after a reel page loads before reading it (milliseconds)
    pub item_settle_ms: u64,

    /// How long to wait for the listing container to render (milliseconds)
    pub listing_wait_ms: u64,

    /// Navigation timeout for the profile page (milliseconds)
    pub profile_timeout_ms: u64,

    /// Navigation timeout for a single reel page (milliseconds)
    pub item_timeout_ms: u64,

    /// Limit used when a request gives none (or zero)
    pub default_limit: u32,

    /// Overall deadline for one scrape, unset means no deadline
    pub scrape_timeout_secs: Option<u64>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.instagram.com".to_string(),
            driver: DriverKind::Chrome,
            headless: true,
            max_concurrent_pages: 6,
            max_scrolls: 10,
            scroll_settle_ms: 2500,
            item_settle_ms: 1000,
            listing_wait_ms: 20_000,
            profile_timeout_ms: 30_000,
            item_timeout_ms: 15_000,
            default_limit: 20,
            scrape_timeout_secs: None,
        }
    }
}

impl ScraperConfig {
    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn item_settle(&self) -> Duration {
        Duration::from_millis(self.item_settle_ms)
    }

    pub fn listing_wait(&self) -> Duration {
        Duration::from_millis(self.listing_wait_ms)
    }

    pub fn profile_timeout(&self) -> Duration {
        Duration::from_millis(self.profile_timeout_ms)
    }

    pub fn item_timeout(&self) -> Duration {
        Duration::from_millis(self.item_timeout_ms)
    }

    /// Resolves a requested limit, treating absent and zero alike
    pub fn effective_limit(&self, requested: Option<u32>) -> u32 {
        match requested {
            Some(limit) if limit > 0 => limit,
            _ => self.default_limit,
        }
    }
}

/// Result cache sizing
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheConfig {
    /// Seconds a cached result stays valid
    pub ttl_seconds: u64,

    /// Entries kept before the least recently used is evicted
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 300,
            max_entries: 256,
        }
    }
}

/// Browser identity and saved login session
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SessionConfig {
    /// Saved browser storage state (cookies) from a prior login
    pub storage_state: Option<PathBuf>,

    pub user_agent: String,

    /// Chrome executable, falls back to `CHROME_PATH` and then auto-detection
    pub chrome_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_state: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chrome_path: None,
        }
    }
}

/// Offline debugging output
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DiagnosticsConfig {
    /// Where profile page snapshots are written, unset disables them
    pub artifact_dir: Option<PathBuf>,
}
