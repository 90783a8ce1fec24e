//! Reel-Scope: a profile reel scraper
//!
//! This crate loads a profile's reel listing in a rendered page, discovers a
//! bounded set of reel links through incremental scrolling, and extracts
//! per-reel metadata concurrently, caching complete results in memory.

pub mod browser;
pub mod cache;
pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Reel-Scope operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Profile not accessible: {username}")]
    ProfileNotAccessible { username: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Scrape of {username} exceeded the {seconds}s deadline")]
    Deadline { username: String, seconds: u64 },

    #[error("Worker task failed: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The externally visible classes of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The profile does not exist or is private
    NotAccessible,
    /// The request itself was malformed
    InvalidInput,
    /// Anything else
    Internal,
}

impl ScrapeError {
    /// Classifies this error into one of the caller-facing kinds
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProfileNotAccessible { .. } => ErrorKind::NotAccessible,
            Self::InvalidInput(_) | Self::UrlError(UrlError::InvalidUsername(_)) => {
                ErrorKind::InvalidInput
            }
            _ => ErrorKind::Internal,
        }
    }

    /// HTTP status a boundary layer should answer with
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotAccessible => 404,
            ErrorKind::InvalidInput => 400,
            ErrorKind::Internal => 500,
        }
    }

    /// Message safe to show to callers
    ///
    /// Internal causes are logged, never exposed.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::NotAccessible => "User profile not found or is private.".to_string(),
            ErrorKind::InvalidInput => self.to_string(),
            ErrorKind::Internal => "An internal error occurred during scraping.".to_string(),
        }
    }

    /// Returns true if this error came from an expired navigation or request
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Http { source, .. } | Self::Reqwest(source) => source.is_timeout(),
            _ => false,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidOverride { name: String, value: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Invalid username: {0:?}")]
    InvalidUsername(String),

    #[error("Not a reel link: {0}")]
    NotAReel(String),
}

/// Result type alias for Reel-Scope operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use cache::{CacheKey, ScrapeCache, TtlCache};
pub use config::Config;
pub use crawler::{scrape_profile, Scraper};
pub use model::{ProfileScrape, Reel, ReelLink};
pub use state::{DiscoveryState, LinkSet};
