use crate::config::types::{CacheConfig, Config, ScraperConfig, SessionConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_cache_config(&config.cache)?;
    validate_session_config(&config.session)?;
    Ok(())
}

/// Validates scraper configuration
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;
    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must be http or https, got {}",
            base.scheme()
        )));
    }

    if config.max_concurrent_pages < 1 || config.max_concurrent_pages > 32 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-pages must be between 1 and 32, got {}",
            config.max_concurrent_pages
        )));
    }

    if config.max_scrolls < 1 || config.max_scrolls > 100 {
        return Err(ConfigError::Validation(format!(
            "max-scrolls must be between 1 and 100, got {}",
            config.max_scrolls
        )));
    }

    if config.default_limit < 1 || config.default_limit > 1000 {
        return Err(ConfigError::Validation(format!(
            "default-limit must be between 1 and 1000, got {}",
            config.default_limit
        )));
    }

    for (name, value) in [
        ("listing-wait-ms", config.listing_wait_ms),
        ("profile-timeout-ms", config.profile_timeout_ms),
        ("item-timeout-ms", config.item_timeout_ms),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{} must be > 0", name)));
        }
    }

    if config.scrape_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "scrape-timeout-secs must be > 0 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates cache configuration
fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.ttl_seconds < 1 {
        return Err(ConfigError::Validation(
            "ttl-seconds must be >= 1".to_string(),
        ));
    }

    if config.max_entries < 1 {
        return Err(ConfigError::Validation(
            "max-entries must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates session configuration
///
/// The storage-state file itself is checked when the browser starts.
fn validate_session_config(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}
