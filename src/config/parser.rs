use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Environment overrides (`MAX_CONCURRENT_PAGES`, `BROWSER_HEADLESS`,
/// `CACHE_TTL_SECONDS`) are applied after parsing and before validation.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    let mut config = parse_config(&content)?;
    apply_env_overrides(&mut config)?;

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}

/// Parses TOML text into a configuration without validating it
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Applies overrides from the process environment
pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
    apply_overrides_from(config, |name| std::env::var(name).ok())
}

/// Applies overrides from an arbitrary variable lookup
///
/// Unset variables leave the configuration untouched; set but unparseable
/// values are rejected.
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("MAX_CONCURRENT_PAGES") {
        config.scraper.max_concurrent_pages =
            value.trim().parse().map_err(|_| ConfigError::InvalidOverride {
                name: "MAX_CONCURRENT_PAGES".to_string(),
                value: value.clone(),
            })?;
    }

    if let Some(value) = lookup("BROWSER_HEADLESS") {
        config.scraper.headless = match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => {
                return Err(ConfigError::InvalidOverride {
                    name: "BROWSER_HEADLESS".to_string(),
                    value,
                })
            }
        };
    }

    if let Some(value) = lookup("CACHE_TTL_SECONDS") {
        config.cache.ttl_seconds =
            value.trim().parse().map_err(|_| ConfigError::InvalidOverride {
                name: "CACHE_TTL_SECONDS".to_string(),
                value: value.clone(),
            })?;
    }

    Ok(())
}

/// Computes a SHA-256 hash of the configuration file content
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
