//! Configuration module for Reel-Scope
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing keys fall back to defaults.
//!
//! # Example
//!
//! ```no_run
//! use reel_scope::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("reel-scope.toml")).unwrap();
//! println!("Up to {} reel pages open at once", config.scraper.max_concurrent_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CacheConfig, Config, DiagnosticsConfig, DriverKind, ScraperConfig, SessionConfig,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, apply_overrides_from, compute_config_hash, load_config,
    load_config_with_hash, parse_config,
};
pub use validation::validate;
