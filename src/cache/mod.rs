//! Result cache module
//!
//! This module provides the in-memory cache that stores complete profile
//! scrapes keyed by username and requested limit. Entries expire after a
//! time-to-live and the cache holds a bounded number of entries.

mod clock;
mod ttl;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ttl::{CachedScrape, TtlCache};

use crate::model::ProfileScrape;
use std::fmt;

/// Composite cache key
///
/// Different limits for the same username are distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub username: String,
    pub limit: u32,
}

impl CacheKey {
    pub fn new(username: impl Into<String>, limit: u32) -> Self {
        Self {
            username: username.into(),
            limit,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.username, self.limit)
    }
}

/// Cache capability consumed by the scraper
pub trait ScrapeCache: Send + Sync {
    /// Returns the stored result unless it is missing or expired
    fn get(&self, key: &CacheKey) -> Option<ProfileScrape>;

    /// Stores a result, evicting as needed to stay within capacity
    fn set(&self, key: CacheKey, value: ProfileScrape);

    /// Drops every expired entry, returning how many were removed
    fn evict_expired(&self) -> usize;

    /// Number of entries currently held (expired ones included until evicted)
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        assert_eq!(CacheKey::new("alice", 20).to_string(), "alice:20");
    }

    #[test]
    fn test_keys_differ_by_limit() {
        assert_ne!(CacheKey::new("alice", 10), CacheKey::new("alice", 20));
    }
}
