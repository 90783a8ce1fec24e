//! Time-bounded, size-bounded cache implementation
//!
//! Entries expire after the configured TTL and the least recently used entry
//! is evicted once the entry limit is exceeded.

use crate::cache::{CacheKey, Clock, ScrapeCache, SystemClock};
use crate::config::CacheConfig;
use crate::model::ProfileScrape;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// A cached scrape result
///
/// This structure stores the result along with the time it was stored,
/// allowing expiration checks against any clock.
#[derive(Debug, Clone)]
pub struct CachedScrape {
    /// The cached result
    pub value: ProfileScrape,

    /// When the result was stored
    pub stored_at: DateTime<Utc>,

    /// Recency stamp for LRU eviction
    last_used: u64,
}

impl CachedScrape {
    fn new(value: ProfileScrape, stored_at: DateTime<Utc>, last_used: u64) -> Self {
        Self {
            value,
            stored_at,
            last_used,
        }
    }

    /// Checks if the entry is older than `ttl` at `now`
    pub fn is_stale(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) >= ttl
    }

    /// Returns how long ago the entry was stored
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.stored_at
    }
}

struct Entries {
    map: HashMap<CacheKey, CachedScrape>,
    tick: u64,
}

impl Entries {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

/// In-memory cache of profile scrapes
pub struct TtlCache<C: Clock = SystemClock> {
    ttl: Duration,
    max_entries: usize,
    clock: C,
    entries: Mutex<Entries>,
}

impl TtlCache<SystemClock> {
    /// Creates a cache driven by wall-clock time
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self::with_clock(ttl, max_entries, SystemClock)
    }

    /// Creates a cache sized from configuration
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::seconds(config.ttl_seconds as i64), config.max_entries)
    }
}

impl<C: Clock> TtlCache<C> {
    /// Creates a cache with an explicit clock
    pub fn with_clock(ttl: Duration, max_entries: usize, clock: C) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            clock,
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                tick: 0,
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn evict_lru(entries: &mut Entries) {
        let oldest = entries
            .map
            .iter()
            .min_by_key(|(_, cached)| cached.last_used)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            tracing::debug!("Evicting least recently used cache entry {}", key);
            entries.map.remove(&key);
        }
    }
}

impl<C: Clock> ScrapeCache for TtlCache<C> {
    fn get(&self, key: &CacheKey) -> Option<ProfileScrape> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let stale = entries.map.get(key)?.is_stale(self.ttl, now);
        if stale {
            entries.map.remove(key);
            return None;
        }

        let tick = entries.next_tick();
        let cached = entries.map.get_mut(key)?;
        cached.last_used = tick;
        Some(cached.value.clone())
    }

    fn set(&self, key: CacheKey, value: ProfileScrape) {
        let now = self.clock.now();
        let ttl = self.ttl;
        let mut entries = self.lock();

        let tick = entries.next_tick();
        entries.map.insert(key, CachedScrape::new(value, now, tick));

        if entries.map.len() > self.max_entries {
            entries.map.retain(|_, cached| !cached.is_stale(ttl, now));
        }
        while entries.map.len() > self.max_entries {
            Self::evict_lru(&mut entries);
        }
    }

    fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let ttl = self.ttl;
        let mut entries = self.lock();

        let before = entries.map.len();
        entries.map.retain(|_, cached| !cached.is_stale(ttl, now));
        before - entries.map.len()
    }

    fn len(&self) -> usize {
        self.lock().map.len()
    }
}
