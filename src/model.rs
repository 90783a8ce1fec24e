//! Data model for scraped reels and profile results

use chrono::{DateTime, FixedOffset, Utc};
use crate::url::canonical_reel_path;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// One reel with whatever metadata could be extracted
///
/// Every field besides `id` and `reel_url` is optional; partial data is valid.
/// The extractor never builds a `Reel` without a `video_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reel {
    pub id: String,
    pub reel_url: String,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub caption: Option<String>,
    pub posted_at: Option<DateTime<FixedOffset>>,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
}

/// The envelope returned for one completed profile scrape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileScrape {
    pub username: String,
    pub scraped_at: DateTime<Utc>,
    pub count: usize,
    pub reels: Vec<Reel>,
}

impl ProfileScrape {
    /// Wraps extracted reels, stamping the scrape time
    pub fn new(username: impl Into<String>, scraped_at: DateTime<Utc>, reels: Vec<Reel>) -> Self {
        Self {
            username: username.into(),
            scraped_at,
            count: reels.len(),
            reels,
        }
    }
}

/// A reel reference as found on the listing page (e.g. `/reel/C1a2b3/`)
///
/// Equality, hashing and ordering use the canonical reel path, so
/// `/reel/A`, `/reel/A/` and `/reel/A/?igsh=x` are the same link.
#[derive(Debug, Clone)]
pub struct ReelLink {
    href: String,
    path: String,
}

impl ReelLink {
    pub fn new(href: impl Into<String>) -> Self {
        let href = href.into();
        let path = canonical_reel_path(&href);
        Self { href, path }
    }

    /// The href exactly as it appeared on the page
    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The reel identifier: the last non-empty path segment
    pub fn id(&self) -> String {
        self.path
            .trim_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

impl PartialEq for ReelLink {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for ReelLink {}

impl Hash for ReelLink {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl PartialOrd for ReelLink {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReelLink {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}

impl fmt::Display for ReelLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href)
    }
}
