//! Insertion-ordered set of reel links

use crate::model::ReelLink;
use std::collections::HashSet;

/// Unique reel links accumulated across listing polls
///
/// Links keep the order in which they were first seen so truncation to the
/// requested limit is deterministic within a run.
#[derive(Debug, Clone, Default)]
pub struct LinkSet {
    order: Vec<ReelLink>,
    seen: HashSet<ReelLink>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges links, returning how many were new
    pub fn extend<I>(&mut self, links: I) -> usize
    where
        I: IntoIterator<Item = ReelLink>,
    {
        let before = self.order.len();
        for link in links {
            if self.seen.insert(link.clone()) {
                self.order.push(link);
            }
        }
        self.order.len() - before
    }

    pub fn contains(&self, link: &ReelLink) -> bool {
        self.seen.contains(link)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Consumes the set, keeping at most `limit` links in first-seen order
    pub fn into_truncated(mut self, limit: usize) -> Vec<ReelLink> {
        self.order.truncate(limit);
        self.order
    }
}
