//! State module for tracking discovery progress
//!
//! This module provides the pure state used while paginating a listing page.
//!
//! # Components
//!
//! - `DiscoveryState`: Where the scroll loop stands (iterating, target reached, converged, capped)
//! - `LinkSet`: The unique reel links accumulated across polls

mod discovery_state;
mod link_set;

// Re-export main types
pub use discovery_state::{DiscoveryPolicy, DiscoveryState};
pub use link_set::LinkSet;
