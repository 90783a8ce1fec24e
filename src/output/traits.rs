//! Output formatter traits and types
//!
//! This module defines the trait interface for report formatters and the
//! report collected over one CLI run.

use crate::model::ProfileScrape;
use crate::ScrapeError;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A username that could not be scraped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeFailure {
    pub username: String,

    /// Status class of the failure (404, 400 or 500)
    pub status: u16,

    /// Caller-safe message; internal details stay in the logs
    pub message: String,
}

/// Everything one run produced, in request order
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScrapeReport {
    pub results: Vec<ProfileScrape>,
    pub failures: Vec<ScrapeFailure>,
}

impl ScrapeReport {
    /// Creates a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, scrape: ProfileScrape) {
        self.results.push(scrape);
    }

    pub fn record_failure(&mut self, username: &str, error: &ScrapeError) {
        self.failures.push(ScrapeFailure {
            username: username.to_string(),
            status: error.status_code(),
            message: error.public_message(),
        });
    }

    /// Returns the number of reels across all results
    pub fn total_reels(&self) -> usize {
        self.results.iter().map(|r| r.count).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Trait for report formatters
///
/// Formatters turn a finished report into text; writing it out is the
/// caller's concern.
pub trait ReportFormatter {
    /// Renders the report
    ///
    /// # Arguments
    ///
    /// * `report` - The results and failures of a run
    fn render(&self, report: &ScrapeReport) -> OutputResult<String>;
}
