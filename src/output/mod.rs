//! Output module for rendering scrape results
//!
//! This module handles:
//! - Rendering results as JSON or as a markdown report
//! - Writing the rendered report to stdout or a file

mod json;
mod markdown;
mod traits;

pub use json::JsonFormatter;
pub use markdown::{format_markdown_report, MarkdownFormatter};
pub use traits::{OutputError, OutputResult, ReportFormatter, ScrapeFailure, ScrapeReport};

use clap::ValueEnum;
use std::io::Write;
use std::path::Path;

/// Report formats selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

impl OutputFormat {
    pub fn formatter(self) -> Box<dyn ReportFormatter> {
        match self {
            Self::Json => Box::new(JsonFormatter),
            Self::Markdown => Box::new(MarkdownFormatter),
        }
    }
}

/// Renders a report and writes it out
///
/// # Arguments
///
/// * `report` - The run's results and failures
/// * `format` - Output format
/// * `path` - Destination file; stdout when None
///
/// # Returns
///
/// * `Ok(())` - Report written
/// * `Err(OutputError)` - Rendering or writing failed
pub fn write_report(
    report: &ScrapeReport,
    format: OutputFormat,
    path: Option<&Path>,
) -> OutputResult<()> {
    let mut rendered = format.formatter().render(report)?;
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }

    match path {
        Some(path) => {
            std::fs::write(path, rendered.as_bytes()).map_err(|e| {
                OutputError::Write(format!("{}: {}", path.display(), e))
            })?;
            tracing::info!("Report written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(rendered.as_bytes())?;
            handle.flush()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProfileScrape;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_write_report_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.md");
        let mut report = ScrapeReport::new();
        report.record_success(ProfileScrape::new("alice", Utc::now(), Vec::new()));

        write_report(&report, OutputFormat::Markdown, Some(&path)).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Reel-Scope Report"));
    }

    #[test]
    fn test_write_report_bad_path() {
        let report = ScrapeReport::new();
        let result = write_report(
            &report,
            OutputFormat::Json,
            Some(Path::new("/nonexistent/dir/report.json")),
        );
        assert!(matches!(result, Err(OutputError::Write(_))));
    }
}
