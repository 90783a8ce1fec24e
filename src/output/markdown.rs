//! Markdown report generation
//!
//! This module generates a human-readable markdown report of a run: one
//! table of reels per profile followed by any failures.

use crate::model::{ProfileScrape, Reel};
use crate::output::traits::{OutputResult, ReportFormatter, ScrapeReport};

/// Longest caption shown in a table cell
const CAPTION_WIDTH: usize = 60;

/// Markdown tables
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownFormatter;

impl ReportFormatter for MarkdownFormatter {
    fn render(&self, report: &ScrapeReport) -> OutputResult<String> {
        Ok(format_markdown_report(report))
    }
}

/// Formats a report as markdown
///
/// # Arguments
///
/// * `report` - The run's results and failures
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_report(report: &ScrapeReport) -> String {
    let mut md = String::new();

    // Title
    md.push_str("# Reel-Scope Report\n\n");
    md.push_str(&format!("- **Profiles scraped**: {}\n", report.results.len()));
    md.push_str(&format!("- **Reels**: {}\n", report.total_reels()));
    md.push_str(&format!("- **Failures**: {}\n\n", report.failures.len()));

    for scrape in &report.results {
        format_profile(&mut md, scrape);
    }

    if report.has_failures() {
        md.push_str("## Failures\n\n");
        md.push_str("| Username | Status | Message |\n");
        md.push_str("|----------|--------|---------|\n");
        for failure in &report.failures {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&failure.username),
                failure.status,
                escape_cell(&failure.message)
            ));
        }
        md.push('\n');
    }

    md
}

fn format_profile(md: &mut String, scrape: &ProfileScrape) {
    md.push_str(&format!("## @{}\n\n", scrape.username));
    md.push_str(&format!("- **Scraped at**: {}\n", scrape.scraped_at.to_rfc3339()));
    md.push_str(&format!("- **Reels**: {}\n\n", scrape.count));

    if scrape.reels.is_empty() {
        md.push_str("No reels found.\n\n");
        return;
    }

    md.push_str("| # | Reel | Posted | Views | Likes | Comments | Caption |\n");
    md.push_str("|---|------|--------|-------|-------|----------|---------|\n");
    for (index, reel) in scrape.reels.iter().enumerate() {
        md.push_str(&format_row(index + 1, reel));
    }
    md.push('\n');
}

fn format_row(position: usize, reel: &Reel) -> String {
    let posted = reel
        .posted_at
        .map(|p| p.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    let caption = reel
        .caption
        .as_deref()
        .map(|c| escape_cell(&truncate(c, CAPTION_WIDTH)))
        .unwrap_or_default();

    format!(
        "| {} | [{}]({}) | {} | {} | {} | {} | {} |\n",
        position,
        reel.id,
        reel.reel_url,
        posted,
        count(reel.views),
        count(reel.likes),
        count(reel.comments),
        caption
    )
}

fn count(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn truncate(text: &str, width: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= width {
        single_line
    } else {
        let cut: String = single_line.chars().take(width).collect();
        format!("{}…", cut.trim_end())
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
