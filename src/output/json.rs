//! JSON report rendering

use crate::output::traits::{OutputResult, ReportFormatter, ScrapeReport};

/// Pretty-printed JSON
///
/// A run over a single username that succeeded renders that profile's result
/// on its own. Anything else renders the whole report with its failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn render(&self, report: &ScrapeReport) -> OutputResult<String> {
        let json = match (report.results.as_slice(), report.has_failures()) {
            ([single], false) => serde_json::to_string_pretty(single)?,
            _ => serde_json::to_string_pretty(report)?,
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProfileScrape, Reel};
    use crate::ScrapeError;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    fn scrape() -> ProfileScrape {
        let reel = Reel {
            id: "C1".to_string(),
            reel_url: "https://www.instagram.com/reel/C1/".to_string(),
            video_url: Some("https://cdn/v.mp4".to_string()),
            thumbnail_url: None,
            caption: Some("hello".to_string()),
            posted_at: None,
            views: None,
            likes: Some(10),
            comments: None,
        };
        ProfileScrape::new(
            "alice",
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            vec![reel],
        )
    }

    #[test]
    fn test_single_result_renders_bare() {
        let mut report = ScrapeReport::new();
        report.record_success(scrape());

        let value: Value = serde_json::from_str(&JsonFormatter.render(&report).unwrap()).unwrap();
        assert_eq!(value["username"], "alice");
        assert_eq!(value["count"], 1);
        assert_eq!(value["reels"][0]["likes"], 10);
        assert!(value["reels"][0]["comments"].is_null());
        assert_eq!(value["scraped_at"], "2024-03-01T12:00:00Z");
    }

    #[test]
    fn test_failures_render_full_report() {
        let mut report = ScrapeReport::new();
        report.record_success(scrape());
        report.record_failure(
            "bob",
            &ScrapeError::ProfileNotAccessible {
                username: "bob".to_string(),
            },
        );

        let value: Value = serde_json::from_str(&JsonFormatter.render(&report).unwrap()).unwrap();
        assert_eq!(value["results"][0]["username"], "alice");
        assert_eq!(value["failures"][0]["username"], "bob");
        assert_eq!(value["failures"][0]["status"], 404);
    }
}
