//! HTML parser for listing and reel pages
//!
//! This module handles parsing page content to extract:
//! - Reel hrefs from a profile's listing view
//! - Availability markers (missing or private profile, login wall)
//! - Reel metadata from ld+json blocks with OpenGraph fallbacks

use crate::crawler::metadata::parse_ld_json;
use crate::model::{Reel, ReelLink};
use chrono::{DateTime, FixedOffset};
use scraper::{Html, Selector};

/// Container that holds the listing grid once it has rendered
pub const LISTING_CONTAINER_SELECTOR: &str = "main[role='main']";

/// Reel anchors inside the listing grid
pub const PRIMARY_REEL_SELECTOR: &str = "main[role='main'] div a[href^='/reel/']";

/// Reel anchors on the older article-based layout
pub const FALLBACK_REEL_SELECTOR: &str = "article a[href^='/reel/']";

/// Any anchor pointing at a reel, used for diagnostics only
const ANY_REEL_SELECTOR: &str = "a[href*='/reel/']";

const LD_JSON_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

pub const NOT_AVAILABLE_MARKER: &str = "Sorry, this page isn't available";
pub const PRIVATE_MARKER: &str = "This Account is Private";
const LOGIN_WALL_MARKERS: &[&str] = &["Log in to see", "Log in"];

/// Metadata fields gathered from a reel page; all optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReelFields {
    pub caption: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub posted_at: Option<DateTime<FixedOffset>>,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
}

impl ReelFields {
    /// Builds a reel, or None when no video URL was found
    pub fn into_reel(self, link: &ReelLink, reel_url: &str) -> Option<Reel> {
        let video_url = self.video_url.filter(|v| !v.trim().is_empty())?;

        Some(Reel {
            id: link.id(),
            reel_url: reel_url.to_string(),
            video_url: Some(video_url),
            thumbnail_url: self.thumbnail_url,
            caption: self.caption,
            posted_at: self.posted_at,
            views: self.views,
            likes: self.likes,
            comments: self.comments,
        })
    }
}

/// What the content of a loaded profile view says about access
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileSignals {
    pub not_available: bool,
    pub private: bool,
    pub login_wall: bool,
}

impl ProfileSignals {
    pub fn is_accessible(&self) -> bool {
        !self.not_available && !self.private
    }
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::error!("Invalid selector {}: {:?}", css, e);
            None
        }
    }
}

fn select_hrefs(document: &Html, css: &str) -> Vec<String> {
    let Some(selector) = selector(css) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect()
}

/// Extracts reel hrefs from a listing page in document order
///
/// Anchors inside the main listing grid are preferred; when there are none
/// the article layout is tried instead. Duplicates are kept; callers merge
/// them into a `LinkSet`.
///
/// # Example
///
/// ```
/// use reel_scope::crawler::extract_reel_hrefs;
///
/// let html = r#"<main role="main"><div><a href="/reel/abc/">A</a></div></main>"#;
/// assert_eq!(extract_reel_hrefs(html), vec!["/reel/abc/".to_string()]);
/// ```
pub fn extract_reel_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let primary = select_hrefs(&document, PRIMARY_REEL_SELECTOR);
    if !primary.is_empty() {
        return primary;
    }

    select_hrefs(&document, FALLBACK_REEL_SELECTOR)
}

/// Counts every anchor that points at a reel
pub fn count_reel_anchors(html: &str) -> usize {
    let document = Html::parse_document(html);
    selector(ANY_REEL_SELECTOR)
        .map(|s| document.select(&s).count())
        .unwrap_or(0)
}

/// Looks for the availability markers in a profile page
pub fn detect_profile_signals(html: &str) -> ProfileSignals {
    ProfileSignals {
        not_available: html.contains(NOT_AVAILABLE_MARKER),
        private: html.contains(PRIVATE_MARKER),
        login_wall: LOGIN_WALL_MARKERS.iter().any(|m| html.contains(m)),
    }
}

/// Reads the `content` of the first `<meta property=...>` tag
fn meta_content(document: &Html, property: &str) -> Option<String> {
    let css = format!(r#"meta[property="{}"]"#, property);
    let selector = selector(&css)?;

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty())
}

/// Parses a reel page into metadata fields
///
/// Structured ld+json blocks are read first; the first media block with a
/// video URL wins, else the first media block.
/// Fields still unset afterwards fall back to OpenGraph meta tags.
pub fn parse_reel_page(html: &str) -> ReelFields {
    let document = Html::parse_document(html);

    let mut fields = structured_fields(&document).unwrap_or_default();

    if fields.video_url.is_none() {
        fields.video_url = meta_content(&document, "og:video")
            .or_else(|| meta_content(&document, "og:video:secure_url"));
    }
    if fields.thumbnail_url.is_none() {
        fields.thumbnail_url = meta_content(&document, "og:image");
    }
    if fields.caption.is_none() {
        fields.caption = meta_content(&document, "og:title");
    }

    fields
}

fn structured_fields(document: &Html) -> Option<ReelFields> {
    let selector = selector(LD_JSON_SELECTOR)?;

    let mut first_media = None;
    for (index, element) in document.select(&selector).enumerate() {
        let text: String = element.text().collect();
        match parse_ld_json(&text) {
            Ok(Some(fields)) if fields.video_url.is_some() => return Some(fields),
            Ok(Some(fields)) => {
                first_media.get_or_insert(fields);
            }
            Ok(None) => {}
            Err(e) => tracing::debug!("Skipping malformed ld+json block {}: {}", index, e),
        }
    }

    first_media
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link() -> ReelLink {
        ReelLink::new("/reel/C1/")
    }

    #[test]
    fn test_primary_selector_in_document_order() {
        let html = r#"<html><body><main role="main"><div>
            <a href="/reel/B/">b</a><a href="/p/post/">post</a><a href="/reel/A/">a</a>
            </div></main></body></html>"#;
        assert_eq!(extract_reel_hrefs(html), vec!["/reel/B/", "/reel/A/"]);
    }

    #[test]
    fn test_fallback_selector_when_grid_empty() {
        let html = r#"<html><body><main role="main"></main>
            <article><a href="/reel/X/">x</a></article></body></html>"#;
        assert_eq!(extract_reel_hrefs(html), vec!["/reel/X/"]);
    }

    #[test]
    fn test_fallback_ignored_when_primary_matches() {
        let html = r#"<html><body>
            <main role="main"><div><a href="/reel/A/">a</a></div></main>
            <article><a href="/reel/X/">x</a></article></body></html>"#;
        assert_eq!(extract_reel_hrefs(html), vec!["/reel/A/"]);
    }

    #[test]
    fn test_no_reels() {
        let html = r#"<html><body><main role="main"><div>nothing</div></main></body></html>"#;
        assert!(extract_reel_hrefs(html).is_empty());
    }

    #[test]
    fn test_count_reel_anchors() {
        let html = r#"<a href="/reel/A/"></a><a href="https://site/reel/B/"></a><a href="/p/C/"></a>"#;
        assert_eq!(count_reel_anchors(html), 2);
    }

    #[test]
    fn test_profile_signals() {
        let private = detect_profile_signals("<h2>This Account is Private</h2>");
        assert!(private.private);
        assert!(!private.is_accessible());

        let missing = detect_profile_signals("<p>Sorry, this page isn't available.</p>");
        assert!(missing.not_available);
        assert!(!missing.is_accessible());

        let wall = detect_profile_signals("<main role=\"main\"></main><a>Log in</a>");
        assert!(wall.login_wall);
        assert!(wall.is_accessible());
    }

    #[test]
    fn test_ld_json_video_object() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@type": "VideoObject", "contentUrl": "https://x/v.mp4",
             "interactionStatistic": [{"interactionType": "http://schema.org/LikeAction",
                                       "userInteractionCount": 10}]}
            </script></head><body></body></html>"#;

        let reel = parse_reel_page(html)
            .into_reel(&link(), "https://www.instagram.com/reel/C1/")
            .unwrap();
        assert_eq!(reel.id, "C1");
        assert_eq!(reel.video_url.as_deref(), Some("https://x/v.mp4"));
        assert_eq!(reel.likes, Some(10));
        assert_eq!(reel.comments, None);
    }

    #[test]
    fn test_og_video_fallback() {
        let html = r#"<html><head>
            <meta property="og:video" content="https://cdn/og.mp4">
            <meta property="og:image" content="https://cdn/og.jpg">
            <meta property="og:title" content="a caption">
            </head></html>"#;

        let fields = parse_reel_page(html);
        assert_eq!(fields.video_url.as_deref(), Some("https://cdn/og.mp4"));
        assert_eq!(fields.thumbnail_url.as_deref(), Some("https://cdn/og.jpg"));
        assert_eq!(fields.caption.as_deref(), Some("a caption"));
    }

    #[test]
    fn test_og_secure_url_fallback() {
        let html = r#"<meta property="og:video:secure_url" content="https://cdn/s.mp4">"#;
        assert_eq!(
            parse_reel_page(html).video_url.as_deref(),
            Some("https://cdn/s.mp4")
        );
    }

    #[test]
    fn test_no_video_means_no_reel() {
        let html = r#"<html><head><meta property="og:image" content="https://cdn/og.jpg"></head></html>"#;
        assert!(parse_reel_page(html).into_reel(&link(), "u").is_none());
    }

    #[test]
    fn test_malformed_block_skipped() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type": "VideoObject", </script>
            <script type="application/ld+json">{"@type": "VideoObject", "contentUrl": "https://x/ok.mp4"}</script>
            </head></html>"#;
        assert_eq!(
            parse_reel_page(html).video_url.as_deref(),
            Some("https://x/ok.mp4")
        );
    }

    #[test]
    fn test_ld_json_fields_fill_before_og() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type": "VideoObject", "contentUrl": "https://x/ld.mp4"}</script>
            <meta property="og:video" content="https://cdn/og.mp4">
            <meta property="og:title" content="from og">
            </head></html>"#;

        let fields = parse_reel_page(html);
        assert_eq!(fields.video_url.as_deref(), Some("https://x/ld.mp4"));
        assert_eq!(fields.caption.as_deref(), Some("from og"));
    }

    #[test]
    fn test_odd_description_keeps_video() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@type": "VideoObject", "contentUrl": "https://x/v.mp4", "description": {"text": "hi"}}
            </script>
            <meta property="og:title" content="from og">
            </head></html>"#;

        let fields = parse_reel_page(html);
        assert_eq!(fields.video_url.as_deref(), Some("https://x/v.mp4"));
        assert_eq!(fields.caption.as_deref(), Some("from og"));
    }
}
