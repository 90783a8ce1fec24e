//! Typed structured metadata (ld+json) parsing
//!
//! Reel pages embed schema.org descriptions in
//! `<script type="application/ld+json">` blocks. Each block is decoded into
//! typed optional fields. A field of an unexpected shape is dropped on its
//! own; only text that is not JSON at all is reported as an error.

use crate::crawler::parser::ReelFields;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// schema.org types that describe the reel's video
const MEDIA_TYPES: &[&str] = &["VideoObject", "MediaObject"];

/// A value that may be given once or as a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }

    fn first(&self) -> Option<&T> {
        match self {
            Self::One(value) => Some(value),
            Self::Many(values) => values.first(),
        }
    }
}

/// Decodes a field, treating a value of the wrong shape as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A media object block; everything is optional
#[derive(Debug, Deserialize)]
struct MediaObject {
    #[serde(rename = "@type", default, deserialize_with = "lenient")]
    kind: Option<OneOrMany<String>>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(rename = "contentUrl", default, deserialize_with = "lenient")]
    content_url: Option<String>,
    #[serde(rename = "thumbnailUrl", default, deserialize_with = "lenient")]
    thumbnail_url: Option<OneOrMany<String>>,
    #[serde(rename = "uploadDate", default, deserialize_with = "lenient")]
    upload_date: Option<String>,
    // Counters are decoded one by one in `into_fields`
    #[serde(rename = "interactionStatistic", default, deserialize_with = "lenient")]
    interaction_statistic: Option<OneOrMany<Value>>,
}

#[derive(Debug, Deserialize)]
struct InteractionCounter {
    #[serde(rename = "interactionType", default, deserialize_with = "lenient")]
    interaction_type: Option<InteractionType>,
    #[serde(rename = "userInteractionCount", default, deserialize_with = "lenient")]
    user_interaction_count: Option<Count>,
}

/// Either `"http://schema.org/LikeAction"` or `{"@type": "LikeAction"}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InteractionType {
    Url(String),
    Typed {
        #[serde(rename = "@type")]
        kind: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Count {
    Number(u64),
    Text(String),
    Other(Value),
}

/// Which engagement figure a counter reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Like,
    Comment,
    View,
}

impl InteractionKind {
    /// Recognizes a schema.org action type by its final path segment
    pub fn from_type(kind: &str) -> Option<Self> {
        match last_segment(kind) {
            "LikeAction" => Some(Self::Like),
            "CommentAction" => Some(Self::Comment),
            "ViewAction" | "WatchAction" => Some(Self::View),
            _ => None,
        }
    }
}

fn last_segment(value: &str) -> &str {
    value.trim_end_matches('/').rsplit('/').next().unwrap_or(value)
}

impl InteractionType {
    fn kind(&self) -> Option<InteractionKind> {
        match self {
            Self::Url(url) => InteractionKind::from_type(url),
            Self::Typed { kind } => InteractionKind::from_type(kind),
        }
    }
}

impl Count {
    fn value(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(text) => text.trim().replace(',', "").parse().ok(),
            Self::Other(_) => None,
        }
    }
}

impl MediaObject {
    fn is_media(&self) -> bool {
        self.kind
            .as_ref()
            .map(|kinds| match kinds {
                OneOrMany::One(kind) => is_media_type(kind),
                OneOrMany::Many(kinds) => kinds.iter().any(|k| is_media_type(k)),
            })
            .unwrap_or(false)
    }

    fn into_fields(self) -> ReelFields {
        let mut fields = ReelFields {
            caption: non_empty(self.description),
            video_url: non_empty(self.content_url),
            thumbnail_url: non_empty(self.thumbnail_url.and_then(|t| t.first().cloned())),
            posted_at: self.upload_date.as_deref().and_then(parse_upload_date),
            ..ReelFields::default()
        };

        let counters = self
            .interaction_statistic
            .map(OneOrMany::into_vec)
            .unwrap_or_default();
        for counter in counters {
            let Ok(counter) = serde_json::from_value::<InteractionCounter>(counter) else {
                continue;
            };
            let kind = counter.interaction_type.as_ref().and_then(InteractionType::kind);
            let count = counter.user_interaction_count.as_ref().and_then(Count::value);
            match kind {
                Some(InteractionKind::Like) => fields.likes = count,
                Some(InteractionKind::Comment) => fields.comments = count,
                Some(InteractionKind::View) => fields.views = count,
                None => {}
            }
        }

        fields
    }
}

fn is_media_type(kind: &str) -> bool {
    MEDIA_TYPES.contains(&last_segment(kind))
}

/// Checks `@type` before the full typed decode so unrelated blocks never fail it
fn declares_media_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(kind)) => is_media_type(kind),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .any(is_media_type),
        _ => false,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses one ld+json block
///
/// # Returns
///
/// * `Ok(Some(fields))` - The first media object with a video URL, else the first media object
/// * `Ok(None)` - Valid JSON, but no media object
/// * `Err(_)` - The block is not valid JSON
pub fn parse_ld_json(text: &str) -> Result<Option<ReelFields>, serde_json::Error> {
    let value: Value = serde_json::from_str(text.trim())?;

    let candidates = match value {
        Value::Array(values) => values,
        Value::Object(mut object) => match object.remove("@graph") {
            Some(Value::Array(graph)) => graph,
            Some(other) => {
                object.insert("@graph".to_string(), other);
                vec![Value::Object(object)]
            }
            None => vec![Value::Object(object)],
        },
        _ => Vec::new(),
    };

    let mut first_media = None;
    for candidate in candidates {
        if !candidate.is_object() || !declares_media_type(&candidate) {
            continue;
        }
        let media = match serde_json::from_value::<MediaObject>(candidate) {
            Ok(media) if media.is_media() => media.into_fields(),
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!("Skipping undecodable media object: {}", e);
                continue;
            }
        };
        if media.video_url.is_some() {
            return Ok(Some(media));
        }
        first_media.get_or_insert(media);
    }

    Ok(first_media)
}

/// Parses an upload timestamp
///
/// A trailing `Z` is read as `+00:00`; a timestamp without any offset is
/// taken as UTC and a bare date as midnight UTC. Unparseable input yields
/// None.
pub fn parse_upload_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    let normalized = match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        Some(stripped) => format!("{}+00:00", stripped),
        None => raw.to_string(),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(parsed);
    }
    if let Ok(parsed) = DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%:z") {
        return Some(parsed);
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive).into());
    }

    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_object_with_like_count() {
        let fields = parse_ld_json(
            r#"{
                "@type": "VideoObject",
                "contentUrl": "https://x/v.mp4",
                "interactionStatistic": [
                    {"@type": "InteractionCounter",
                     "interactionType": "http://schema.org/LikeAction",
                     "userInteractionCount": 10}
                ]
            }"#,
        )
        .unwrap()
        .unwrap();

        assert_eq!(fields.video_url.as_deref(), Some("https://x/v.mp4"));
        assert_eq!(fields.likes, Some(10));
        assert_eq!(fields.comments, None);
        assert_eq!(fields.views, None);
    }

    #[test]
    fn test_all_fields() {
        let fields = parse_ld_json(
            r#"{
                "@context": "https://schema.org",
                "@type": "MediaObject",
                "description": "sunset timelapse",
                "contentUrl": "https://cdn/v.mp4",
                "thumbnailUrl": ["https://cdn/t1.jpg", "https://cdn/t2.jpg"],
                "uploadDate": "2024-03-01T12:30:00Z",
                "interactionStatistic": [
                    {"interactionType": {"@type": "CommentAction"}, "userInteractionCount": "1,204"},
                    {"interactionType": "https://schema.org/WatchAction", "userInteractionCount": 98000},
                    {"interactionType": "http://schema.org/LikeAction", "userInteractionCount": 5}
                ]
            }"#,
        )
        .unwrap()
        .unwrap();

        assert_eq!(fields.caption.as_deref(), Some("sunset timelapse"));
        assert_eq!(fields.thumbnail_url.as_deref(), Some("https://cdn/t1.jpg"));
        assert_eq!(fields.comments, Some(1204));
        assert_eq!(fields.views, Some(98000));
        assert_eq!(fields.likes, Some(5));
        assert_eq!(
            fields.posted_at.unwrap().to_rfc3339(),
            "2024-03-01T12:30:00+00:00"
        );
    }

    #[test]
    fn test_non_media_block_ignored() {
        let fields = parse_ld_json(r#"{"@type": "Person", "name": "alice"}"#).unwrap();
        assert!(fields.is_none());
    }

    #[test]
    fn test_list_of_blocks() {
        let fields = parse_ld_json(
            r#"[{"@type": "BreadcrumbList"}, {"@type": "VideoObject", "contentUrl": "https://x/a.mp4"}]"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(fields.video_url.as_deref(), Some("https://x/a.mp4"));
    }

    #[test]
    fn test_graph_blocks() {
        let fields = parse_ld_json(
            r#"{"@context": "https://schema.org", "@graph": [{"@type": "VideoObject", "contentUrl": "https://x/g.mp4"}]}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(fields.video_url.as_deref(), Some("https://x/g.mp4"));
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(parse_ld_json(r#"{"@type": "VideoObject", "contentUrl": "#).is_err());
    }

    #[test]
    fn test_unknown_counts_ignored() {
        let fields = parse_ld_json(
            r#"{"@type": "VideoObject", "contentUrl": "https://x/v.mp4",
                "interactionStatistic": {"interactionType": "http://schema.org/LikeAction",
                                         "userInteractionCount": {"weird": true}}}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(fields.likes, None);
    }

    #[test]
    fn test_empty_content_url_is_unset() {
        let fields = parse_ld_json(r#"{"@type": "VideoObject", "contentUrl": "  "}"#)
            .unwrap()
            .unwrap();
        assert!(fields.video_url.is_none());
    }

    #[test]
    fn test_upload_date_variants() {
        assert_eq!(
            parse_upload_date("2024-03-01T12:30:00Z").unwrap().to_rfc3339(),
            "2024-03-01T12:30:00+00:00"
        );
        assert_eq!(
            parse_upload_date("2024-03-01T12:30:00+02:00")
                .unwrap()
                .offset()
                .local_minus_utc(),
            7200
        );
        assert_eq!(
            parse_upload_date("2024-03-01T12:30:00.250").unwrap().to_rfc3339(),
            "2024-03-01T12:30:00.250+00:00"
        );
        assert!(parse_upload_date("yesterday").is_none());
    }

    #[test]
    fn test_date_only_upload_is_midnight_utc() {
        assert_eq!(
            parse_upload_date("2024-03-01").unwrap().to_rfc3339(),
            "2024-03-01T00:00:00+00:00"
        );
        assert!(parse_upload_date("2024-13-01").is_none());
    }

    #[test]
    fn test_wrong_typed_fields_keep_the_rest() {
        let fields = parse_ld_json(
            r#"{"@type": "VideoObject", "contentUrl": "https://x/v.mp4",
                "description": {"text": "hi"},
                "uploadDate": 1709251200,
                "thumbnailUrl": {"url": "https://x/t.jpg"},
                "interactionStatistic": [
                    42,
                    {"interactionType": 7, "userInteractionCount": 3},
                    {"interactionType": "http://schema.org/LikeAction", "userInteractionCount": 9}
                ]}"#,
        )
        .unwrap()
        .unwrap();

        assert_eq!(fields.video_url.as_deref(), Some("https://x/v.mp4"));
        assert!(fields.caption.is_none());
        assert!(fields.posted_at.is_none());
        assert!(fields.thumbnail_url.is_none());
        assert_eq!(fields.likes, Some(9));
    }

    #[test]
    fn test_wrong_typed_content_url_in_list_falls_through() {
        let fields = parse_ld_json(
            r#"[{"@type": "VideoObject", "contentUrl": ["not", "a", "string"]},
                {"@type": "VideoObject", "contentUrl": "https://x/second.mp4"}]"#,
        )
        .unwrap()
        .unwrap();

        assert_eq!(fields.video_url.as_deref(), Some("https://x/second.mp4"));
    }

    #[test]
    fn test_media_without_video_still_reported() {
        let fields = parse_ld_json(r#"[{"@type": "VideoObject", "description": "no file"}]"#)
            .unwrap()
            .unwrap();

        assert_eq!(fields.caption.as_deref(), Some("no file"));
        assert!(fields.video_url.is_none());
    }

    #[test]
    fn test_interaction_kind() {
        assert_eq!(
            InteractionKind::from_type("http://schema.org/LikeAction"),
            Some(InteractionKind::Like)
        );
        assert_eq!(InteractionKind::from_type("ViewAction"), Some(InteractionKind::View));
        assert_eq!(InteractionKind::from_type("ShareAction"), None);
    }
}
