use crate::UrlError;
use url::Url;

/// Resolves a reel href from the listing page into the canonical reel URL
///
/// # Normalization Steps
///
/// 1. Join the href onto the site base; reject if malformed
/// 2. Accept only HTTP and HTTPS
/// 3. Normalize path:
///    - Remove empty and dot segments
///    - Require a `reel` segment followed by an identifier
///    - Always end in a trailing slash
/// 4. Drop query string and fragment (share and tracking parameters)
///
/// # Examples
///
/// ```
/// use reel_scope::url::resolve_reel_url;
/// use url::Url;
///
/// let base = Url::parse("https://www.instagram.com").unwrap();
/// let url = resolve_reel_url(&base, "/reel/C1a2b3?igsh=xyz").unwrap();
/// assert_eq!(url.as_str(), "https://www.instagram.com/reel/C1a2b3/");
/// ```
pub fn resolve_reel_url(base: &Url, href: &str) -> Result<Url, UrlError> {
    let href = href.trim();
    if href.is_empty() {
        return Err(UrlError::NotAReel(href.to_string()));
    }

    let mut url = base
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let path = normalize_reel_path(url.path()).ok_or_else(|| UrlError::NotAReel(href.to_string()))?;
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// Reduces a reel href to its canonical path
///
/// Scheme, host, query and fragment are dropped and the path is normalized
/// the same way [`resolve_reel_url`] does, so every spelling of one reel
/// yields the same value.
///
/// # Examples
///
/// ```
/// use reel_scope::url::canonical_reel_path;
///
/// assert_eq!(canonical_reel_path("/reel/C1a2b3?igsh=xyz"), "/reel/C1a2b3/");
/// assert_eq!(canonical_reel_path("https://www.instagram.com/reel/C1a2b3/"), "/reel/C1a2b3/");
/// ```
pub fn canonical_reel_path(href: &str) -> String {
    let href = href.trim();
    let without_query = href.split(['?', '#']).next().unwrap_or_default();
    let path = match without_query.find("://") {
        Some(at) => {
            let rest = &without_query[at + 3..];
            rest.find('/').map(|slash| &rest[slash..]).unwrap_or("/")
        }
        None => without_query,
    };

    let segments = normalize_path_segments(path);
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", segments.join("/"))
    }
}

/// Splits a path into segments, resolving dot segments
fn normalize_path_segments(path: &str) -> Vec<&str> {
    let mut normalized_segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                normalized_segments.pop();
            }
            _ => normalized_segments.push(segment),
        }
    }

    normalized_segments
}

/// Normalizes a reel path, returning None when it holds no reel identifier
fn normalize_reel_path(path: &str) -> Option<String> {
    let segments = normalize_path_segments(path);
    let reel_at = segments.iter().position(|s| *s == "reel")?;
    segments.get(reel_at + 1)?;

    Some(format!("/{}/", segments.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.instagram.com").unwrap()
    }

    #[test]
    fn test_relative_href() {
        let url = resolve_reel_url(&base(), "/reel/C1a2b3/").unwrap();
        assert_eq!(url.as_str(), "https://www.instagram.com/reel/C1a2b3/");
    }

    #[test]
    fn test_adds_trailing_slash() {
        let url = resolve_reel_url(&base(), "/reel/C1a2b3").unwrap();
        assert_eq!(url.as_str(), "https://www.instagram.com/reel/C1a2b3/");
    }

    #[test]
    fn test_strips_query_and_fragment() {
        let url = resolve_reel_url(&base(), "/reel/C1a2b3/?utm_source=ig_web#top").unwrap();
        assert_eq!(url.as_str(), "https://www.instagram.com/reel/C1a2b3/");
    }

    #[test]
    fn test_collapses_duplicate_slashes() {
        let url = resolve_reel_url(&base(), "/reel//C1a2b3//").unwrap();
        assert_eq!(url.as_str(), "https://www.instagram.com/reel/C1a2b3/");
    }

    #[test]
    fn test_absolute_href_kept() {
        let url = resolve_reel_url(&base(), "https://www.instagram.com/alice/reel/XYZ/").unwrap();
        assert_eq!(url.as_str(), "https://www.instagram.com/alice/reel/XYZ/");
    }

    #[test]
    fn test_non_reel_rejected() {
        assert!(matches!(
            resolve_reel_url(&base(), "/p/C1a2b3/"),
            Err(UrlError::NotAReel(_))
        ));
        assert!(matches!(
            resolve_reel_url(&base(), "/reel/"),
            Err(UrlError::NotAReel(_))
        ));
        assert!(resolve_reel_url(&base(), "").is_err());
    }

    #[test]
    fn test_special_scheme_rejected() {
        assert!(matches!(
            resolve_reel_url(&base(), "javascript:alert(1)"),
            Err(UrlError::InvalidScheme(_)) | Err(UrlError::NotAReel(_))
        ));
    }

    #[test]
    fn test_canonical_path_ignores_spelling() {
        for href in [
            "/reel/A/",
            "/reel/A",
            "/reel/A/?igsh=x",
            "reel/A#comments",
            "/reel//A/./",
            "https://www.instagram.com/reel/A/?utm_source=ig",
        ] {
            assert_eq!(canonical_reel_path(href), "/reel/A/", "href {}", href);
        }
        assert_ne!(canonical_reel_path("/reel/A/"), canonical_reel_path("/reel/B/"));
    }

    #[test]
    fn test_canonical_path_agrees_with_resolved_url() {
        let href = "/reel/C1a2b3?igsh=xyz#top";
        let url = resolve_reel_url(&base(), href).unwrap();
        assert_eq!(url.path(), canonical_reel_path(href));
    }

    #[test]
    fn test_mock_server_base() {
        let base = Url::parse("http://127.0.0.1:8080").unwrap();
        let url = resolve_reel_url(&base, "/reel/abc/").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/reel/abc/");
    }
}
