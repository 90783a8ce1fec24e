//! URL handling module for Reel-Scope
//!
//! This module builds profile page URLs, validates usernames, and resolves
//! reel hrefs found on listing pages into canonical reel URLs.

mod normalize;

use crate::UrlError;
use url::Url;

// Re-export main functions
pub use normalize::{canonical_reel_path, resolve_reel_url};

/// Longest username the site accepts
const MAX_USERNAME_LEN: usize = 30;

/// The two views of a profile, in the order they are tried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUrls {
    /// Dedicated reels tab: `{base}/{username}/reels/`
    pub reels: Url,
    /// Profile root: `{base}/{username}/`
    pub root: Url,
}

/// Checks that a username is non-empty and made of allowed characters
///
/// # Examples
///
/// ```
/// use reel_scope::url::validate_username;
///
/// assert!(validate_username("alice.b_2").is_ok());
/// assert!(validate_username("../etc").is_err());
/// ```
pub fn validate_username(username: &str) -> Result<(), UrlError> {
    let valid = !username.is_empty()
        && username.len() <= MAX_USERNAME_LEN
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
        && !username.chars().all(|c| c == '.');

    if valid {
        Ok(())
    } else {
        Err(UrlError::InvalidUsername(username.to_string()))
    }
}

/// Builds the profile URLs for a username
///
/// # Arguments
///
/// * `base` - Site root (e.g. `https://www.instagram.com`)
/// * `username` - Validated username
pub fn profile_urls(base: &Url, username: &str) -> Result<ProfileUrls, UrlError> {
    validate_username(username)?;

    let root = base
        .join(&format!("/{}/", username))
        .map_err(|e| UrlError::Parse(e.to_string()))?;
    let reels = root
        .join("reels/")
        .map_err(|e| UrlError::Parse(e.to_string()))?;

    Ok(ProfileUrls { reels, root })
}

/// Parses the configured base URL
pub fn parse_base_url(base_url: &str) -> Result<Url, UrlError> {
    let url = Url::parse(base_url).map_err(|e| UrlError::Parse(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_urls() {
        let base = parse_base_url("https://www.instagram.com").unwrap();
        let urls = profile_urls(&base, "alice").unwrap();
        assert_eq!(urls.reels.as_str(), "https://www.instagram.com/alice/reels/");
        assert_eq!(urls.root.as_str(), "https://www.instagram.com/alice/");
    }

    #[test]
    fn test_profile_urls_ignore_base_path() {
        let base = parse_base_url("http://127.0.0.1:9000/some/path").unwrap();
        let urls = profile_urls(&base, "bob").unwrap();
        assert_eq!(urls.root.as_str(), "http://127.0.0.1:9000/bob/");
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("a.b_c1").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("..").is_err());
        assert!(validate_username("al ice").is_err());
        assert!(validate_username("alice/reels").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
    }

    #[test]
    fn test_profile_urls_rejects_bad_username() {
        let base = parse_base_url("https://www.instagram.com").unwrap();
        assert!(matches!(
            profile_urls(&base, "a?b"),
            Err(UrlError::InvalidUsername(_))
        ));
    }

    #[test]
    fn test_base_url_scheme() {
        assert!(parse_base_url("ftp://example.com").is_err());
        assert!(parse_base_url("nope").is_err());
    }
}
