//! Integration tests for the scraper
//!
//! These tests use wiremock to serve profile and reel pages and drive the
//! full scrape through the HTTP page driver.

use reel_scope::browser;
use reel_scope::config::{Config, DriverKind};
use reel_scope::{scrape_profile, ErrorKind, ScrapeCache, ScrapeError, Scraper, TtlCache};
use std::path::PathBuf;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.scraper.base_url = base_url.to_string();
    config.scraper.driver = DriverKind::Http;
    config.scraper.max_concurrent_pages = 3;
    config.scraper.scroll_settle_ms = 0; // No waiting between polls
    config.scraper.item_settle_ms = 0;
    config.scraper.listing_wait_ms = 100;
    config.scraper.profile_timeout_ms = 2000;
    config.scraper.item_timeout_ms = 2000;
    config
}

fn listing_page(ids: &[&str]) -> String {
    let anchors: String = ids
        .iter()
        .map(|id| format!(r#"<div><a href="/reel/{}/">reel</a></div>"#, id))
        .collect();
    format!(
        r#"<html><head><title>Reels</title></head><body>
        <main role="main"><div>{}</div></main></body></html>"#,
        anchors
    )
}

fn ld_json_page(video_url: &str, likes: u64) -> String {
    format!(
        r#"<html><head><script type="application/ld+json">
        {{"@context": "https://schema.org", "@type": "VideoObject",
          "description": "clip", "contentUrl": "{}",
          "uploadDate": "2024-05-02T08:00:00Z",
          "interactionStatistic": [{{"@type": "InteractionCounter",
            "interactionType": "http://schema.org/LikeAction",
            "userInteractionCount": {}}}]}}
        </script></head><body></body></html>"#,
        video_url, likes
    )
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn scraper_for(server: &MockServer) -> (Scraper, Arc<TtlCache>) {
    let config = create_test_config(&server.uri());
    let browser = browser::launch(&config)
        .await
        .expect("HTTP driver should start");
    let cache = Arc::new(TtlCache::from_config(&config.cache));
    let scraper = Scraper::new(config, browser, cache.clone()).expect("valid config");
    (scraper, cache)
}

#[tokio::test]
async fn test_full_scrape_single_profile() {
    let mock_server = MockServer::start().await;

    mount_html(&mock_server, "/alice/reels/", listing_page(&["A1", "B2", "C3"])).await;
    mount_html(&mock_server, "/reel/A1/", ld_json_page("https://cdn.test/a1.mp4", 10)).await;
    mount_html(&mock_server, "/reel/B2/", ld_json_page("https://cdn.test/b2.mp4", 20)).await;
    mount_html(&mock_server, "/reel/C3/", ld_json_page("https://cdn.test/c3.mp4", 30)).await;

    let (scraper, cache) = scraper_for(&mock_server).await;
    let result = scraper.scrape("alice", Some(2)).await.expect("scrape should succeed");

    assert_eq!(result.username, "alice");
    assert_eq!(result.count, 2);
    assert_eq!(result.reels[0].id, "A1");
    assert_eq!(
        result.reels[0].reel_url,
        format!("{}/reel/A1/", mock_server.uri())
    );
    assert_eq!(result.reels[0].video_url.as_deref(), Some("https://cdn.test/a1.mp4"));
    assert_eq!(result.reels[0].likes, Some(10));
    assert_eq!(result.reels[0].comments, None);
    assert_eq!(
        result.reels[0].posted_at.map(|p| p.to_rfc3339()),
        Some("2024-05-02T08:00:00+00:00".to_string())
    );
    assert_eq!(result.reels[1].id, "B2");
    assert_eq!(cache.len(), 1);

    // Third reel was never requested
    let requests = mock_server.received_requests().await.unwrap();
    assert!(!requests.iter().any(|r| r.url.path() == "/reel/C3/"));
}

#[tokio::test]
async fn test_private_profile() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/privateuser/reels/",
        "<html><body><h2>This Account is Private</h2></body></html>".to_string(),
    )
    .await;

    let (scraper, cache) = scraper_for(&mock_server).await;
    let err = scraper.scrape("privateuser", Some(5)).await.unwrap_err();

    assert!(matches!(err, ScrapeError::ProfileNotAccessible { .. }));
    assert_eq!(err.status_code(), 404);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_missing_profile_not_found_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ghost/reels/"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string("<html><body>Sorry, this page isn't available.</body></html>"),
        )
        .mount(&mock_server)
        .await;

    let (scraper, _cache) = scraper_for(&mock_server).await;
    let err = scraper.scrape("ghost", None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotAccessible);
}

#[tokio::test]
async fn test_og_fallback_and_missing_video() {
    let mock_server = MockServer::start().await;

    mount_html(&mock_server, "/bob/reels/", listing_page(&["OG1", "NONE"])).await;
    mount_html(
        &mock_server,
        "/reel/OG1/",
        r#"<html><head>
        <meta property="og:video" content="https://cdn.test/og1.mp4">
        <meta property="og:image" content="https://cdn.test/og1.jpg">
        <meta property="og:title" content="from og">
        </head></html>"#
            .to_string(),
    )
    .await;
    mount_html(
        &mock_server,
        "/reel/NONE/",
        r#"<html><head><meta property="og:title" content="no video"></head></html>"#.to_string(),
    )
    .await;

    let (scraper, _cache) = scraper_for(&mock_server).await;
    let result = scraper.scrape("bob", Some(5)).await.unwrap();

    assert_eq!(result.count, 1);
    let reel = &result.reels[0];
    assert_eq!(reel.id, "OG1");
    assert_eq!(reel.video_url.as_deref(), Some("https://cdn.test/og1.mp4"));
    assert_eq!(reel.thumbnail_url.as_deref(), Some("https://cdn.test/og1.jpg"));
    assert_eq!(reel.caption.as_deref(), Some("from og"));
}

#[tokio::test]
async fn test_failed_item_does_not_abort_siblings() {
    let mock_server = MockServer::start().await;

    mount_html(&mock_server, "/carol/reels/", listing_page(&["OK", "BROKEN"])).await;
    mount_html(&mock_server, "/reel/OK/", ld_json_page("https://cdn.test/ok.mp4", 1)).await;
    Mock::given(method("GET"))
        .and(path("/reel/BROKEN/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let (scraper, _cache) = scraper_for(&mock_server).await;
    let result = scraper.scrape("carol", Some(5)).await.unwrap();

    assert_eq!(result.count, 1);
    assert_eq!(result.reels[0].id, "OK");
}

#[tokio::test]
async fn test_repeat_scrape_served_from_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/alice/reels/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&["A1"])))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_html(&mock_server, "/reel/A1/", ld_json_page("https://cdn.test/a1.mp4", 10)).await;

    let (scraper, _cache) = scraper_for(&mock_server).await;
    let first = scraper.scrape("alice", Some(1)).await.unwrap();
    let second = scraper.scrape("alice", Some(1)).await.unwrap();

    assert_eq!(first, second);
    // `expect(1)` is verified when the server drops
}

#[tokio::test]
async fn test_empty_listing_is_not_an_error() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/newbie/reels/",
        "<html><body><p>Loading…</p></body></html>".to_string(),
    )
    .await;

    let result = scrape_profile(create_test_config(&mock_server.uri()), "newbie", None)
        .await
        .unwrap();

    assert_eq!(result.count, 0);
    assert!(result.reels.is_empty());
}

#[tokio::test]
async fn test_missing_session_file_fails_at_startup() {
    let mut config = create_test_config("http://127.0.0.1:9");
    config.session.storage_state = Some(PathBuf::from("/nonexistent/auth_state.json"));

    let result = browser::launch(&config).await;

    assert!(matches!(result, Err(ScrapeError::Session(_))));
}
