//! Integration tests for `BrowserlessRenderer` and the extractors that sit
//! on top of it, against a local `wiremock` server standing in for
//! Browserless.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use infludb_scraper::{
    BrowserlessRenderer, ExtractionError, Extractor, RenderRequest, Renderer, ScreenshotSink,
    TikTokExtractor, TwitterExtractor,
};

fn renderer(server: &MockServer) -> BrowserlessRenderer {
    BrowserlessRenderer::new(&server.uri(), Some("test-token"), 5)
        .expect("failed to build renderer")
}

#[tokio::test]
async fn render_posts_url_and_reads_final_url_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content"))
        .and(query_param("token", "test-token"))
        .and(body_partial_json(json!({
            "url": "https://x.com/jack",
            "gotoOptions": { "waitUntil": "domcontentloaded" }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-response-url", "https://x.com/jack?redirected=1")
                .set_body_string("<html><body>ok</body></html>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = renderer(&server)
        .render(&RenderRequest::new("https://x.com/jack"))
        .await
        .unwrap();

    assert_eq!(page.final_url, "https://x.com/jack?redirected=1");
    assert!(page.html.contains("ok"));
}

#[tokio::test]
async fn render_without_header_keeps_request_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let page = renderer(&server)
        .render(&RenderRequest::new("https://x.com/jack"))
        .await
        .unwrap();

    assert_eq!(page.final_url, "https://x.com/jack");
}

#[tokio::test]
async fn browserless_408_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content"))
        .respond_with(ResponseTemplate::new(408))
        .mount(&server)
        .await;

    let err = renderer(&server)
        .render(&RenderRequest::new("https://x.com/jack"))
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractionError::Timeout { .. }), "got {err:?}");
}

#[tokio::test]
async fn browserless_500_is_navigation() {
    let crashed = ResponseTemplate::new(500).set_body_string("browser crashed");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content"))
        .respond_with(crashed)
        .mount(&server)
        .await;

    let err = renderer(&server)
        .render(&RenderRequest::new("https://x.com/jack"))
        .await
        .unwrap_err();

    match err {
        ExtractionError::Navigation { detail, .. } => assert!(detail.contains("browser crashed")),
        other => panic!("expected Navigation, got {other:?}"),
    }
}

#[tokio::test]
async fn target_404_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-response-code", "404")
                .set_body_string("<html></html>"),
        )
        .mount(&server)
        .await;

    let err = renderer(&server)
        .render(&RenderRequest::new("https://x.com/nobody"))
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractionError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn screenshot_returns_png_bytes() {
    let options = json!({ "options": { "fullPage": true, "type": "png" } });
    let png = ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']);
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/screenshot"))
        .and(body_partial_json(options))
        .respond_with(png)
        .mount(&server)
        .await;

    let bytes = renderer(&server)
        .screenshot(&RenderRequest::new("https://www.tiktok.com/@a"))
        .await
        .unwrap();

    assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn twitter_extractor_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content"))
        .and(body_partial_json(json!({ "url": "https://x.com/jack" })))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><a href="/jack/followers"><span>6.4M</span></a></body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let x = TwitterExtractor::new(Arc::new(renderer(&server))).with_settle_ms(0);

    assert_eq!(x.extract("https://x.com/jack").await.unwrap(), 6_400_000);
}

#[tokio::test]
async fn tiktok_retries_navigation_failures_then_screenshots() {
    let target = json!({ "url": "https://www.tiktok.com/@khaby.lame" });
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content"))
        .and(body_partial_json(target))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/screenshot"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
        .expect(1)
        .mount(&server)
        .await;

    let dir = std::env::temp_dir().join(format!("infludb-test-{}", uuid::Uuid::new_v4()));
    let renderer: Arc<dyn Renderer> = Arc::new(renderer(&server));
    let tiktok = TikTokExtractor::new(
        Arc::clone(&renderer),
        ScreenshotSink::new(renderer, dir.clone()),
    )
    .with_timing(0, 0);

    let err = tiktok
        .extract("https://www.tiktok.com/@khaby.lame")
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractionError::Navigation { .. }), "got {err:?}");
    let saved: Vec<_> = std::fs::read_dir(dir.join("tiktok_failed"))
        .expect("screenshot dir exists")
        .collect();
    assert_eq!(saved.len(), 1);
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn tiktok_does_not_retry_parse_failures() {
    let empty = ResponseTemplate::new(200).set_body_string("<html><body>empty</body></html>");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content"))
        .respond_with(empty)
        .expect(1)
        .mount(&server)
        .await;

    let renderer: Arc<dyn Renderer> = Arc::new(renderer(&server));
    let tiktok = TikTokExtractor::new(
        Arc::clone(&renderer),
        ScreenshotSink::disabled(renderer),
    )
    .with_timing(0, 0);

    let err = tiktok
        .extract("https://www.tiktok.com/@khaby.lame")
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractionError::ParseFailure { .. }), "got {err:?}");
}
