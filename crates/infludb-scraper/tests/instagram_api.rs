//! Integration tests for `InstagramApi` against a local `wiremock` server.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use infludb_scraper::{ExtractionError, InstagramApi, ProfileLookup};

const PROFILE_PATH: &str = "/api/v1/users/web_profile_info/";

fn test_api(server: &MockServer) -> InstagramApi {
    InstagramApi::new(&server.uri(), 5, "infludb-test/0.1").expect("failed to build test api")
}

async fn respond_with(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROFILE_PATH))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn reads_edge_followed_by_count() {
    let body = json!({
        "data": { "user": { "username": "nasa", "edge_followed_by": { "count": 97_100_000 } } },
        "status": "ok"
    });
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROFILE_PATH))
        .and(query_param("username", "nasa"))
        .and(header("x-ig-app-id", "936619743392459"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let count = test_api(&server).follower_count("nasa").await;

    assert_eq!(count.unwrap(), 97_100_000);
}

#[tokio::test]
async fn http_429_is_rate_limited() {
    let server = respond_with(ResponseTemplate::new(429)).await;

    let err = test_api(&server).follower_count("nasa").await.unwrap_err();

    assert!(matches!(err, ExtractionError::RateLimited { .. }), "got {err:?}");
}

#[tokio::test]
async fn please_wait_401_is_rate_limited() {
    let body = json!({
        "message": "Please wait a few minutes before you try again.",
        "status": "fail"
    });
    let server = respond_with(ResponseTemplate::new(401).set_body_json(body)).await;

    let err = test_api(&server).follower_count("nasa").await.unwrap_err();

    assert!(matches!(err, ExtractionError::RateLimited { .. }), "got {err:?}");
}

#[tokio::test]
async fn http_404_is_not_found() {
    let server = respond_with(ResponseTemplate::new(404)).await;

    let err = test_api(&server).follower_count("ghost").await.unwrap_err();

    assert!(matches!(err, ExtractionError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn null_user_is_not_found() {
    let body = json!({"data": {"user": null}});
    let server = respond_with(ResponseTemplate::new(200).set_body_json(body)).await;

    let err = test_api(&server).follower_count("ghost").await.unwrap_err();

    assert!(matches!(err, ExtractionError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn html_body_is_parse_failure() {
    let server = respond_with(
        ResponseTemplate::new(200).set_body_string("<html><body>Login</body></html>"),
    )
    .await;

    let err = test_api(&server).follower_count("nasa").await.unwrap_err();

    assert!(matches!(err, ExtractionError::ParseFailure { .. }), "got {err:?}");
}

#[tokio::test]
async fn server_error_is_navigation() {
    let server = respond_with(ResponseTemplate::new(503)).await;

    let err = test_api(&server).follower_count("nasa").await.unwrap_err();

    assert!(matches!(err, ExtractionError::Navigation { .. }), "got {err:?}");
}
