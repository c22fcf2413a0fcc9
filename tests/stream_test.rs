//! Integration tests for tokenized file-store streaming.

mod common;

use common::{TestHarness, TEST_SECRET};
use relaycast_common::QualityLevel;
use relaycast_token::{TokenCodec, TokenPayload};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FILE_ID: &str = "streamtest_file_0001";
const FILE_SIZE: usize = 2048;

fn codec() -> TokenCodec {
    TokenCodec::new(TEST_SECRET, Duration::from_secs(24 * 3600))
}

fn resource_token() -> String {
    codec().issue(&TokenPayload::Resource {
        file_id: FILE_ID.to_string(),
        quality: QualityLevel::Original,
    })
}

fn file_bytes() -> Vec<u8> {
    (0..=255u8).cycle().take(FILE_SIZE).collect()
}

async fn mock_store(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/files/{FILE_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": FILE_ID,
            "name": "clip.mp4",
            "byteSize": FILE_SIZE,
            "mimeType": "video/mp4"
        })))
        .mount(server)
        .await;

    // Content endpoint answering the two windows the tests request.
    let data = file_bytes();
    Mock::given(method("GET"))
        .and(path(format!("/files/{FILE_ID}/content")))
        .and(header("range", format!("bytes=0-{}", FILE_SIZE - 1).as_str()))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(data.clone()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/files/{FILE_ID}/content")))
        .and(header("range", "bytes=0-99"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(data[..100].to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn full_stream_without_range() {
    let store = MockServer::start().await;
    mock_store(&store).await;
    let (_h, addr) = TestHarness::with_server(&store.uri()).await;

    let resp = reqwest::get(format!("http://{addr}/stream/{}.mp4", resource_token()))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap().to_str().unwrap(),
        "video/mp4"
    );
    assert_eq!(
        resp.headers().get("accept-ranges").unwrap().to_str().unwrap(),
        "bytes"
    );
    let body = resp.bytes().await.unwrap();
    assert_eq!(body.len(), FILE_SIZE);
}

#[tokio::test]
async fn partial_stream_with_range() {
    let store = MockServer::start().await;
    mock_store(&store).await;
    let (_h, addr) = TestHarness::with_server(&store.uri()).await;

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/stream/{}.mp4", resource_token()))
        .header("range", "bytes=0-99")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 206);
    assert_eq!(
        resp.headers()
            .get("content-range")
            .unwrap()
            .to_str()
            .unwrap(),
        format!("bytes 0-99/{FILE_SIZE}")
    );
    let body = resp.bytes().await.unwrap();
    assert_eq!(body.len(), 100);
    assert_eq!(&body[..], &file_bytes()[..100]);
}

#[tokio::test]
async fn range_past_end_is_unsatisfiable() {
    let store = MockServer::start().await;
    mock_store(&store).await;
    let (_h, addr) = TestHarness::with_server(&store.uri()).await;

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/stream/{}.mp4", resource_token()))
        .header("range", "bytes=2000000-")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 416);
}

#[tokio::test]
async fn malformed_range_serves_full_file() {
    let store = MockServer::start().await;
    mock_store(&store).await;
    let (_h, addr) = TestHarness::with_server(&store.uri()).await;

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/stream/{}.mp4", resource_token()))
        .header("range", "bytes=abc-def")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.bytes().await.unwrap().len(), FILE_SIZE);
}

#[tokio::test]
async fn head_request_reports_size_without_body() {
    let store = MockServer::start().await;
    mock_store(&store).await;
    let (_h, addr) = TestHarness::with_server(&store.uri()).await;

    let resp = reqwest::Client::new()
        .head(format!("http://{addr}/stream/{}.mp4", resource_token()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("content-length")
            .unwrap()
            .to_str()
            .unwrap(),
        FILE_SIZE.to_string()
    );
    assert!(resp.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn proxy_token_rejected_on_stream_route() {
    let store = MockServer::start().await;
    let (_h, addr) = TestHarness::with_server(&store.uri()).await;

    let token = codec().issue(&TokenPayload::Proxy {
        url: "https://cdn.example.com/x.mp4".to_string(),
        options: relaycast_common::ProxyOptions {
            buffering: false,
            proxied: true,
            kind: relaycast_common::MediaKind::Mp4,
        },
    });

    let resp = reqwest::get(format!("http://{addr}/stream/{token}.mp4"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn expired_token_rejected_opaquely() {
    let store = MockServer::start().await;
    let (_h, addr) = TestHarness::with_server(&store.uri()).await;

    // Zero TTL: expired one second after issue.
    let expired = TokenCodec::new(TEST_SECRET, Duration::from_secs(0)).issue_at(
        &TokenPayload::Resource {
            file_id: FILE_ID.to_string(),
            quality: QualityLevel::Original,
        },
        1_000_000,
    );

    let resp = reqwest::get(format!("http://{addr}/stream/{expired}.mp4"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body = resp.text().await.unwrap();
    assert!(
        body.contains("invalid or expired token"),
        "body should be opaque, got {body}"
    );
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let store = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/files/{FILE_ID}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&store)
        .await;
    let (_h, addr) = TestHarness::with_server(&store.uri()).await;

    let resp = reqwest::get(format!("http://{addr}/stream/{}.mp4", resource_token()))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
