//! Integration tests for the JSON API endpoints.

mod common;

use common::{TestHarness, TEST_SECRET};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FILE_ID: &str = "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms";

fn video_metadata() -> Value {
    json!({
        "id": FILE_ID,
        "name": "nature_doc.mp4",
        "byteSize": 600_000_000u64,
        "mimeType": "video/mp4",
        "video": {
            "width": 1920,
            "height": 1080,
            "durationMillis": 600_000u64
        }
    })
}

async fn mock_store_metadata(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/files/{FILE_ID}")))
        .and(header("authorization", "Bearer test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn health_endpoint() {
    let (_h, addr) = TestHarness::with_server_no_store().await;

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn analyze_reports_quality() {
    let store = MockServer::start().await;
    mock_store_metadata(&store, video_metadata()).await;
    let (_h, addr) = TestHarness::with_server(&store.uri()).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/analyze"))
        .json(&json!({
            "resourceUrl": format!("https://drive.example.com/file/d/{FILE_ID}/view")
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["fileId"], FILE_ID);
    assert_eq!(body["name"], "nature_doc.mp4");
    assert_eq!(body["mimeType"], "video/mp4");

    let quality = &body["quality"];
    assert_eq!(quality["resolutionLabel"], "1080p Full HD");
    // 600 MB over 600 s is 8 Mbps.
    assert_eq!(quality["bitrateBps"], 8_000_000);

    let ids: Vec<&str> = quality["options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["original", "720p", "480p", "360p"]);
}

#[tokio::test]
async fn analyze_rejects_non_video() {
    let store = MockServer::start().await;
    mock_store_metadata(
        &store,
        json!({
            "id": FILE_ID,
            "name": "report.pdf",
            "byteSize": 1024u64,
            "mimeType": "application/pdf"
        }),
    )
    .await;
    let (_h, addr) = TestHarness::with_server(&store.uri()).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/analyze"))
        .json(&json!({ "resourceUrl": FILE_ID }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn analyze_rejects_unrecognizable_url() {
    let store = MockServer::start().await;
    let (_h, addr) = TestHarness::with_server(&store.uri()).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/analyze"))
        .json(&json!({ "resourceUrl": "not a file reference" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn generate_link_mints_verifiable_token() {
    let store = MockServer::start().await;
    mock_store_metadata(&store, video_metadata()).await;
    let (_h, addr) = TestHarness::with_server(&store.uri()).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/generate-link"))
        .json(&json!({
            "resourceUrl": format!("https://drive.example.com/open?id={FILE_ID}"),
            "qualityOption": "720p"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["selectedQuality"], "720p");
    assert_eq!(body["fileInfo"]["id"], FILE_ID);
    assert_eq!(body["fileInfo"]["byteSize"], 600_000_000u64);
    assert!(body["quality"]["options"].is_array());

    let stream_url = body["streamUrl"].as_str().unwrap();
    assert!(stream_url.ends_with(".mp4"), "got {stream_url}");

    // The minted token verifies against the shared secret and carries the
    // extracted file id.
    let token = stream_url
        .rsplit('/')
        .next()
        .unwrap()
        .strip_suffix(".mp4")
        .unwrap();
    let codec = relaycast_token::TokenCodec::new(TEST_SECRET, Duration::from_secs(24 * 3600));
    match codec.verify(token).unwrap() {
        relaycast_token::TokenPayload::Resource { file_id, quality } => {
            assert_eq!(file_id, FILE_ID);
            assert_eq!(quality, relaycast_common::QualityLevel::Q720);
        }
        other => panic!("unexpected payload {other:?}"),
    }
}

#[tokio::test]
async fn generate_link_accepts_bare_file_id() {
    let store = MockServer::start().await;
    mock_store_metadata(&store, video_metadata()).await;
    let (_h, addr) = TestHarness::with_server(&store.uri()).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/generate-link"))
        .json(&json!({ "fileId": FILE_ID }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    // Default quality is the original rendition.
    assert_eq!(body["selectedQuality"], "original");
}

#[tokio::test]
async fn generate_link_requires_a_reference() {
    let store = MockServer::start().await;
    let (_h, addr) = TestHarness::with_server(&store.uri()).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/generate-link"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn universal_generate_wraps_url() {
    let (_h, addr) = TestHarness::with_server_no_store().await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/universal/generate"))
        .json(&json!({ "sourceUrl": "https://cdn.example.com/live/index.m3u8" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["streamType"], "hls");
    assert_eq!(body["buffering"], false);
    assert_eq!(body["proxied"], true);
    let proxy_url = body["proxyUrl"].as_str().unwrap();
    assert!(
        proxy_url.contains("/universal/stream/") && proxy_url.ends_with(".m3u8"),
        "got {proxy_url}"
    );
}

#[tokio::test]
async fn universal_generate_rejects_bad_scheme() {
    let (_h, addr) = TestHarness::with_server_no_store().await;

    for url in ["ftp://host/file.mp4", "file:///etc/passwd", "not-a-url"] {
        let resp = reqwest::Client::new()
            .post(format!("http://{addr}/universal/generate"))
            .json(&json!({ "sourceUrl": url }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "url {url} should be rejected");
    }
}

#[tokio::test]
async fn store_routes_absent_without_store() {
    let (_h, addr) = TestHarness::with_server_no_store().await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/analyze"))
        .json(&json!({ "resourceUrl": FILE_ID }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
