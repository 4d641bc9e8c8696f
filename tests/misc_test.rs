//! Miscellaneous integration tests (health check, CORS, file source).

mod common;

use std::io::Write;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{test_config, TestClient};
use http_body_util::BodyExt;
use receiptlens::config::ReceiptSourceConfig;
use receiptlens::server::build_app;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_endpoint() {
    let client = TestClient::new();
    let (status, body) = client.get_json("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], receiptlens::VERSION);
}

#[tokio::test]
async fn test_cors_headers() {
    let client = TestClient::new();
    let response = client
        .router()
        .oneshot(
            Request::builder()
                .uri("/analytics/summary")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap_or_default())
}

#[tokio::test]
async fn test_file_source_wrapped_and_bare() {
    let mut wrapped = tempfile::NamedTempFile::new().unwrap();
    write!(
        wrapped,
        r#"{{"receipts": [
            {{"receipt_id": "a", "merchant": "Café François", "purchase_date": "2024-03-01", "total_amount": "7,20", "category": "restaurant"}},
            {{"receipt_id": "b", "merchant": "東京ストア", "purchase_date": "2024-03-02", "total_amount": 2.8}}
        ]}}"#
    )
    .unwrap();

    let mut config = test_config(0.0);
    config.source = ReceiptSourceConfig::File(wrapped.path().to_path_buf());
    let (_, app) = build_app(config).unwrap();

    let (status, body) = get(app, "/analytics/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["total_receipts"], 2);
    assert!((body["summary"]["total_amount"].as_f64().unwrap() - 10.0).abs() < 1e-9);
    assert!((body["summary"]["by_category"]["other"].as_f64().unwrap() - 2.8).abs() < 1e-9);

    let mut bare = tempfile::NamedTempFile::new().unwrap();
    write!(bare, r#"[{{"id": "x", "merchant": "Rewe", "total_amount": "abc"}}]"#).unwrap();

    let mut config = test_config(0.0);
    config.source = ReceiptSourceConfig::File(bare.path().to_path_buf());
    let (_, app) = build_app(config).unwrap();

    let (_, body) = get(app, "/receipts").await;
    assert_eq!(body["receipts"][0]["receipt_id"], "x");
}

#[tokio::test]
async fn test_missing_file_is_empty_collection() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(0.0);
    config.source = ReceiptSourceConfig::File(dir.path().join("missing.json"));
    let (_, app) = build_app(config).unwrap();

    let (status, body) = get(app, "/analytics/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["total_receipts"], 0);
}

#[tokio::test]
async fn test_malformed_file_is_server_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();

    let mut config = test_config(0.0);
    config.source = ReceiptSourceConfig::File(file.path().to_path_buf());
    let (_, app) = build_app(config).unwrap();

    let (status, body) = get(app, "/analytics/summary").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Malformed receipt data");
}
