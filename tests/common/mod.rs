//! Shared test utilities for integration tests.
//!
//! `TestClient` drives the router in-process with `oneshot`; `spawn` binds a
//! real listener for tests that exercise the HTTP client.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use receiptlens::config::{Config, ReceiptSourceConfig};
use receiptlens::handlers;
use receiptlens::models::Receipt;
use receiptlens::server;
use receiptlens::state::{AppState, ReceiptSource};
use tower::ServiceExt;

pub fn test_config(monthly_budget: f64) -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        source: ReceiptSourceConfig::File(PathBuf::from("data/receipts.json")),
        monthly_budget,
        request_timeout: Duration::from_secs(5),
    }
}

/// Five receipts across January and February 2024 plus one without a date or
/// category.
pub fn sample_receipts() -> Vec<Receipt> {
    let mut undated = Receipt::new("5", "Kiosk", "", "3", "");
    undated.purchase_date = None;
    undated.category = None;

    vec![
        Receipt::new("1", "Rewe", "2024-01-05", "10,00", "grocery"),
        Receipt::new("2", "Trattoria", "2024-01-10", "20,00", "restaurant"),
        Receipt::new("3", "Rewe", "2024-02-01", "5,00", "grocery"),
        // a Saturday
        Receipt::new("4", "Zara", "03.02.2024", "45.50", "clothing"),
        undated,
    ]
}

pub struct TestClient {
    state: AppState,
}

impl TestClient {
    /// A client over the sample receipts without a budget.
    pub fn new() -> Self {
        Self::with_receipts(sample_receipts(), 0.0)
    }

    pub fn with_receipts(receipts: Vec<Receipt>, monthly_budget: f64) -> Self {
        let source = ReceiptSource::Memory(Arc::new(receipts));
        Self {
            state: AppState::new(test_config(monthly_budget), source),
        }
    }

    pub fn with_source(source: ReceiptSource, monthly_budget: f64) -> Self {
        Self {
            state: AppState::new(test_config(monthly_budget), source),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        server::router(self.state.clone(), handlers::routes())
    }

    /// Only the routes a minimal receipts API offers.
    pub fn core_router(&self) -> Router {
        server::router(self.state.clone(), handlers::core_routes())
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&body).to_string())
    }

    /// Make a GET request and return status and body.
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Get JSON from an endpoint and parse it.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.get(uri).await;
        let parsed = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
        (status, parsed)
    }

    /// PUT a JSON body and return status and parsed response.
    pub async fn put_json(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("PUT")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, body) = self.send(request).await;
        let parsed = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
        (status, parsed)
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Serve `app` on an OS-assigned port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let (port, _handle) = server::serve(app, "127.0.0.1", 0)
        .await
        .expect("Failed to bind test server");
    format!("http://127.0.0.1:{}", port)
}
