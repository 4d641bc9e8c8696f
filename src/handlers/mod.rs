pub mod analytics;
pub mod profile;
pub mod receipts;

use axum::http::HeaderMap;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};

use crate::services::api_client::Credential;
use crate::state::AppState;
use crate::VERSION;

/// Every route the server offers.
pub fn routes() -> Router<AppState> {
    core_routes().merge(advanced_routes())
}

/// Receipts, summary, monthly trends and profile.
pub fn core_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/receipts", get(receipts::index))
        .route("/receipts/:id", get(receipts::show))
        .route("/analytics/summary", get(analytics::summary))
        .route("/analytics/monthly", get(analytics::monthly))
        .route("/profile", get(profile::show).put(profile::update))
}

/// Views a minimal receipts API may not offer.
pub fn advanced_routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/metrics", get(analytics::metrics))
        .route("/analytics/patterns", get(analytics::patterns))
        .route("/analytics/merchants", get(analytics::merchants))
        .route("/analytics/budget", get(analytics::budget))
        .route("/analytics/dashboard", get(analytics::dashboard))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": VERSION }))
}

/// Bearer credential from the `Authorization` header, if any.
pub(crate) fn credential(headers: &HeaderMap) -> Option<Credential> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(Credential::from_header)
}
