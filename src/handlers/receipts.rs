use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use serde_json::{json, Value};

use super::analytics::{selection, AnalyticsParams};
use super::credential;
use crate::error::{AppError, AppResult};
use crate::services::analytics::filter_receipts;
use crate::services::api_client::ClientError;
use crate::state::AppState;

pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<Json<Value>> {
    let (receipts, filter) = selection(&state, &headers, &params).await?;
    let filtered = filter_receipts(&receipts, &filter);
    Ok(Json(json!({ "receipts": filtered })))
}

pub async fn show(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let credential = credential(&headers);
    let not_found = || AppError::NotFound(format!("Receipt {} not found", id));

    if let Some(client) = state.source.client() {
        let receipt = match client.receipt(&id, credential.as_ref()).await {
            Ok(receipt) => receipt,
            Err(ClientError::Status { status: 404, .. }) => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };
        return Ok(Json(json!({ "receipt": receipt })));
    }

    let receipt = state
        .source
        .load(credential.as_ref())
        .await?
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(not_found)?;

    Ok(Json(json!({ "receipt": receipt })))
}
