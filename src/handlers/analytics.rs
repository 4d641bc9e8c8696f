use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};

use super::credential;
use crate::date_utils::{FilterSpec, RangeKind, Resolution, ResolvedFilter};
use crate::error::{AppError, AppResult};
use crate::models::{DashboardOutcome, Receipt};
use crate::services::analytics::{filter_receipts, monthly_trends, summarize};
use crate::services::merchants::{top_merchants, TOP_MERCHANT_LIMIT};
use crate::services::budget::{category_shares, track};
use crate::services::dashboard::{build_local, from_upstream};
use crate::services::forecast::forecast;
use crate::services::metrics::key_metrics;
use crate::state::AppState;

/// Filter query parameters. Without an explicit `range`, a request carrying
/// dates is a custom range; this is how the API client sends resolved filters.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsParams {
    pub range: Option<RangeKind>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub month_filter: Option<String>,
}

impl AnalyticsParams {
    pub fn spec(&self) -> FilterSpec {
        let range = self.range.unwrap_or_else(|| {
            if self.start_date.is_some() || self.end_date.is_some() {
                RangeKind::Custom
            } else {
                RangeKind::All
            }
        });

        FilterSpec {
            range,
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            category: self.category.clone(),
            month: self.month_filter.clone(),
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Load the receipt collection and resolve the requested filter.
pub(crate) async fn selection(
    state: &AppState,
    headers: &HeaderMap,
    params: &AnalyticsParams,
) -> AppResult<(Vec<Receipt>, ResolvedFilter)> {
    let filter = match params.spec().resolve(today()) {
        Resolution::Resolved(filter) => filter,
        Resolution::Incomplete => {
            return Err(AppError::Validation(
                "A custom range needs both start_date and end_date".into(),
            ))
        }
    };

    let receipts = state.source.load(credential(headers).as_ref()).await?;
    tracing::debug!(
        receipts = receipts.len(),
        filter = %filter.query().query_string(),
        "Loaded receipt selection"
    );
    Ok((receipts, filter))
}

pub async fn summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<Json<Value>> {
    let (receipts, filter) = selection(&state, &headers, &params).await?;
    let filtered = filter_receipts(&receipts, &filter);
    let summary = summarize(&filtered).with_budget(state.monthly_budget()?);
    Ok(Json(json!({ "summary": summary })))
}

pub async fn monthly(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<Json<Value>> {
    let (receipts, filter) = selection(&state, &headers, &params).await?;
    let filtered = filter_receipts(&receipts, &filter);
    Ok(Json(json!({ "monthly_trends": monthly_trends(&filtered) })))
}

pub async fn metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<Json<Value>> {
    let (receipts, filter) = selection(&state, &headers, &params).await?;
    let filtered = filter_receipts(&receipts, &filter);
    Ok(Json(json!({ "metrics": key_metrics(&filtered) })))
}

pub async fn patterns(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<Json<Value>> {
    let (receipts, filter) = selection(&state, &headers, &params).await?;
    let filtered = filter_receipts(&receipts, &filter);
    let trends = monthly_trends(&filtered);
    Ok(Json(
        json!({ "patterns": forecast(&trends, &filtered) }),
    ))
}

pub async fn merchants(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<Json<Value>> {
    let (receipts, filter) = selection(&state, &headers, &params).await?;
    let filtered = filter_receipts(&receipts, &filter);
    Ok(Json(
        json!({ "top_merchants": top_merchants(&filtered, TOP_MERCHANT_LIMIT) }),
    ))
}

pub async fn budget(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<Json<Value>> {
    let (receipts, filter) = selection(&state, &headers, &params).await?;
    let filtered = filter_receipts(&receipts, &filter);
    let summary = summarize(&filtered).with_budget(state.monthly_budget()?);

    Ok(Json(json!({
        "budget": track(&summary),
        "category_budget": category_shares(&summary),
        "summary": summary,
    })))
}

/// Every dashboard view in one response. An incomplete custom range answers
/// `{"status": "awaiting_input"}` instead of an error.
pub async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<Json<DashboardOutcome>> {
    let spec = params.spec();
    let today = today();
    let monthly_budget = state.monthly_budget()?;
    let credential = credential(&headers);

    let filter = match spec.resolve(today) {
        Resolution::Resolved(filter) => filter,
        Resolution::Incomplete => return Ok(Json(DashboardOutcome::AwaitingInput)),
    };

    if let Some(client) = state.source.client() {
        let snapshot = client
            .fetch_snapshot(&filter.query(), credential.as_ref())
            .await?;
        let report = from_upstream(snapshot, &filter, spec.title(), monthly_budget);
        return Ok(Json(DashboardOutcome::Ready(Box::new(report))));
    }

    let receipts = state.source.load(credential.as_ref()).await?;
    Ok(Json(build_local(
        &receipts,
        &spec,
        monthly_budget,
        today,
    )))
}
