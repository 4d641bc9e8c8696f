//! End-to-end assembly of the dashboard from a receipt snapshot.

use chrono::NaiveDate;

use crate::date_utils::{FilterSpec, Resolution, ResolvedFilter};
use crate::models::{
    DashboardOutcome, DashboardReport, ForecastResult, KeyMetrics, MetricsOrigin,
    MonthlyTrendEntry, Receipt, Summary,
};
use crate::services::analytics::{category_universe, filter_receipts, monthly_trends, summarize};
use crate::services::api_client::UpstreamSnapshot;
use crate::services::merchants::{top_merchants, TOP_MERCHANT_LIMIT};
use crate::services::{budget, forecast, metrics};

/// Compute every dashboard view locally from the full receipt collection.
pub fn build_local(
    receipts: &[Receipt],
    spec: &FilterSpec,
    monthly_budget: Option<f64>,
    today: NaiveDate,
) -> DashboardOutcome {
    let filter = match spec.resolve(today) {
        Resolution::Resolved(filter) => filter,
        Resolution::Incomplete => return DashboardOutcome::AwaitingInput,
    };

    let filtered = filter_receipts(receipts, &filter);
    tracing::debug!(
        "Building dashboard from {} of {} receipts",
        filtered.len(),
        receipts.len()
    );

    let summary = summarize(&filtered).with_budget(monthly_budget);
    let trends = monthly_trends(&filtered);
    let forecast = forecast::forecast(&trends, &filtered);
    let key_metrics = metrics::key_metrics(&filtered);

    DashboardOutcome::Ready(Box::new(assemble(
        spec.title(),
        summary,
        trends,
        &filtered,
        key_metrics.map(|m| (m, MetricsOrigin::Local)),
        Some(forecast),
    )))
}

/// Merge an upstream snapshot with locally derived views.
///
/// Summary and trends come from the server. Key metrics fall back to a local
/// computation when the server did not provide them; the forecast is omitted
/// in that case.
pub fn from_upstream(
    snapshot: UpstreamSnapshot,
    filter: &ResolvedFilter,
    title: String,
    monthly_budget: Option<f64>,
) -> DashboardReport {
    let UpstreamSnapshot {
        receipts,
        summary,
        monthly_trends,
        metrics: server_metrics,
        patterns,
    } = snapshot;

    let filtered = filter_receipts(&receipts, filter);

    let server_budget = summary
        .budget
        .is_some_and(|budget| budget.is_finite() && budget > 0.0);
    let summary = if server_budget {
        summary
    } else {
        summary.with_budget(monthly_budget)
    };

    let key_metrics = match server_metrics {
        Some(server) => Some((server, MetricsOrigin::Server)),
        None => {
            tracing::warn!("Server metrics unavailable, computing key metrics locally");
            metrics::key_metrics(&filtered).map(|m| (m, MetricsOrigin::Local))
        }
    };

    assemble(title, summary, monthly_trends, &filtered, key_metrics, patterns)
}

fn assemble(
    title: String,
    summary: Summary,
    monthly_trends: Vec<MonthlyTrendEntry>,
    filtered: &[&Receipt],
    key_metrics: Option<(KeyMetrics, MetricsOrigin)>,
    forecast: Option<ForecastResult>,
) -> DashboardReport {
    let (key_metrics, metrics_origin) = match key_metrics {
        Some((metrics, origin)) => (Some(metrics), origin),
        None => (None, MetricsOrigin::Local),
    };

    DashboardReport {
        title,
        categories: category_universe(&monthly_trends),
        top_merchants: top_merchants(filtered, TOP_MERCHANT_LIMIT),
        budget: budget::track(&summary),
        category_budget: budget::category_shares(&summary),
        summary,
        monthly_trends,
        key_metrics,
        metrics_origin,
        forecast,
    }
}
