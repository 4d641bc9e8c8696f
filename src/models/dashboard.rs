use serde::{Deserialize, Serialize};

use super::report::{
    BudgetTracking, CategoryBudgetShare, ForecastResult, KeyMetrics, MerchantRankEntry,
    MonthlyTrendEntry, Summary,
};

/// Where the key metrics of a report were computed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MetricsOrigin {
    Local,
    Server,
}

/// Everything the dashboard renders for one filter selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardReport {
    pub title: String,
    pub summary: Summary,
    pub monthly_trends: Vec<MonthlyTrendEntry>,
    /// Every category seen in `monthly_trends`, for a consistent stacked series.
    pub categories: Vec<String>,
    pub top_merchants: Vec<MerchantRankEntry>,
    /// `None` when the filtered set is empty.
    pub key_metrics: Option<KeyMetrics>,
    pub metrics_origin: MetricsOrigin,
    pub budget: BudgetTracking,
    pub category_budget: Vec<CategoryBudgetShare>,
    /// Omitted when the upstream patterns endpoint is unavailable.
    pub forecast: Option<ForecastResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardOutcome {
    /// A custom range is missing one of its dates; nothing was computed.
    AwaitingInput,
    Ready(Box<DashboardReport>),
}

impl DashboardOutcome {
    pub fn report(&self) -> Option<&DashboardReport> {
        match self {
            Self::AwaitingInput => None,
            Self::Ready(report) => Some(report),
        }
    }

    pub fn is_awaiting_input(&self) -> bool {
        matches!(self, Self::AwaitingInput)
    }
}
