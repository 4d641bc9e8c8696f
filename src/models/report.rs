use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::services::amount::normalize_amount;

/// Keys of a serialized [`MonthlyTrendEntry`] that are not category names.
pub const RESERVED_TREND_KEYS: [&str; 3] = ["month", "total_amount", "receipt_count"];

const TREND_KEY_ESCAPE: char = '~';

/// Key under which `category` is stored in a [`MonthlyTrendEntry`].
///
/// A category named like a reserved key, or one that already starts with `~`,
/// gets one more leading `~`. Every other name is its own key, and distinct
/// categories always map to distinct keys.
pub fn trend_key(category: &str) -> String {
    if RESERVED_TREND_KEYS.contains(&category) || category.starts_with(TREND_KEY_ESCAPE) {
        format!("{TREND_KEY_ESCAPE}{category}")
    } else {
        category.to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub total_amount: f64,
    pub total_receipts: usize,
    #[serde(default)]
    pub by_category: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_used: Option<f64>,
}

impl Summary {
    /// Attach a configured monthly budget; the spend counted against it is the
    /// summary's own total.
    pub fn with_budget(mut self, budget: Option<f64>) -> Self {
        self.budget = budget;
        self.budget_used = budget.map(|_| self.total_amount);
        self
    }
}

/// One calendar month of the trend table.
///
/// On the wire the per-category amounts sit next to the reserved keys, e.g.
/// `{"month":"2024-01","total_amount":30.0,"receipt_count":2,"grocery":10.0}`.
/// A category absent from a month is implicitly zero. Keys are produced by
/// [`trend_key`], so they never collide with the reserved keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonthlyTrendEntry {
    pub month: String,
    pub total_amount: f64,
    pub receipt_count: usize,
    #[serde(flatten)]
    pub category_amounts: BTreeMap<String, f64>,
}

impl MonthlyTrendEntry {
    /// Amount spent on `category` (a category name, not a wire key).
    pub fn category_amount(&self, category: &str) -> f64 {
        self.category_amounts
            .get(&trend_key(category))
            .copied()
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MerchantRankEntry {
    pub merchant: String,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyMetrics {
    #[serde(deserialize_with = "lenient_amount")]
    pub average_spending: f64,
    pub most_expensive: MostExpensive,
    pub most_frequent_merchant: FrequentMerchant,
    pub month_comparison: MonthComparison,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MostExpensive {
    #[serde(deserialize_with = "lenient_amount")]
    pub amount: f64,
    #[serde(default)]
    pub merchant: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrequentMerchant {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonthComparison {
    #[serde(deserialize_with = "lenient_amount")]
    pub current: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub previous: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub change_percent: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatusLabel {
    WithinBudget,
    Approaching,
    AlmostExceeded,
    OverBudget,
}

impl BudgetStatusLabel {
    /// Classify an unclamped utilization percentage.
    pub fn from_ratio(ratio_percentage: f64) -> Self {
        if ratio_percentage > 100.0 {
            Self::OverBudget
        } else if ratio_percentage > 90.0 {
            Self::AlmostExceeded
        } else if ratio_percentage > 75.0 {
            Self::Approaching
        } else {
            Self::WithinBudget
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetStatus {
    pub used: f64,
    pub budget: f64,
    pub remaining: f64,
    pub overage: f64,
    /// Progress bar width, clamped to `[0, 100]`.
    pub used_percentage: f64,
    /// `used / budget * 100`, never clamped; drives `status`.
    pub ratio_percentage: f64,
    pub status: BudgetStatusLabel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BudgetTracking {
    /// No positive monthly budget is configured.
    Disabled,
    Active(BudgetStatus),
}

impl BudgetTracking {
    pub fn status(&self) -> Option<&BudgetStatus> {
        match self {
            Self::Disabled => None,
            Self::Active(status) => Some(status),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryBudgetShare {
    pub category: String,
    pub amount: f64,
    /// Share of the whole monthly budget, unclamped.
    pub percentage: f64,
    pub bar_width: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeekdayWeekendSplit {
    pub weekday_total: f64,
    pub weekday_avg: f64,
    pub weekend_total: f64,
    pub weekend_avg: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ForecastResult {
    pub next_period_forecast: f64,
    pub based_on_months: usize,
    pub weekday_vs_weekend: WeekdayWeekendSplit,
}

/// Server-side metrics sometimes arrive pre-formatted (`"12.50"`).
pub(crate) fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(value) => value,
        Raw::Text(text) => normalize_amount(Some(&text)),
    })
}
