use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Receipt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeKind {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "30days")]
    Last30Days,
    #[serde(rename = "3months")]
    Last3Months,
    #[serde(rename = "6months")]
    Last6Months,
    #[serde(rename = "1year")]
    LastYear,
    #[serde(rename = "custom")]
    Custom,
}

impl RangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All Time",
            Self::Last30Days => "Last 30 Days",
            Self::Last3Months => "Last 3 Months",
            Self::Last6Months => "Last 6 Months",
            Self::LastYear => "Last Year",
            Self::Custom => "Custom Range",
        }
    }

    /// Start of a relative range ending `today`. `None` for `All` and `Custom`.
    fn start_from(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Last30Days => today.checked_sub_signed(Duration::days(30)),
            Self::Last3Months => today.checked_sub_months(Months::new(3)),
            Self::Last6Months => today.checked_sub_months(Months::new(6)),
            Self::LastYear => today.checked_sub_months(Months::new(12)),
            Self::All | Self::Custom => None,
        }
    }
}

/// The user-facing filter selection, as it arrives in a query string.
///
/// Dates stay as text so that a half-filled custom range (`start_date=`) is an
/// incomplete selection rather than a rejected request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub range: RangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        rename = "month_filter",
        skip_serializing_if = "Option::is_none"
    )]
    pub month: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedFilter),
    /// A custom range is missing a date; callers wait for more input.
    Incomplete,
}

impl FilterSpec {
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            range: RangeKind::Custom,
            start_date: Some(format_date(start)),
            end_date: Some(format_date(end)),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_month(mut self, month: &str) -> Self {
        self.month = Some(month.to_string());
        self
    }

    pub fn resolve(&self, today: NaiveDate) -> Resolution {
        let (start, end) = match self.range {
            RangeKind::All => (None, None),
            RangeKind::Custom => {
                let start = self.start_date.as_deref().and_then(parse_iso_date);
                let end = self.end_date.as_deref().and_then(parse_iso_date);
                match (start, end) {
                    (Some(start), Some(end)) => (Some(start), Some(end)),
                    _ => return Resolution::Incomplete,
                }
            }
            relative => (relative.start_from(today), Some(today)),
        };

        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != "all")
            .map(str::to_string);

        let month = self
            .month
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        Resolution::Resolved(ResolvedFilter {
            start,
            end,
            category,
            month,
        })
    }

    /// Heading for the dashboard, e.g. "Analytics: Last 30 Days".
    pub fn title(&self) -> String {
        match self.range {
            RangeKind::All => "Analytics Overview: All Time".to_string(),
            RangeKind::Custom => match (&self.start_date, &self.end_date) {
                (Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => {
                    format!("Analytics: {} to {}", start, end)
                }
                _ => format!("Analytics: {}", self.range.label()),
            },
            relative => format!("Analytics: {}", relative.label()),
        }
    }
}

/// A closed date interval plus optional category and month equality tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub category: Option<String>,
    pub month: Option<String>,
}

impl ResolvedFilter {
    pub fn is_date_bounded(&self) -> bool {
        self.start.is_some() || self.end.is_some() || self.month.is_some()
    }

    pub fn matches(&self, receipt: &Receipt) -> bool {
        if let Some(category) = &self.category {
            if receipt.category_name() != category {
                return false;
            }
        }

        if !self.is_date_bounded() {
            return true;
        }

        let Some(day) = receipt.purchase_day() else {
            return false;
        };

        if self.start.is_some_and(|start| day < start) {
            return false;
        }
        if self.end.is_some_and(|end| day > end) {
            return false;
        }
        match &self.month {
            Some(month) => month_key(day) == *month,
            None => true,
        }
    }

    pub fn query(&self) -> UpstreamQuery {
        UpstreamQuery {
            start_date: self.start.map(format_date),
            end_date: self.end.map(format_date),
            category: self.category.clone(),
            month_filter: self.month.clone(),
        }
    }
}

/// Query parameters understood by the receipts API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_filter: Option<String>,
}

impl UpstreamQuery {
    /// Canonical `a=b&c=d` form; identical filters give identical strings.
    pub fn query_string(&self) -> String {
        serde_urlencoded::to_string(self).unwrap_or_default()
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parse a receipt date in either `YYYY-MM-DD` or `DD.MM.YYYY` form.
pub fn parse_purchase_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    parse_iso_date(s).or_else(|| NaiveDate::parse_from_str(s, "%d.%m.%Y").ok())
}

pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// `"2024-01"` -> `"2023-12"`.
pub fn previous_month_key(month: &str) -> Option<String> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").ok()?;
    first.checked_sub_months(Months::new(1)).map(month_key)
}
