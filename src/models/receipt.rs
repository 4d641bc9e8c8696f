use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::date_utils::{month_key, parse_purchase_date};
use crate::services::amount::normalize_amount;

pub const UNKNOWN_MERCHANT: &str = "Unknown";
pub const DEFAULT_CATEGORY: &str = "other";

/// A single recorded purchase as delivered by the receipts API.
///
/// Receipts are read-only snapshots. Amount and date stay in their wire form and
/// are interpreted on demand, because OCR output is not guaranteed to be clean.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Receipt {
    #[serde(rename = "receipt_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub purchase_time: Option<String>,
    #[serde(default, deserialize_with = "amount_text")]
    pub total_amount: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl Receipt {
    pub fn new(
        id: impl Into<String>,
        merchant: &str,
        purchase_date: &str,
        total_amount: &str,
        category: &str,
    ) -> Self {
        Self {
            id: id.into(),
            merchant: Some(merchant.to_string()),
            purchase_date: Some(purchase_date.to_string()),
            purchase_time: None,
            total_amount: Some(total_amount.to_string()),
            category: Some(category.to_string()),
            file_name: None,
        }
    }

    pub fn amount(&self) -> f64 {
        normalize_amount(self.total_amount.as_deref())
    }

    pub fn merchant_name(&self) -> &str {
        match self.merchant.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => UNKNOWN_MERCHANT,
        }
    }

    pub fn category_name(&self) -> &str {
        match self.category.as_deref() {
            Some(category) if !category.trim().is_empty() => category,
            _ => DEFAULT_CATEGORY,
        }
    }

    pub fn purchase_day(&self) -> Option<NaiveDate> {
        self.purchase_date.as_deref().and_then(parse_purchase_date)
    }

    /// Calendar month bucket, `"YYYY-MM"`.
    pub fn month(&self) -> Option<String> {
        self.purchase_day().map(month_key)
    }
}

/// Accepts `"12,50"` as well as a bare `12.5` and keeps the text form.
fn amount_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    }))
}
