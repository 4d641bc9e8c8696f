use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::services::api_client::DEFAULT_TIMEOUT_SECS;

/// Where the server reads receipts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptSourceConfig {
    /// A JSON file holding a `[Receipt]` array or a `{ "receipts": [...] }` object.
    File(PathBuf),
    /// The receipts API at this base URL.
    Upstream(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub source: ReceiptSourceConfig,
    /// Zero or negative disables budget tracking.
    pub monthly_budget: f64,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let source = match env::var("RECEIPTLENS_UPSTREAM_URL") {
            Ok(url) if !url.trim().is_empty() => ReceiptSourceConfig::Upstream(url),
            _ => ReceiptSourceConfig::File(
                env::var("RECEIPTLENS_RECEIPTS_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("data/receipts.json")),
            ),
        };

        Self {
            host: env::var("RECEIPTLENS_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("RECEIPTLENS_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(7070),
            source,
            monthly_budget: env::var("RECEIPTLENS_MONTHLY_BUDGET")
                .ok()
                .map(|b| crate::services::amount::normalize_amount(Some(b.as_str())))
                .unwrap_or(0.0),
            request_timeout: Duration::from_secs(
                env::var("RECEIPTLENS_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
