use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::Deserialize;

use crate::config::{Config, ReceiptSourceConfig};
use crate::date_utils::UpstreamQuery;
use crate::error::{AppError, AppResult};
use crate::models::{Profile, Receipt};
use crate::services::api_client::{ApiClient, Credential};

/// Backing store for the receipt collection.
#[derive(Debug, Clone)]
pub enum ReceiptSource {
    File(PathBuf),
    Memory(Arc<Vec<Receipt>>),
    Remote(ApiClient),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReceiptFile {
    Bare(Vec<Receipt>),
    Wrapped { receipts: Vec<Receipt> },
}

impl ReceiptSource {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        match &config.source {
            ReceiptSourceConfig::File(path) => Ok(Self::File(path.clone())),
            ReceiptSourceConfig::Upstream(url) => {
                let client = ApiClient::new(url, config.request_timeout)?;
                Ok(Self::Remote(client))
            }
        }
    }

    /// The full, unfiltered receipt collection.
    pub async fn load(&self, credential: Option<&Credential>) -> AppResult<Vec<Receipt>> {
        match self {
            ReceiptSource::File(path) => {
                let content = match tokio::fs::read_to_string(path).await {
                    Ok(content) => content,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        tracing::warn!(
                            "Receipts file not found at {}, using empty collection",
                            path.display()
                        );
                        return Ok(Vec::new());
                    }
                    Err(e) => return Err(e.into()),
                };
                let file: ReceiptFile = serde_json::from_str(&content)?;
                let receipts = match file {
                    ReceiptFile::Bare(receipts) => receipts,
                    ReceiptFile::Wrapped { receipts } => receipts,
                };
                Ok(receipts)
            }
            ReceiptSource::Memory(receipts) => Ok(receipts.as_ref().clone()),
            ReceiptSource::Remote(client) => Ok(client
                .receipts(&UpstreamQuery::default(), credential)
                .await?),
        }
    }

    pub fn client(&self) -> Option<&ApiClient> {
        match self {
            ReceiptSource::Remote(client) => Some(client),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub source: ReceiptSource,
    pub profile: Arc<RwLock<Profile>>,
}

impl AppState {
    pub fn new(config: Config, source: ReceiptSource) -> Self {
        let profile = Profile {
            monthly_budget: config.monthly_budget,
            ..Default::default()
        };
        Self {
            config: Arc::new(config),
            source,
            profile: Arc::new(RwLock::new(profile)),
        }
    }

    pub fn profile(&self) -> AppResult<Profile> {
        self.profile
            .read()
            .map(|profile| profile.clone())
            .map_err(|e| AppError::Internal(format!("Profile lock poisoned: {}", e)))
    }

    pub fn set_profile(&self, profile: Profile) -> AppResult<()> {
        let mut guard = self
            .profile
            .write()
            .map_err(|e| AppError::Internal(format!("Profile lock poisoned: {}", e)))?;
        *guard = profile;
        Ok(())
    }

    pub fn monthly_budget(&self) -> AppResult<Option<f64>> {
        Ok(self.profile()?.budget())
    }
}
