use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::date_utils::UpstreamQuery;
use crate::models::{
    AuthSession, Credentials, ForecastResult, KeyMetrics, MonthlyTrendEntry, Profile, Receipt,
    Registration, Summary,
};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Opaque bearer token sent with every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Parse an `Authorization` header value. Accepts `Bearer <token>` with
    /// any casing of the scheme, or a bare token without spaces. Other schemes
    /// and empty tokens yield `None`.
    pub fn from_header(value: &str) -> Option<Self> {
        let value = value.trim();
        let token = match value.split_once(' ') {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
            Some(_) => return None,
            None if value.eq_ignore_ascii_case("bearer") => return None,
            None => value,
        };
        (!token.is_empty()).then(|| Self(token.to_string()))
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Not authorized (HTTP {0})")]
    Unauthorized(u16),

    #[error("Upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid upstream response: {0}")]
    Decode(String),

    #[error("Client setup failed: {0}")]
    Setup(String),
}

impl ClientError {
    /// Transport failures and server-side errors may succeed on a later
    /// attempt; authentication and decoding failures will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(e) => !e.is_decode() && !e.is_builder(),
            ClientError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Upload target handed out by the presign endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresignedUpload {
    #[serde(rename = "uploadUrl")]
    pub upload_url: String,
    pub key: String,
}

/// Everything the dashboard needs from the server for one filter.
#[derive(Debug, Clone, Default)]
pub struct UpstreamSnapshot {
    pub receipts: Vec<Receipt>,
    pub summary: Summary,
    pub monthly_trends: Vec<MonthlyTrendEntry>,
    pub metrics: Option<KeyMetrics>,
    pub patterns: Option<ForecastResult>,
}

#[derive(Deserialize)]
struct ReceiptsEnvelope {
    #[serde(default)]
    receipts: Vec<Receipt>,
}

#[derive(Deserialize)]
struct ReceiptEnvelope {
    receipt: Receipt,
}

#[derive(Deserialize)]
struct SummaryEnvelope {
    summary: Summary,
}

#[derive(Deserialize)]
struct TrendsEnvelope {
    #[serde(default)]
    monthly_trends: Vec<MonthlyTrendEntry>,
}

#[derive(Deserialize)]
struct MetricsEnvelope {
    metrics: Option<KeyMetrics>,
}

#[derive(Deserialize)]
struct PatternsEnvelope {
    patterns: Option<ForecastResult>,
}

#[derive(Serialize)]
struct PresignRequest<'a> {
    #[serde(rename = "fileName")]
    file_name: &'a str,
    #[serde(rename = "fileType")]
    file_type: &'a str,
}

/// Client for the receipts analytics API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Setup(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(builder: RequestBuilder, credential: Option<&Credential>) -> RequestBuilder {
        match credential {
            Some(credential) => builder.bearer_auth(credential.token()),
            None => builder,
        }
    }

    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn read<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let response = Self::check(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &UpstreamQuery,
        credential: Option<&Credential>,
    ) -> ClientResult<T> {
        debug!(path = %path, query = %query.query_string(), "GET upstream");

        let request = Self::authorize(self.http.get(self.url(path)).query(query), credential);
        let response = request.send().await?;
        Self::read(response).await
    }

    pub async fn receipts(
        &self,
        query: &UpstreamQuery,
        credential: Option<&Credential>,
    ) -> ClientResult<Vec<Receipt>> {
        let envelope: ReceiptsEnvelope = self.get_json("/receipts", query, credential).await?;
        Ok(envelope.receipts)
    }

    pub async fn receipt(&self, id: &str, credential: Option<&Credential>) -> ClientResult<Receipt> {
        let path = format!("/receipts/{}", id);
        let envelope: ReceiptEnvelope = self
            .get_json(&path, &UpstreamQuery::default(), credential)
            .await?;
        Ok(envelope.receipt)
    }

    pub async fn summary(
        &self,
        query: &UpstreamQuery,
        credential: Option<&Credential>,
    ) -> ClientResult<Summary> {
        let envelope: SummaryEnvelope = self
            .get_json("/analytics/summary", query, credential)
            .await?;
        Ok(envelope.summary)
    }

    pub async fn monthly_trends(
        &self,
        query: &UpstreamQuery,
        credential: Option<&Credential>,
    ) -> ClientResult<Vec<MonthlyTrendEntry>> {
        let envelope: TrendsEnvelope = self
            .get_json("/analytics/monthly", query, credential)
            .await?;
        Ok(envelope.monthly_trends)
    }

    /// Server-side key metrics. `Ok(None)` means the server had no data.
    pub async fn metrics(
        &self,
        query: &UpstreamQuery,
        credential: Option<&Credential>,
    ) -> ClientResult<Option<KeyMetrics>> {
        let envelope: MetricsEnvelope = self
            .get_json("/analytics/metrics", query, credential)
            .await?;
        Ok(envelope.metrics)
    }

    pub async fn patterns(
        &self,
        query: &UpstreamQuery,
        credential: Option<&Credential>,
    ) -> ClientResult<Option<ForecastResult>> {
        let envelope: PatternsEnvelope = self
            .get_json("/analytics/patterns", query, credential)
            .await?;
        Ok(envelope.patterns)
    }

    pub async fn profile(&self, credential: Option<&Credential>) -> ClientResult<Profile> {
        self.get_json("/profile", &UpstreamQuery::default(), credential)
            .await
    }

    pub async fn update_profile(
        &self,
        profile: &Profile,
        credential: Option<&Credential>,
    ) -> ClientResult<()> {
        debug!(budget = profile.monthly_budget, "PUT upstream profile");

        let request = Self::authorize(self.http.put(self.url("/profile")).json(profile), credential);
        let response = request.send().await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn login(&self, credentials: &Credentials) -> ClientResult<Credential> {
        debug!(email = %credentials.email, "Logging in");
        self.authenticate("/auth/login", credentials).await
    }

    pub async fn register(&self, registration: &Registration) -> ClientResult<Credential> {
        debug!(email = %registration.email, "Registering account");
        self.authenticate("/auth/register", registration).await
    }

    async fn authenticate<B: Serialize>(&self, path: &str, body: &B) -> ClientResult<Credential> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        let session: AuthSession = Self::read(response).await?;
        Ok(Credential::bearer(session.id_token))
    }

    /// Ask the API for a one-shot upload URL for a receipt image.
    pub async fn presigned_upload(
        &self,
        file_name: &str,
        content_type: &str,
        credential: Option<&Credential>,
    ) -> ClientResult<PresignedUpload> {
        let body = PresignRequest {
            file_name,
            file_type: content_type,
        };
        let request = Self::authorize(
            self.http.post(self.url("/upload/presigned-url")).json(&body),
            credential,
        );
        let response = request.send().await?;
        Self::read(response).await
    }

    /// PUT the raw file bytes to a presigned URL. The content type must match
    /// the one the URL was signed for.
    pub async fn upload_file(
        &self,
        target: &PresignedUpload,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> ClientResult<()> {
        debug!(key = %target.key, size = bytes.len(), "Uploading receipt file");

        let response = self
            .http
            .put(&target.upload_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Fetch receipts, summary and trends together with the optional
    /// metrics and patterns. Any core failure fails the snapshot; advanced
    /// failures degrade to `None`.
    pub async fn fetch_snapshot(
        &self,
        query: &UpstreamQuery,
        credential: Option<&Credential>,
    ) -> ClientResult<UpstreamSnapshot> {
        let core = async {
            tokio::try_join!(
                self.receipts(query, credential),
                self.summary(query, credential),
                self.monthly_trends(query, credential),
            )
        };
        let advanced = async {
            tokio::join!(
                self.metrics(query, credential),
                self.patterns(query, credential),
            )
        };

        let (core, (metrics, patterns)) = tokio::join!(core, advanced);
        let (receipts, summary, monthly_trends) = core?;

        let metrics = metrics.unwrap_or_else(|e| {
            warn!("Advanced metrics unavailable: {}", e);
            None
        });
        let patterns = patterns.unwrap_or_else(|e| {
            warn!("Spending patterns unavailable: {}", e);
            None
        });

        debug!(
            receipts = receipts.len(),
            months = monthly_trends.len(),
            "Fetched upstream snapshot"
        );

        Ok(UpstreamSnapshot {
            receipts,
            summary,
            monthly_trends,
            metrics,
            patterns,
        })
    }
}
