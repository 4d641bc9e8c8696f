//! Last-filter-wins loading of the dashboard from the upstream API.
//!
//! Every load takes a tag from a monotonically increasing generation. When a
//! response arrives its tag is compared against the newest one issued; older
//! results are dropped instead of overwriting a newer filter's data.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::date_utils::{FilterSpec, Resolution};
use crate::models::DashboardOutcome;
use crate::services::api_client::{ApiClient, ClientResult, Credential};
use crate::services::dashboard;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTag {
    pub seq: u64,
    /// Canonical query string of the filter the request was issued for.
    pub query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Applied(Arc<DashboardOutcome>),
    /// A newer load was started before this one finished.
    Stale { tag: RequestTag },
}

impl LoadOutcome {
    pub fn applied(&self) -> Option<&DashboardOutcome> {
        match self {
            LoadOutcome::Applied(outcome) => Some(outcome),
            LoadOutcome::Stale { .. } => None,
        }
    }
}

pub struct DashboardLoader {
    client: ApiClient,
    generation: AtomicU64,
    latest: RwLock<Option<(u64, Arc<DashboardOutcome>)>>,
}

impl DashboardLoader {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            generation: AtomicU64::new(0),
            latest: RwLock::new(None),
        }
    }

    /// Issue a new tag. Every tag issued earlier becomes stale.
    pub fn begin(&self, query: impl Into<String>) -> RequestTag {
        let seq = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        RequestTag {
            seq,
            query: query.into(),
        }
    }

    pub fn is_latest(&self, tag: &RequestTag) -> bool {
        self.generation.load(Ordering::SeqCst) == tag.seq
    }

    /// Store `outcome` if `tag` is still the newest load.
    pub fn settle(&self, tag: RequestTag, outcome: DashboardOutcome) -> LoadOutcome {
        let Ok(mut slot) = self.latest.write() else {
            return LoadOutcome::Stale { tag };
        };

        if !self.is_latest(&tag) {
            warn!(seq = tag.seq, query = %tag.query, "Discarding stale dashboard result");
            return LoadOutcome::Stale { tag };
        }

        let outcome = Arc::new(outcome);
        *slot = Some((tag.seq, Arc::clone(&outcome)));
        LoadOutcome::Applied(outcome)
    }

    /// The most recently applied dashboard, if any.
    pub fn current(&self) -> Option<Arc<DashboardOutcome>> {
        let guard = self.latest.read().ok()?;
        guard.as_ref().map(|(_, outcome)| Arc::clone(outcome))
    }

    /// Resolve `spec`, fetch the matching snapshot and apply it unless a newer
    /// load overtook this one. An incomplete custom range settles at once
    /// without touching the network.
    pub async fn load(
        &self,
        spec: &FilterSpec,
        credential: Option<&Credential>,
        today: NaiveDate,
        monthly_budget: Option<f64>,
    ) -> ClientResult<LoadOutcome> {
        let filter = match spec.resolve(today) {
            Resolution::Resolved(filter) => filter,
            Resolution::Incomplete => {
                let tag = self.begin(String::new());
                return Ok(self.settle(tag, DashboardOutcome::AwaitingInput));
            }
        };

        let query = filter.query();
        let tag = self.begin(query.query_string());
        debug!(seq = tag.seq, query = %tag.query, "Loading dashboard");

        let snapshot = match self.client.fetch_snapshot(&query, credential).await {
            Ok(snapshot) => snapshot,
            Err(_) if !self.is_latest(&tag) => return Ok(LoadOutcome::Stale { tag }),
            Err(e) => return Err(e),
        };

        let report = dashboard::from_upstream(snapshot, &filter, spec.title(), monthly_budget);
        Ok(self.settle(tag, DashboardOutcome::Ready(Box::new(report))))
    }
}
