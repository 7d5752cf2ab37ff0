use async_trait::async_trait;
use chrono::{DateTime, Utc};
use runlens_core::AppResult;
use serde_json::Value;

/// One run entry from the upstream run listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Upstream run identifier, normalized to a string.
    pub run_id: String,
    /// When the run occurred upstream; absent entries degrade at flatten time.
    pub created_timestamp: Option<DateTime<Utc>>,
}

/// Upstream reporting API port.
#[async_trait]
pub trait ReportClient: Send + Sync {
    /// Fetches the run listing.
    async fn list_runs(&self) -> AppResult<Vec<RunSummary>>;

    /// Fetches the nested report payload for one run.
    ///
    /// The payload shape varies upstream, so it is returned as a loosely
    /// typed tree and validated defensively by the flattener.
    async fn fetch_report(&self, run_id: &str) -> AppResult<Value>;
}
