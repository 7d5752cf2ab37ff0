use async_trait::async_trait;
use chrono::{DateTime, Utc};
use runlens_core::AppResult;
use runlens_domain::{ScenarioQueryPlan, ScenarioRecord};

/// Record store port for scenario run rows.
#[async_trait]
pub trait ScenarioStore: Send + Sync {
    /// Executes a read plan, returning rows ordered by `created_timestamp`
    /// descending.
    async fn query_scenarios(&self, plan: &ScenarioQueryPlan) -> AppResult<Vec<ScenarioRecord>>;

    /// Returns the most recent local write timestamp across all rows, or
    /// `None` when the store is empty.
    async fn latest_ingested_at(&self) -> AppResult<Option<DateTime<Utc>>>;

    /// Atomically replaces every row belonging to `run_id` with `records`,
    /// inserting in chunks of `batch_size` rows.
    ///
    /// No reader may observe the run half-deleted; implementations scope the
    /// delete and inserts together where the backing store supports it.
    async fn replace_run(
        &self,
        run_id: &str,
        records: &[ScenarioRecord],
        batch_size: usize,
    ) -> AppResult<()>;
}
