//! In-memory scenario store implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use runlens_application::ScenarioStore;
use runlens_core::{AppError, AppResult};
use runlens_domain::{ScenarioQueryPlan, ScenarioRecord};

/// In-memory scenario store, keyed by `(run_id, scenario_id)`.
///
/// The write lock scopes each run replacement, so readers never observe a
/// run half-replaced.
#[derive(Debug, Default)]
pub struct InMemoryScenarioStore {
    rows: RwLock<HashMap<(String, String), StoredScenario>>,
}

#[derive(Debug, Clone)]
struct StoredScenario {
    record: ScenarioRecord,
    last_updated_timestamp: DateTime<Utc>,
}

impl InMemoryScenarioStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ScenarioStore for InMemoryScenarioStore {
    async fn query_scenarios(&self, plan: &ScenarioQueryPlan) -> AppResult<Vec<ScenarioRecord>> {
        let rows = self.rows.read().await;

        let mut matched: Vec<ScenarioRecord> = rows
            .values()
            .filter(|stored| {
                plan.time_range().is_none_or(|range| {
                    stored.record.created_timestamp >= range.start()
                        && stored.record.created_timestamp <= range.end()
                })
            })
            .filter(|stored| {
                plan.status()
                    .is_none_or(|status| stored.record.status == Some(status))
            })
            .map(|stored| stored.record.clone())
            .collect();

        matched.sort_by(|left, right| right.created_timestamp.cmp(&left.created_timestamp));
        if let Some(limit) = plan.limit() {
            matched.truncate(limit);
        }

        Ok(matched)
    }

    async fn latest_ingested_at(&self) -> AppResult<Option<DateTime<Utc>>> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .map(|stored| stored.last_updated_timestamp)
            .max())
    }

    async fn replace_run(
        &self,
        run_id: &str,
        records: &[ScenarioRecord],
        batch_size: usize,
    ) -> AppResult<()> {
        if batch_size == 0 {
            return Err(AppError::Validation(
                "insert batch size must be greater than zero".to_owned(),
            ));
        }

        let mut rows = self.rows.write().await;
        rows.retain(|(stored_run_id, _), _| stored_run_id != run_id);

        let written_at = Utc::now();
        for record in records {
            rows.insert(
                (record.run_id.clone(), record.scenario_id.clone()),
                StoredScenario {
                    record: record.clone(),
                    last_updated_timestamp: written_at,
                },
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};
    use runlens_application::ScenarioStore;
    use runlens_domain::{ScenarioQueryPlan, ScenarioRecord, ScenarioStatus, TimeRange};

    use super::InMemoryScenarioStore;

    fn record(run_id: &str, scenario_id: &str, created_timestamp: DateTime<Utc>) -> ScenarioRecord {
        ScenarioRecord {
            run_id: run_id.to_owned(),
            scenario_id: scenario_id.to_owned(),
            scenario_name: String::new(),
            process_id: String::new(),
            process_name: String::new(),
            flow_id: String::new(),
            flow_name: String::new(),
            status: Some(ScenarioStatus::Passed),
            created_timestamp,
        }
    }

    #[tokio::test]
    async fn replace_run_removes_all_prior_rows_for_the_run() {
        let store = InMemoryScenarioStore::new();
        let now = Utc::now();

        let replaced = store
            .replace_run(
                "run-a",
                &[record("run-a", "sc-1", now), record("run-a", "sc-2", now)],
                50,
            )
            .await;
        assert!(replaced.is_ok());

        let replaced = store
            .replace_run("run-a", &[record("run-a", "sc-3", now)], 50)
            .await;
        assert!(replaced.is_ok());

        let plan = ScenarioQueryPlan::from_filters(None, None);
        let rows = store.query_scenarios(&plan).await.unwrap_or_default();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].scenario_id, "sc-3");
    }

    #[tokio::test]
    async fn replacing_one_run_leaves_other_runs_untouched() {
        let store = InMemoryScenarioStore::new();
        let now = Utc::now();

        assert!(
            store
                .replace_run("run-a", &[record("run-a", "sc-1", now)], 50)
                .await
                .is_ok()
        );
        assert!(
            store
                .replace_run("run-b", &[record("run-b", "sc-1", now)], 50)
                .await
                .is_ok()
        );
        assert!(store.replace_run("run-a", &[], 50).await.is_ok());

        let plan = ScenarioQueryPlan::from_filters(None, None);
        let rows = store.query_scenarios(&plan).await.unwrap_or_default();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].run_id, "run-b");
    }

    #[tokio::test]
    async fn queries_order_descending_and_honor_the_limit() {
        let store = InMemoryScenarioStore::new();
        let base = Utc::now() - Duration::hours(30);

        let records: Vec<ScenarioRecord> = (0..25)
            .map(|index| {
                record(
                    "run-a",
                    &format!("sc-{index}"),
                    base + Duration::minutes(index),
                )
            })
            .collect();
        assert!(store.replace_run("run-a", &records, 50).await.is_ok());

        let plan = ScenarioQueryPlan::from_filters(None, None);
        let rows = store.query_scenarios(&plan).await.unwrap_or_default();
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[0].scenario_id, "sc-24");
        assert!(rows[0].created_timestamp > rows[19].created_timestamp);
    }

    #[tokio::test]
    async fn time_bounds_are_inclusive() {
        let store = InMemoryScenarioStore::new();
        let start = Utc::now() - Duration::hours(2);
        let end = start + Duration::hours(1);

        assert!(
            store
                .replace_run(
                    "run-a",
                    &[
                        record("run-a", "at-start", start),
                        record("run-a", "at-end", end),
                        record("run-a", "after", end + Duration::seconds(1)),
                    ],
                    50,
                )
                .await
                .is_ok()
        );

        let range = TimeRange::new(start, end).ok();
        assert!(range.is_some());
        let plan = ScenarioQueryPlan::from_filters(range, None);
        let rows = store.query_scenarios(&plan).await.unwrap_or_default();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn latest_ingested_at_tracks_writes() {
        let store = InMemoryScenarioStore::new();
        assert_eq!(store.latest_ingested_at().await.ok(), Some(None));

        let written = store
            .replace_run("run-a", &[record("run-a", "sc-1", Utc::now())], 50)
            .await;
        assert!(written.is_ok());

        let latest = store.latest_ingested_at().await.unwrap_or_default();
        assert!(latest.is_some());
    }

    #[tokio::test]
    async fn zero_batch_size_is_rejected() {
        let store = InMemoryScenarioStore::new();
        let result = store
            .replace_run("run-a", &[record("run-a", "sc-1", Utc::now())], 0)
            .await;
        assert!(result.is_err());
    }
}
