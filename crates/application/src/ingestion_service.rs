//! Staleness-gated ingestion of upstream run reports into the record store.

use std::sync::Arc;

use chrono::{Duration, Utc};
use runlens_core::AppResult;
use tracing::{info, warn};

use crate::report_flattener::flatten_report;
use crate::search_ports::{ReportClient, ScenarioStore};

/// Rows per insert chunk when replacing a run.
pub const INGEST_BATCH_SIZE: usize = 50;

/// Hours after which stored records are considered stale.
const STALENESS_WINDOW_HOURS: i64 = 24;

/// Counters describing one ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionSummary {
    /// Runs whose rows were replaced.
    pub runs_ingested: usize,
    /// Runs skipped after a fetch failure or an empty flatten.
    pub runs_skipped: usize,
    /// Total records written across all runs.
    pub records_written: usize,
}

/// Coordinates fetching, flattening, and per-run replacement.
#[derive(Clone)]
pub struct IngestionService {
    client: Arc<dyn ReportClient>,
    store: Arc<dyn ScenarioStore>,
}

impl IngestionService {
    /// Creates the service from its collaborator ports.
    #[must_use]
    pub fn new(client: Arc<dyn ReportClient>, store: Arc<dyn ScenarioStore>) -> Self {
        Self { client, store }
    }

    /// Returns whether the store is empty or stale past the 24-hour window.
    pub async fn should_ingest(&self) -> AppResult<bool> {
        let Some(latest) = self.store.latest_ingested_at().await? else {
            info!("no prior ingestion found; running initial ingestion");
            return Ok(true);
        };

        let age = Utc::now() - latest;
        if age > Duration::hours(STALENESS_WINDOW_HOURS) {
            info!(
                age_hours = age.num_hours(),
                "stored records are stale; ingestion due"
            );
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Ingests every available run.
    ///
    /// A run listing failure aborts the pass before any write. A fetch
    /// failure or empty flatten for an individual run skips that run only;
    /// the remaining runs still ingest. Every run's rows are replaced as a
    /// unit, so re-ingesting the same upstream snapshot is idempotent.
    pub async fn ingest_all(&self) -> AppResult<IngestionSummary> {
        let runs = self.client.list_runs().await?;
        if runs.is_empty() {
            warn!("run listing is empty; nothing to ingest");
            return Ok(IngestionSummary::default());
        }

        let mut summary = IngestionSummary::default();
        let mut collected = Vec::new();

        for run in &runs {
            let payload = match self.client.fetch_report(run.run_id.as_str()).await {
                Ok(payload) => payload,
                Err(error) => {
                    warn!(
                        run_id = %run.run_id,
                        error = %error,
                        "failed to fetch run report; skipping run"
                    );
                    summary.runs_skipped += 1;
                    continue;
                }
            };

            let flattened = flatten_report(run.run_id.as_str(), run.created_timestamp, &payload);
            for warning in &flattened.warnings {
                warn!(run_id = %run.run_id, "{warning}");
            }

            if flattened.records.is_empty() {
                warn!(run_id = %run.run_id, "report produced no scenario records; skipping run");
                summary.runs_skipped += 1;
                continue;
            }

            collected.push((run.run_id.clone(), flattened.records));
        }

        for (run_id, records) in &collected {
            self.store
                .replace_run(run_id.as_str(), records, INGEST_BATCH_SIZE)
                .await?;
            summary.runs_ingested += 1;
            summary.records_written += records.len();
        }

        info!(
            runs_ingested = summary.runs_ingested,
            runs_skipped = summary.runs_skipped,
            records_written = summary.records_written,
            "ingestion pass complete"
        );

        Ok(summary)
    }
}
