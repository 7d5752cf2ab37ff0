//! Top-level query orchestration: freshness, interpretation, formatting.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Utc};
use runlens_core::AppResult;
use runlens_domain::{ScenarioQueryPlan, ScenarioRecord, ScenarioStatus, TimeRange};
use serde::Serialize;
use tracing::info;

use crate::ingestion_service::IngestionService;
use crate::search_ports::ScenarioStore;
use crate::status_filter::StatusFilterExtractor;
use crate::time_filter::TimeFilterExtractor;

/// Fixed display shape for one result row.
///
/// Missing stored fields render as empty strings so consumers never deal
/// with absent keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioRow {
    /// Run identifier.
    #[serde(rename = "Run ID")]
    pub run_id: String,
    /// Scenario identifier.
    #[serde(rename = "Scenario ID")]
    pub scenario_id: String,
    /// Scenario display name.
    #[serde(rename = "Scenario")]
    pub scenario: String,
    /// Process identifier.
    #[serde(rename = "Process ID")]
    pub process_id: String,
    /// Process display name.
    #[serde(rename = "Process")]
    pub process: String,
    /// Flow identifier.
    #[serde(rename = "Flow ID")]
    pub flow_id: String,
    /// Flow display name.
    #[serde(rename = "Flow")]
    pub flow: String,
    /// Scenario status text; empty when no status was derived.
    #[serde(rename = "Status")]
    pub status: String,
    /// Run timestamp in RFC 3339.
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

/// Reply for one processed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchReply {
    /// At least one row matched.
    Matches(Vec<ScenarioRow>),
    /// Nothing matched; carries a human-readable explanation.
    NoMatches {
        /// Why the query returned nothing, phrased for the end user.
        message: String,
    },
}

/// Scenario search entry point.
#[derive(Clone)]
pub struct ScenarioSearchService {
    ingestion: IngestionService,
    store: Arc<dyn ScenarioStore>,
    time_filter: TimeFilterExtractor,
    status_filter: StatusFilterExtractor,
}

impl ScenarioSearchService {
    /// Creates the service, compiling the phrase extractors.
    pub fn new(ingestion: IngestionService, store: Arc<dyn ScenarioStore>) -> AppResult<Self> {
        Ok(Self {
            ingestion,
            store,
            time_filter: TimeFilterExtractor::new()?,
            status_filter: StatusFilterExtractor::new()?,
        })
    }

    /// Ensures fresh data, then interprets and executes the query.
    ///
    /// A failed ingestion surfaces as the typed error so callers can tell
    /// the user to retry instead of silently serving stale data.
    pub async fn process_query(&self, query: &str) -> AppResult<SearchReply> {
        if self.ingestion.should_ingest().await? {
            self.ingestion.ingest_all().await?;
        }

        self.execute_query(query, Utc::now()).await
    }

    /// Interprets and executes the query against the store, relative to `now`.
    pub async fn execute_query(&self, query: &str, now: DateTime<Utc>) -> AppResult<SearchReply> {
        let time_range = self.time_filter.extract_at(query, now);
        let status = self.status_filter.extract(query);
        let plan = ScenarioQueryPlan::from_filters(time_range, status);

        let records = self.store.query_scenarios(&plan).await?;
        info!(count = records.len(), "scenario query executed");

        if records.is_empty() {
            return Ok(SearchReply::NoMatches {
                message: empty_result_message(status, time_range, now),
            });
        }

        Ok(SearchReply::Matches(
            records.iter().map(format_row).collect(),
        ))
    }
}

/// Maps a stored record onto the fixed display shape.
fn format_row(record: &ScenarioRecord) -> ScenarioRow {
    ScenarioRow {
        run_id: record.run_id.clone(),
        scenario_id: record.scenario_id.clone(),
        scenario: record.scenario_name.clone(),
        process_id: record.process_id.clone(),
        process: record.process_name.clone(),
        flow_id: record.flow_id.clone(),
        flow: record.flow_name.clone(),
        status: record
            .status
            .map(|status| status.as_str().to_owned())
            .unwrap_or_default(),
        timestamp: record.created_timestamp.to_rfc3339(),
    }
}

/// Builds the "no scenarios found" explanation from the effective filters.
fn empty_result_message(
    status: Option<ScenarioStatus>,
    time_range: Option<TimeRange>,
    now: DateTime<Utc>,
) -> String {
    let mut message = String::from("No scenarios found");

    if let Some(status) = status {
        message.push_str(&format!(" with status '{}'", status.as_str()));
    }

    if let Some(range) = time_range {
        message.push(' ');
        message.push_str(&describe_range(range, now));
    }

    message
}

/// Best-effort reverse mapping from a range back to its named bucket.
///
/// Messaging only; the checks run in a fixed order because the buckets
/// overlap, and the result never affects query correctness.
fn describe_range(range: TimeRange, now: DateTime<Utc>) -> String {
    let start = range.start();
    let end = range.end();

    if start.date_naive() == now.date_naive() {
        return "today".to_owned();
    }
    if (now - start).num_days() == 1 {
        return "yesterday".to_owned();
    }
    if (now - start).num_days() == 7 {
        return "for the last week".to_owned();
    }
    if start.day() == 1 && end.day() > 28 {
        return format!("for {}", start.format("%B %Y"));
    }
    if now - start <= Duration::hours(24) {
        return "in the last 24 hours".to_owned();
    }

    format!(
        "between {} and {}",
        start.format("%B %d, %Y"),
        end.format("%B %d, %Y")
    )
}
