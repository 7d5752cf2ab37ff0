//! Application services and ports for scenario search.

#![forbid(unsafe_code)]

mod ingestion_service;
mod report_flattener;
mod scenario_search_service;
mod search_ports;
mod status_filter;
mod time_filter;

pub use ingestion_service::{INGEST_BATCH_SIZE, IngestionService, IngestionSummary};
pub use report_flattener::{FlattenedRun, flatten_report};
pub use scenario_search_service::{ScenarioRow, ScenarioSearchService, SearchReply};
pub use search_ports::{ReportClient, RunSummary, ScenarioStore};
pub use status_filter::StatusFilterExtractor;
pub use time_filter::TimeFilterExtractor;
