//! Infrastructure adapters for the scenario search services.

#![forbid(unsafe_code)]

mod http_report_client;
mod in_memory_scenario_store;
mod postgres_scenario_store;

pub use http_report_client::HttpReportClient;
pub use in_memory_scenario_store::InMemoryScenarioStore;
pub use postgres_scenario_store::PostgresScenarioStore;
