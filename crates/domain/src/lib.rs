//! Domain types for scenario run records and query plans.

#![forbid(unsafe_code)]

mod query;
mod scenario;

pub use query::{ScenarioQueryPlan, TimeRange, UNSCOPED_RESULT_LIMIT};
pub use scenario::{ScenarioRecord, ScenarioStatus};
