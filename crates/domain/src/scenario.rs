use chrono::{DateTime, Utc};
use runlens_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Outcome of one scenario execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioStatus {
    /// Scenario completed successfully.
    Passed,
    /// Scenario completed with a failure.
    Failed,
}

impl ScenarioStatus {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "Passed",
            Self::Failed => "Failed",
        }
    }

    /// Parses a storage value into a status; the empty string means no status.
    pub fn parse_storage(value: &str) -> AppResult<Option<Self>> {
        match value {
            "Passed" => Ok(Some(Self::Passed)),
            "Failed" => Ok(Some(Self::Failed)),
            "" => Ok(None),
            other => Err(AppError::Parse(format!(
                "unknown scenario status '{other}'"
            ))),
        }
    }

    /// Derives a status from an upstream row result flag.
    #[must_use]
    pub fn from_row_passed(passed: bool) -> Self {
        if passed { Self::Passed } else { Self::Failed }
    }
}

/// One flattened scenario outcome within a run.
///
/// `(run_id, scenario_id)` is unique in the store; a run's full scenario set
/// is always replaced as a unit and never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    /// Upstream run identifier; the unit of ingestion and replacement.
    pub run_id: String,
    /// Scenario identifier, unique within a run.
    pub scenario_id: String,
    /// Scenario display name.
    pub scenario_name: String,
    /// Owning process identifier.
    pub process_id: String,
    /// Owning process display name.
    pub process_name: String,
    /// Owning flow identifier.
    pub flow_id: String,
    /// Owning flow display name.
    pub flow_name: String,
    /// Derived pass/fail status; `None` when the report carried no row results.
    pub status: Option<ScenarioStatus>,
    /// When the run occurred upstream, sourced from the run listing.
    pub created_timestamp: DateTime<Utc>,
}
