use chrono::{DateTime, Utc};
use runlens_core::{AppError, AppResult};

use crate::ScenarioStatus;

/// Row cap applied when a query carries no explicit time scope.
pub const UNSCOPED_RESULT_LIMIT: usize = 20;

/// Inclusive UTC time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a validated inclusive range.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Self> {
        if start > end {
            return Err(AppError::Validation(format!(
                "time range start {start} is after end {end}"
            )));
        }

        Ok(Self { start, end })
    }

    /// Returns the inclusive lower bound.
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the inclusive upper bound.
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// Declarative read plan executed against the scenario store.
///
/// Ordering is fixed: stores return rows by `created_timestamp` descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioQueryPlan {
    time_range: Option<TimeRange>,
    status: Option<ScenarioStatus>,
    limit: Option<usize>,
}

impl ScenarioQueryPlan {
    /// Builds a plan from the extracted filters.
    ///
    /// A query without a time scope is capped at [`UNSCOPED_RESULT_LIMIT`]
    /// rows; an explicit window is returned in full.
    #[must_use]
    pub fn from_filters(time_range: Option<TimeRange>, status: Option<ScenarioStatus>) -> Self {
        let limit = if time_range.is_none() {
            Some(UNSCOPED_RESULT_LIMIT)
        } else {
            None
        };

        Self {
            time_range,
            status,
            limit,
        }
    }

    /// Returns the inclusive time window, when present.
    #[must_use]
    pub fn time_range(&self) -> Option<TimeRange> {
        self.time_range
    }

    /// Returns the status filter, when present.
    #[must_use]
    pub fn status(&self) -> Option<ScenarioStatus> {
        self.status
    }

    /// Returns the row cap, when present.
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};
    use proptest::prelude::*;

    use crate::ScenarioStatus;

    use super::{ScenarioQueryPlan, TimeRange, UNSCOPED_RESULT_LIMIT};

    fn timestamp(offset_seconds: i64) -> DateTime<Utc> {
        DateTime::UNIX_EPOCH + Duration::seconds(offset_seconds)
    }

    #[test]
    fn time_range_rejects_inverted_bounds() {
        let range = TimeRange::new(timestamp(100), timestamp(99));
        assert!(range.is_err());
    }

    #[test]
    fn unscoped_plan_is_capped() {
        let plan = ScenarioQueryPlan::from_filters(None, Some(ScenarioStatus::Failed));
        assert_eq!(plan.limit(), Some(UNSCOPED_RESULT_LIMIT));
        assert_eq!(plan.status(), Some(ScenarioStatus::Failed));
        assert!(plan.time_range().is_none());
    }

    #[test]
    fn scoped_plan_is_unbounded() {
        let range = TimeRange::new(timestamp(0), timestamp(86399)).ok();
        assert!(range.is_some());

        let plan = ScenarioQueryPlan::from_filters(range, None);
        assert!(plan.limit().is_none());
        assert_eq!(plan.time_range(), range);
    }

    proptest! {
        #[test]
        fn time_range_accepts_exactly_the_ordered_pairs(
            start_seconds in -4_102_444_800_i64..4_102_444_800,
            end_seconds in -4_102_444_800_i64..4_102_444_800,
        ) {
            let range = TimeRange::new(timestamp(start_seconds), timestamp(end_seconds));
            prop_assert_eq!(range.is_ok(), start_seconds <= end_seconds);
        }
    }
}
