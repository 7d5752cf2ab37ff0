//! Maps pass/fail words in a query onto a status filter.

use regex::Regex;
use runlens_core::{AppError, AppResult};
use runlens_domain::ScenarioStatus;

/// Extracts a [`ScenarioStatus`] filter from a natural-language query.
///
/// Patterns are word-bounded and case-insensitive; the first match wins and
/// no match means all statuses.
#[derive(Debug, Clone)]
pub struct StatusFilterExtractor {
    patterns: Vec<(Regex, ScenarioStatus)>,
}

impl StatusFilterExtractor {
    /// Compiles the status phrase patterns.
    pub fn new() -> AppResult<Self> {
        let sources = [
            (r"(?i)\bpassed\b", ScenarioStatus::Passed),
            (r"(?i)\bfailed\b", ScenarioStatus::Failed),
        ];

        let mut patterns = Vec::with_capacity(sources.len());
        for (pattern, status) in sources {
            let regex = Regex::new(pattern).map_err(|error| {
                AppError::Internal(format!("invalid status pattern '{pattern}': {error}"))
            })?;
            patterns.push((regex, status));
        }

        Ok(Self { patterns })
    }

    /// Returns the first matching status, or `None` for all statuses.
    #[must_use]
    pub fn extract(&self, query: &str) -> Option<ScenarioStatus> {
        self.patterns
            .iter()
            .find(|(regex, _)| regex.is_match(query))
            .map(|(_, status)| *status)
    }
}

#[cfg(test)]
mod tests {
    use runlens_domain::ScenarioStatus;

    use super::StatusFilterExtractor;

    fn extractor() -> StatusFilterExtractor {
        match StatusFilterExtractor::new() {
            Ok(extractor) => extractor,
            Err(error) => panic!("failed to compile status patterns: {error}"),
        }
    }

    #[test]
    fn extracts_passed_and_failed() {
        assert_eq!(
            extractor().extract("show me all PASSED scenarios"),
            Some(ScenarioStatus::Passed)
        );
        assert_eq!(
            extractor().extract("which scenarios failed yesterday?"),
            Some(ScenarioStatus::Failed)
        );
    }

    #[test]
    fn requires_word_boundaries() {
        assert!(extractor().extract("surpassed expectations").is_none());
        assert!(extractor().extract("unfailed runs").is_none());
    }

    #[test]
    fn no_status_word_means_all_statuses() {
        assert!(extractor().extract("show me recent scenarios").is_none());
    }
}
