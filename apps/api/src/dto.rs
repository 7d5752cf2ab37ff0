//! Request and response payloads for the query API.

use runlens_application::ScenarioRow;
use serde::{Deserialize, Serialize};

/// Query request body.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// Natural-language query text.
    #[serde(default)]
    pub query: String,
}

/// Structured query response; failures are reported in-band.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    /// Whether the query produced results.
    pub success: bool,
    /// Number of returned rows.
    pub count: usize,
    /// Matching rows in display shape.
    pub results: Vec<ScenarioRow>,
    /// Failure or empty-result explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QueryResponse {
    /// Builds a successful response from result rows.
    #[must_use]
    pub fn matches(results: Vec<ScenarioRow>) -> Self {
        Self {
            success: true,
            count: results.len(),
            results,
            message: None,
        }
    }

    /// Builds an in-band failure response.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            count: 0,
            results: Vec::new(),
            message: Some(message.into()),
        }
    }
}

/// Health check payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service liveness indicator.
    pub status: &'static str,
    /// Human-readable liveness message.
    pub message: &'static str,
}
