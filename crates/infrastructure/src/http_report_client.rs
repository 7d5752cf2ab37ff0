//! HTTP client for the upstream automation reports API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use runlens_application::{ReportClient, RunSummary};
use runlens_core::{AppError, AppResult};

/// Reqwest-backed implementation of the report client port.
#[derive(Clone)]
pub struct HttpReportClient {
    http_client: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

#[derive(Debug, Deserialize)]
struct RunListingResponse {
    #[serde(default)]
    data: Vec<Value>,
}

impl HttpReportClient {
    /// Creates a client against the given base URL.
    ///
    /// Every request carries `timeout`, so a hung upstream call surfaces as
    /// a recoverable remote error instead of blocking the caller.
    pub fn new(
        base_url: impl Into<String>,
        bearer_token: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            bearer_token: bearer_token.into(),
        })
    }

    async fn get_json(&self, endpoint: String, query: &[(&str, &str)]) -> AppResult<Value> {
        let response = self
            .http_client
            .get(&endpoint)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.bearer_token),
            )
            .query(query)
            .send()
            .await
            .map_err(|error| AppError::Remote(format!("failed to call '{endpoint}': {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Remote(format!(
                "'{endpoint}' returned status {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        response.json::<Value>().await.map_err(|error| {
            AppError::Remote(format!(
                "failed to parse response body from '{endpoint}': {error}"
            ))
        })
    }
}

#[async_trait]
impl ReportClient for HttpReportClient {
    async fn list_runs(&self) -> AppResult<Vec<RunSummary>> {
        let payload = self
            .get_json(format!("{}/getruns", self.base_url), &[])
            .await?;

        let listing: RunListingResponse = serde_json::from_value(payload)
            .map_err(|error| AppError::Remote(format!("unexpected run listing format: {error}")))?;

        let mut runs = Vec::with_capacity(listing.data.len());
        for entry in listing.data {
            let Some(run_id) = run_id_string(&entry) else {
                warn!("run listing entry has no usable runId; skipping entry");
                continue;
            };

            runs.push(RunSummary {
                created_timestamp: parse_created_timestamp(&entry),
                run_id,
            });
        }

        Ok(runs)
    }

    async fn fetch_report(&self, run_id: &str) -> AppResult<Value> {
        self.get_json(
            format!("{}/reportbyrunid", self.base_url),
            &[("runId", run_id)],
        )
        .await
    }
}

/// Normalizes an upstream run identifier, which arrives as a string or number.
fn run_id_string(entry: &Value) -> Option<String> {
    match entry.get("runId")? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Parses the listing timestamp, accepting RFC 3339 and naive ISO forms.
fn parse_created_timestamp(entry: &Value) -> Option<DateTime<Utc>> {
    let text = entry.get("createdTimestamp")?.as_str()?;

    if let Ok(value) = text.parse::<DateTime<Utc>>() {
        return Some(value);
    }

    text.parse::<NaiveDateTime>()
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{parse_created_timestamp, run_id_string};

    #[test]
    fn run_ids_are_normalized_to_strings() {
        assert_eq!(
            run_id_string(&json!({"runId": "run-42"})),
            Some("run-42".to_owned())
        );
        assert_eq!(run_id_string(&json!({"runId": 42})), Some("42".to_owned()));
        assert_eq!(run_id_string(&json!({"runId": null})), None);
        assert_eq!(run_id_string(&json!({})), None);
    }

    #[test]
    fn listing_timestamps_accept_both_iso_forms() {
        let with_zone = parse_created_timestamp(&json!({
            "createdTimestamp": "2025-06-09T12:00:00Z"
        }));
        assert!(with_zone.is_some());

        let naive = parse_created_timestamp(&json!({
            "createdTimestamp": "2025-06-09T12:00:00"
        }));
        assert_eq!(with_zone, naive);

        assert!(parse_created_timestamp(&json!({"createdTimestamp": "not a date"})).is_none());
        assert!(parse_created_timestamp(&json!({})).is_none());
    }
}
