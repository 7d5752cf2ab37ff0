//! Flattens nested upstream run reports into scenario records.

use chrono::{DateTime, Utc};
use runlens_domain::{ScenarioRecord, ScenarioStatus};
use serde_json::Value;

/// Flattening outcome for one run.
#[derive(Debug, Clone, Default)]
pub struct FlattenedRun {
    /// Flat scenario records, one per `scenarioRunDetails` entry.
    pub records: Vec<ScenarioRecord>,
    /// Structural validation warnings accumulated during traversal.
    pub warnings: Vec<String>,
    /// True when the run listing carried no timestamp and the current
    /// instant was used instead.
    pub degraded_timestamp: bool,
}

/// Flattens one run's report payload into scenario records.
///
/// Traversal follows `data.processResults[run_id].processResults[*]
/// .flows[*].scenarioRunDetails[*]`. Missing or misshapen keys at any level
/// produce a warning and an empty branch instead of an error, so a
/// structurally malformed report yields zero records. The run's listing
/// timestamp is stamped on every record.
#[must_use]
pub fn flatten_report(
    run_id: &str,
    created_timestamp: Option<DateTime<Utc>>,
    payload: &Value,
) -> FlattenedRun {
    let mut outcome = FlattenedRun::default();

    let stamped = match created_timestamp {
        Some(value) => value,
        None => {
            outcome.degraded_timestamp = true;
            outcome.warnings.push(format!(
                "run '{run_id}' has no listing timestamp; falling back to the current instant"
            ));
            Utc::now()
        }
    };

    let Some(data) = payload.get("data") else {
        outcome
            .warnings
            .push(format!("run '{run_id}' report has no 'data' object"));
        return outcome;
    };

    let Some(process_results) = data.get("processResults").and_then(Value::as_object) else {
        outcome.warnings.push(format!(
            "run '{run_id}' report has no 'data.processResults' object"
        ));
        return outcome;
    };

    let Some(run_entry) = process_results.get(run_id) else {
        outcome
            .warnings
            .push(format!("run '{run_id}' is missing from 'processResults'"));
        return outcome;
    };

    let Some(processes) = run_entry.get("processResults").and_then(Value::as_array) else {
        outcome.warnings.push(format!(
            "run '{run_id}' entry has no nested 'processResults' list"
        ));
        return outcome;
    };

    for process in processes {
        let process_id = string_field(process, "processId");
        let process_name = string_field(process, "processName");

        let Some(flows) = process.get("flows").and_then(Value::as_array) else {
            outcome.warnings.push(format!(
                "process '{process_id}' in run '{run_id}' has no 'flows' list"
            ));
            continue;
        };

        for flow in flows {
            let flow_id = string_field(flow, "flowId");
            let flow_name = string_field(flow, "flowName");

            let Some(details) = flow.get("scenarioRunDetails").and_then(Value::as_array) else {
                outcome.warnings.push(format!(
                    "flow '{flow_id}' in run '{run_id}' has no 'scenarioRunDetails' list"
                ));
                continue;
            };

            for scenario in details {
                outcome.records.push(ScenarioRecord {
                    run_id: run_id.to_owned(),
                    scenario_id: string_field(scenario, "scenarioId"),
                    scenario_name: string_field(scenario, "scenarioName"),
                    process_id: process_id.clone(),
                    process_name: process_name.clone(),
                    flow_id: flow_id.clone(),
                    flow_name: flow_name.clone(),
                    status: derive_status(scenario),
                    created_timestamp: stamped,
                });
            }
        }
    }

    outcome
}

/// Reads a display field, normalizing numeric identifiers to strings and
/// absent values to the empty string.
fn string_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}

/// Derives the record status from the first `rowRunStatus` entry.
///
/// Multi-row scenarios are summarized by their first row; an empty or
/// absent map yields no status.
fn derive_status(scenario: &Value) -> Option<ScenarioStatus> {
    let rows = scenario.get("rowRunStatus")?.as_object()?;
    let (_, first) = rows.iter().next()?;
    Some(ScenarioStatus::from_row_passed(first.as_bool().unwrap_or(false)))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use runlens_domain::ScenarioStatus;
    use serde_json::json;

    use super::flatten_report;

    fn run_timestamp() -> DateTime<Utc> {
        "2025-06-09T12:00:00Z".parse().unwrap_or_default()
    }

    fn nested_report(run_id: &str) -> serde_json::Value {
        json!({
            "data": {
                "processResults": {
                    run_id: {
                        "processResults": [
                            {
                                "processId": 7,
                                "processName": "Billing",
                                "flows": [
                                    {
                                        "flowId": "flow-1",
                                        "flowName": "Invoice",
                                        "scenarioRunDetails": [
                                            {
                                                "scenarioId": "sc-1",
                                                "scenarioName": "Create invoice",
                                                "rowRunStatus": {"0": true}
                                            },
                                            {
                                                "scenarioId": "sc-2",
                                                "scenarioName": "Void invoice",
                                                "rowRunStatus": {"0": false, "1": true}
                                            },
                                            {
                                                "scenarioId": "sc-3",
                                                "scenarioName": "Refund invoice",
                                                "rowRunStatus": {}
                                            }
                                        ]
                                    }
                                ]
                            }
                        ]
                    }
                }
            }
        })
    }

    #[test]
    fn flattens_every_scenario_with_the_run_timestamp() {
        let outcome = flatten_report("run-1", Some(run_timestamp()), &nested_report("run-1"));

        assert_eq!(outcome.records.len(), 3);
        assert!(outcome.warnings.is_empty());
        assert!(!outcome.degraded_timestamp);
        assert!(
            outcome
                .records
                .iter()
                .all(|record| record.created_timestamp == run_timestamp())
        );
        assert_eq!(outcome.records[0].process_id, "7");
        assert_eq!(outcome.records[0].process_name, "Billing");
        assert_eq!(outcome.records[0].flow_name, "Invoice");
    }

    #[test]
    fn status_comes_from_the_first_row_entry() {
        let outcome = flatten_report("run-1", Some(run_timestamp()), &nested_report("run-1"));

        assert_eq!(outcome.records[0].status, Some(ScenarioStatus::Passed));
        assert_eq!(outcome.records[1].status, Some(ScenarioStatus::Failed));
    }

    #[test]
    fn empty_row_status_yields_a_record_with_no_status() {
        let outcome = flatten_report("run-1", Some(run_timestamp()), &nested_report("run-1"));

        assert_eq!(outcome.records[2].scenario_id, "sc-3");
        assert_eq!(outcome.records[2].status, None);
    }

    #[test]
    fn missing_process_results_yields_zero_records_and_a_warning() {
        let payload = json!({"data": {"unexpected": []}});
        let outcome = flatten_report("run-1", Some(run_timestamp()), &payload);

        assert!(outcome.records.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn run_absent_from_process_results_yields_zero_records() {
        let outcome = flatten_report("run-9", Some(run_timestamp()), &nested_report("run-1"));

        assert!(outcome.records.is_empty());
        assert!(!outcome.warnings.is_empty());
    }

    #[test]
    fn flow_without_details_warns_and_continues() {
        let payload = json!({
            "data": {
                "processResults": {
                    "run-1": {
                        "processResults": [
                            {
                                "processId": "p-1",
                                "processName": "Orders",
                                "flows": [
                                    {"flowId": "flow-a", "flowName": "Broken"},
                                    {
                                        "flowId": "flow-b",
                                        "flowName": "Working",
                                        "scenarioRunDetails": [
                                            {
                                                "scenarioId": "sc-9",
                                                "scenarioName": "Ship order",
                                                "rowRunStatus": {"0": true}
                                            }
                                        ]
                                    }
                                ]
                            }
                        ]
                    }
                }
            }
        });

        let outcome = flatten_report("run-1", Some(run_timestamp()), &payload);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].flow_id, "flow-b");
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn missing_listing_timestamp_degrades_instead_of_failing() {
        let outcome = flatten_report("run-1", None, &nested_report("run-1"));

        assert!(outcome.degraded_timestamp);
        assert_eq!(outcome.records.len(), 3);
        assert!(
            outcome
                .warnings
                .iter()
                .any(|warning| warning.contains("no listing timestamp"))
        );
    }
}
