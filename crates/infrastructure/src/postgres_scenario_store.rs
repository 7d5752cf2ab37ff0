//! PostgreSQL-backed scenario store using the `scenario_runs` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use runlens_application::ScenarioStore;
use runlens_core::{AppError, AppResult};
use runlens_domain::{ScenarioQueryPlan, ScenarioRecord, ScenarioStatus};

/// PostgreSQL implementation of the scenario store port.
#[derive(Clone)]
pub struct PostgresScenarioStore {
    pool: PgPool,
}

impl PostgresScenarioStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScenarioStore for PostgresScenarioStore {
    async fn query_scenarios(&self, plan: &ScenarioQueryPlan) -> AppResult<Vec<ScenarioRecord>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT run_id, scenario_id, scenario_name, process_id, process_name, \
             flow_id, flow_name, status, created_timestamp FROM scenario_runs WHERE TRUE",
        );

        if let Some(range) = plan.time_range() {
            builder.push(" AND created_timestamp >= ");
            builder.push_bind(range.start());
            builder.push(" AND created_timestamp <= ");
            builder.push_bind(range.end());
        }

        if let Some(status) = plan.status() {
            builder.push(" AND status = ");
            builder.push_bind(status.as_str());
        }

        builder.push(" ORDER BY created_timestamp DESC");

        if let Some(limit) = plan.limit() {
            let limit = i64::try_from(limit).map_err(|error| {
                AppError::Validation(format!("invalid scenario query limit: {error}"))
            })?;
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }

        let rows = builder
            .build_query_as::<ScenarioRunRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Storage(format!("failed to query scenario runs: {error}")))?;

        rows.into_iter().map(scenario_record_from_row).collect()
    }

    async fn latest_ingested_at(&self) -> AppResult<Option<DateTime<Utc>>> {
        sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            "SELECT max(last_updated_timestamp) FROM scenario_runs",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Storage(format!("failed to read latest ingestion timestamp: {error}"))
        })
    }

    async fn replace_run(
        &self,
        run_id: &str,
        records: &[ScenarioRecord],
        batch_size: usize,
    ) -> AppResult<()> {
        if batch_size == 0 {
            return Err(AppError::Validation(
                "insert batch size must be greater than zero".to_owned(),
            ));
        }

        // Delete and inserts commit together so no reader observes the run
        // half-replaced and a failed insert cannot lose the prior rows.
        let mut tx = self.pool.begin().await.map_err(|error| {
            AppError::Storage(format!(
                "failed to open replace transaction for run '{run_id}': {error}"
            ))
        })?;

        sqlx::query("DELETE FROM scenario_runs WHERE run_id = $1")
            .bind(run_id)
            .execute(&mut *tx)
            .await
            .map_err(|error| {
                AppError::Storage(format!("failed to delete rows for run '{run_id}': {error}"))
            })?;

        let written_at = Utc::now();
        for chunk in records.chunks(batch_size) {
            let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
                "INSERT INTO scenario_runs (run_id, scenario_id, scenario_name, process_id, \
                 process_name, flow_id, flow_name, status, created_timestamp, \
                 last_updated_timestamp) ",
            );

            builder.push_values(chunk, |mut row, record| {
                row.push_bind(record.run_id.as_str())
                    .push_bind(record.scenario_id.as_str())
                    .push_bind(record.scenario_name.as_str())
                    .push_bind(record.process_id.as_str())
                    .push_bind(record.process_name.as_str())
                    .push_bind(record.flow_id.as_str())
                    .push_bind(record.flow_name.as_str())
                    .push_bind(record.status.map(|status| status.as_str()).unwrap_or(""))
                    .push_bind(record.created_timestamp)
                    .push_bind(written_at);
            });

            builder.build().execute(&mut *tx).await.map_err(|error| {
                AppError::Storage(format!("failed to insert rows for run '{run_id}': {error}"))
            })?;
        }

        tx.commit().await.map_err(|error| {
            AppError::Storage(format!(
                "failed to commit replacement for run '{run_id}': {error}"
            ))
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ScenarioRunRow {
    run_id: String,
    scenario_id: String,
    scenario_name: String,
    process_id: String,
    process_name: String,
    flow_id: String,
    flow_name: String,
    status: String,
    created_timestamp: DateTime<Utc>,
}

fn scenario_record_from_row(row: ScenarioRunRow) -> AppResult<ScenarioRecord> {
    let status = ScenarioStatus::parse_storage(row.status.as_str())?;

    Ok(ScenarioRecord {
        run_id: row.run_id,
        scenario_id: row.scenario_id,
        scenario_name: row.scenario_name,
        process_id: row.process_id,
        process_name: row.process_name,
        flow_id: row.flow_id,
        flow_name: row.flow_name,
        status,
        created_timestamp: row.created_timestamp,
    })
}
