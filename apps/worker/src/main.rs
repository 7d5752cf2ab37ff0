//! Runlens ingestion worker runtime.
//!
//! Re-checks the staleness gate on a poll interval and runs a full
//! ingestion pass whenever stored records have gone stale. The 24-hour
//! freshness decision lives in the gate, not the timer, so restarting the
//! worker never triggers a redundant ingestion.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use runlens_application::IngestionService;
use runlens_core::{AppError, AppResult};
use runlens_infrastructure::{HttpReportClient, PostgresScenarioStore};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct WorkerConfig {
    database_url: String,
    reports_base_url: String,
    reports_bearer_token: String,
    reports_timeout_secs: u64,
    poll_interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let pool = connect_pool(config.database_url.as_str()).await?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Storage(format!("failed to run migrations: {error}")))?;

    let ingestion_service = build_ingestion_service(&config, pool)?;

    info!(
        poll_interval_secs = config.poll_interval_secs,
        "runlens-worker started"
    );

    loop {
        run_ingestion_cycle(&ingestion_service).await;
        tokio::time::sleep(Duration::from_secs(config.poll_interval_secs)).await;
    }
}

/// Runs one gated ingestion attempt, logging instead of exiting on failure.
async fn run_ingestion_cycle(ingestion_service: &IngestionService) {
    match ingestion_service.should_ingest().await {
        Ok(false) => info!("stored records are fresh; skipping ingestion"),
        Ok(true) => match ingestion_service.ingest_all().await {
            Ok(summary) => info!(
                runs_ingested = summary.runs_ingested,
                runs_skipped = summary.runs_skipped,
                records_written = summary.records_written,
                "ingestion cycle complete"
            ),
            Err(error) => warn!(error = %error, "ingestion cycle failed"),
        },
        Err(error) => warn!(error = %error, "failed to evaluate staleness gate"),
    }
}

fn build_ingestion_service(config: &WorkerConfig, pool: PgPool) -> AppResult<IngestionService> {
    let store = Arc::new(PostgresScenarioStore::new(pool));
    let report_client = Arc::new(HttpReportClient::new(
        config.reports_base_url.clone(),
        config.reports_bearer_token.clone(),
        Duration::from_secs(config.reports_timeout_secs),
    )?);

    Ok(IngestionService::new(report_client, store))
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Storage(format!("failed to connect to database: {error}")))
}

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let reports_base_url = required_env("REPORTS_API_BASE_URL")?;
        let reports_bearer_token = required_env("REPORTS_API_BEARER_TOKEN")?;
        let reports_timeout_secs = parse_env_u64("REPORTS_API_TIMEOUT_SECS", 15)?;
        let poll_interval_secs = parse_env_u64("INGEST_POLL_INTERVAL_SECS", 3600)?;

        if poll_interval_secs == 0 {
            return Err(AppError::Validation(
                "INGEST_POLL_INTERVAL_SECS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            reports_base_url,
            reports_bearer_token,
            reports_timeout_secs,
            poll_interval_secs,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
