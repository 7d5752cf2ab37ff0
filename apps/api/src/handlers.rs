//! HTTP handlers for the query API.

use axum::Json;
use axum::extract::State;
use runlens_application::SearchReply;
use tracing::{error, info};

use crate::dto::{HealthResponse, QueryRequest, QueryResponse};
use crate::state::AppState;

/// Liveness probe.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "API is operational",
    })
}

/// Processes one natural-language scenario query.
///
/// Always answers with a structured body. A failed query-time ingestion
/// surfaces as an in-band retry message instead of silently serving stale
/// data.
pub async fn query_handler(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryResponse> {
    let query = request.query.trim();
    if query.is_empty() {
        return Json(QueryResponse::failure("No query provided"));
    }

    match state.search_service.process_query(query).await {
        Ok(SearchReply::Matches(results)) => {
            info!(count = results.len(), "query matched scenario rows");
            Json(QueryResponse::matches(results))
        }
        Ok(SearchReply::NoMatches { message }) => Json(QueryResponse::failure(message)),
        Err(error) if error.is_retryable() => {
            error!(error = %error, "query-time ingestion failed");
            Json(QueryResponse::failure(
                "Failed to update data from source. Please try again later.",
            ))
        }
        Err(error) => {
            error!(error = %error, "query processing failed");
            Json(QueryResponse::failure(format!(
                "Error processing query: {error}"
            )))
        }
    }
}
