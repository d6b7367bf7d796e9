//! HTTP surface for the analysis pipeline.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::error;

use folio_risk_runtime::{AnalysisResult, Pipeline, PipelineError};

pub const SERVICE_NAME: &str = "Risk Analyzer API";

/// A failed analysis, reported as `500 {"detail": "Analysis failed: ..."}`.
struct AnalysisFailure(PipelineError);

impl IntoResponse for AnalysisFailure {
    fn into_response(self) -> Response {
        if self.0.is_internal() {
            error!(error = %self.0, "pipeline invariant violated");
        }
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": format!("Analysis failed: {}", self.0) })),
        )
            .into_response()
    }
}

/// GET /
async fn service_info() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "analyze": "/analyze/{id}"
        }
    }))
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "risk-analyzer" }))
}

/// POST /analyze/{id}
///
/// Runs the full pipeline for one folio.
async fn analyze(
    State(pipeline): State<Arc<Pipeline>>,
    Path(id): Path<String>,
) -> Result<Json<AnalysisResult>, AnalysisFailure> {
    pipeline.run(&id).await.map(Json).map_err(AnalysisFailure)
}

/// Build the API routes around a shared pipeline.
pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/analyze/{id}", post(analyze))
        .with_state(pipeline)
}
