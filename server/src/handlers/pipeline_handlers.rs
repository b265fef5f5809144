use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// GET /pipelines
pub async fn list_pipelines(State(state): State<AppState>) -> Json<Value> {
    Json(state.registry.describe_all())
}

/// GET /pipelines/{name}
pub async fn get_pipeline(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>> {
    state
        .registry
        .describe(&name)
        .map(Json)
        .map_err(|_| ApiError::PipelineNotFound(name))
}

/// GET /orchestrator/status
pub async fn orchestrator_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "backend": state.orchestrator.backend(),
        "status": "healthy",
        "supported_pipelines": state.registry.names(),
    }))
}
