use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "message": state.config.echo_message }))
}

/// GET /health
pub async fn health() -> Json<&'static str> {
    Json("OK")
}

/// GET /version
pub async fn version(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "version": state.config.image_tag }))
}
