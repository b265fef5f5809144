use axum::{routing::get, Router};

use crate::handlers::meta_handlers::{health, root, version};
use crate::handlers::pipeline_handlers::{get_pipeline, list_pipelines, orchestrator_status};
use crate::state::AppState;

pub fn meta_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/pipelines", get(list_pipelines))
        .route("/pipelines/{name}", get(get_pipeline))
        .route("/orchestrator/status", get(orchestrator_status))
}
