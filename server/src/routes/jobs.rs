use axum::{routing::get, Router};

use crate::handlers::job_handlers::{get_job, list_jobs, submit_job};
use crate::state::AppState;

pub fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_jobs).post(submit_job))
        .route("/jobs/{job_id}", get(get_job))
}
