use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{JobFilter, JobSubmission};
use crate::service;
use crate::state::AppState;

/// POST /jobs
pub async fn submit_job(
    State(state): State<AppState>,
    payload: std::result::Result<Json<JobSubmission>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(submission) = payload?;
    let job = service::submit_job(&state, submission).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /jobs/{job_id}
pub async fn get_job(
    State(state): State<AppState>,
    job_id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse> {
    let Path(job_id) = job_id?;
    let job = service::get_job(&state, job_id)?;
    Ok(Json(job))
}

/// GET /jobs?research_group=..&status=..
pub async fn list_jobs(
    State(state): State<AppState>,
    filter: std::result::Result<Query<JobFilter>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(filter) = filter?;
    Ok(Json(service::list_jobs(&state, &filter)))
}
