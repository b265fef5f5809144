use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::pipelines::{FieldError, PipelineError};
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unknown pipeline '{name}'. Available: [{}]", .available.join(", "))]
    UnknownPipeline { name: String, available: Vec<String> },

    #[error("Invalid parameters for '{pipeline}'")]
    InvalidParameters {
        pipeline: String,
        errors: Vec<FieldError>,
    },

    #[error("Job {0} not found")]
    NotFound(Uuid),

    #[error("Pipeline '{0}' not found")]
    PipelineNotFound(String),

    #[error("{0}")]
    MalformedRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownPipeline { .. } | ApiError::InvalidParameters { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::PipelineNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MalformedRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::InvalidParameters { errors, .. } => json!({
                "message": self.to_string(),
                "errors": errors,
            }),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                json!({ "message": "Internal Server Error" })
            }
            _ => json!({ "message": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Unknown { name, available } => ApiError::UnknownPipeline { name, available },
            PipelineError::InvalidParameters { pipeline, errors } => {
                ApiError::InvalidParameters { pipeline, errors }
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => ApiError::NotFound(id),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}
