//! Job submission and lookup, independent of the HTTP layer.

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::{Job, JobFilter, JobList, JobSubmission, JobUpdate};
use crate::state::AppState;

/// Validates, records and hands off a job. Returns the PENDING record as soon
/// as the orchestrator has accepted it; the run itself happens later.
pub async fn submit_job(state: &AppState, submission: JobSubmission) -> Result<Job> {
    let params = state
        .registry
        .validate(&submission.pipeline_name, &Value::Object(submission.parameters))?;

    let job = Job::new(
        submission.pipeline_name,
        params.to_value(),
        submission.description,
        submission.research_group,
    );
    let job = state.store.create(job)?;
    tracing::info!(job_id = %job.id, pipeline = %params.pipeline(), "Job created");

    match state.orchestrator.submit(&job).await {
        Ok(run_id) => {
            tracing::info!(job_id = %job.id, run_id = %run_id, backend = state.orchestrator.backend(), "Job handed off");
            Ok(job)
        }
        Err(e) => {
            let message = format!("Submission to {} failed: {e}", state.orchestrator.backend());
            if let Err(store_err) = state.store.update(&job.id, JobUpdate::failed(Utc::now(), &message)) {
                tracing::error!(job_id = %job.id, error = %store_err, "Could not mark job as failed");
            }
            Err(ApiError::Internal(message))
        }
    }
}

pub fn get_job(state: &AppState, id: Uuid) -> Result<Job> {
    state.store.get(&id).ok_or(ApiError::NotFound(id))
}

/// Filters are applied in-process to a full snapshot of the store.
pub fn list_jobs(state: &AppState, filter: &JobFilter) -> JobList {
    let jobs: Vec<Job> = state
        .store
        .list_all()
        .into_iter()
        .filter(|job| filter.matches(job))
        .collect();
    JobList {
        total: jobs.len(),
        jobs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, ExecutorConfig};
    use crate::models::JobStatus;
    use crate::orchestrator::{Orchestrator, OrchestratorError};
    use async_trait::async_trait;
    use serde_json::{json, Map};
    use std::sync::Arc;
    use std::time::Duration;

    struct RejectingOrchestrator;

    #[async_trait]
    impl Orchestrator for RejectingOrchestrator {
        fn backend(&self) -> &'static str {
            "rejecting"
        }

        async fn submit(&self, _job: &Job) -> std::result::Result<String, OrchestratorError> {
            Err(OrchestratorError::Rejected {
                backend: "rejecting",
                reason: "queue full".to_string(),
            })
        }
    }

    fn test_state() -> AppState {
        AppState::new(AppConfig {
            executor: ExecutorConfig::new(Duration::from_secs(60), Duration::from_secs(60), 1.0),
            ..AppConfig::default()
        })
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn gatk_submission(sample: &str, group: Option<&str>) -> JobSubmission {
        JobSubmission {
            pipeline_name: "gatk_variant_calling".to_string(),
            parameters: object(json!({"sample_id": sample, "reference_genome": "hg38"})),
            description: None,
            research_group: group.map(String::from),
        }
    }

    #[tokio::test]
    async fn submit_returns_pending_record_and_stores_it() {
        let state = test_state();
        let job = submit_job(&state, gatk_submission("WGS_001", Some("genomics_lab")))
            .await
            .unwrap();

        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.created_at, job.updated_at);
        assert!(job.started_at.is_none());
        assert!(job.completed_at.is_none());
        assert!(job.error_message.is_none());
        assert_eq!(job.parameters["reference_genome"], "hg38");
        assert_eq!(state.store.get(&job.id).unwrap().research_group.as_deref(), Some("genomics_lab"));
    }

    #[tokio::test]
    async fn validation_failures_create_nothing() {
        let state = test_state();
        let unknown = JobSubmission {
            pipeline_name: "chip_seq_macs2".to_string(),
            parameters: Map::new(),
            description: None,
            research_group: None,
        };
        assert!(matches!(
            submit_job(&state, unknown).await,
            Err(ApiError::UnknownPipeline { .. })
        ));

        let invalid = JobSubmission {
            pipeline_name: "rnaseq_deseq2".to_string(),
            parameters: object(json!({"sample_id": "RNA_001", "reference": "mm10"})),
            description: None,
            research_group: None,
        };
        assert!(matches!(
            submit_job(&state, invalid).await,
            Err(ApiError::InvalidParameters { .. })
        ));
        assert_eq!(state.store.count(), 0);
    }

    #[tokio::test]
    async fn rejected_hand_off_fails_the_job() {
        let state = test_state().with_orchestrator(Arc::new(RejectingOrchestrator));

        let err = submit_job(&state, gatk_submission("WGS_001", None)).await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));

        let jobs = state.store.list_all();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].status, JobStatus::Failed);
        assert!(jobs[0].completed_at.is_some());
        assert!(jobs[0].error_message.as_deref().unwrap().contains("queue full"));
    }

    #[tokio::test]
    async fn get_job_reports_missing_id() {
        let state = test_state();
        let id = Uuid::new_v4();
        assert!(matches!(get_job(&state, id), Err(ApiError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn list_jobs_filters_and_counts() {
        let state = test_state();
        submit_job(&state, gatk_submission("WGS_001", Some("genomics_lab"))).await.unwrap();
        submit_job(&state, gatk_submission("WGS_002", Some("clinical"))).await.unwrap();
        let newest = submit_job(&state, gatk_submission("WGS_003", Some("genomics_lab")))
            .await
            .unwrap();

        let all = list_jobs(&state, &JobFilter::default());
        assert_eq!(all.total, 3);
        assert_eq!(all.jobs[0].id, newest.id);

        let genomics = list_jobs(
            &state,
            &JobFilter {
                research_group: Some("genomics_lab".into()),
                status: None,
            },
        );
        assert_eq!(genomics.total, 2);
        assert!(genomics
            .jobs
            .iter()
            .all(|job| job.research_group.as_deref() == Some("genomics_lab")));

        let completed = list_jobs(
            &state,
            &JobFilter {
                research_group: None,
                status: Some(JobStatus::Completed),
            },
        );
        assert_eq!(completed.total, 0);
        assert!(completed.jobs.is_empty());
    }
}
