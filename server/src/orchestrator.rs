use async_trait::async_trait;
use thiserror::Error;

use crate::executor::PipelineExecutor;
use crate::models::Job;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("{backend} rejected job: {reason}")]
    Rejected { backend: &'static str, reason: String },
}

/// Hands a created job to whatever runs it.
///
/// `submit` must return without waiting for the job to run; the backend owns
/// the job's progress from then on and reports it through the job store.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    fn backend(&self) -> &'static str;

    /// Returns the backend's run identifier for the job.
    async fn submit(&self, job: &Job) -> Result<String, OrchestratorError>;
}

/// Runs jobs in-process with the simulated [`PipelineExecutor`].
pub struct MockOrchestrator {
    executor: PipelineExecutor,
}

impl MockOrchestrator {
    pub fn new(executor: PipelineExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Orchestrator for MockOrchestrator {
    fn backend(&self) -> &'static str {
        "mock"
    }

    async fn submit(&self, job: &Job) -> Result<String, OrchestratorError> {
        tracing::info!(job_id = %job.id, pipeline = %job.pipeline_name, "[Mock] Submitting job");
        // Detached: the run continues after the handle is dropped.
        drop(self.executor.spawn(job.id, job.pipeline_name.clone()));
        Ok(format!("mock-{}", job.id))
    }
}
