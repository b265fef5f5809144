use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::ExecutorConfig;
use crate::models::JobUpdate;
use crate::store::JobStore;

/// Messages a simulated run picks from when it fails.
pub const FAILURE_MESSAGES: &[&str] = &[
    "Pipeline step 'variant_calling' failed: insufficient memory",
    "Reference genome file not found",
    "Sample quality check failed: low coverage",
    "Workflow execution timeout",
    "Invalid parameter configuration",
];

#[derive(Error, Debug)]
pub enum ExecutionFault {
    #[error("invalid duration range {min:?}..={max:?}")]
    InvalidDuration { min: Duration, max: Duration },

    #[error("invalid success rate {0}")]
    InvalidSuccessRate(f64),

    #[error("execution task aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Completed,
    Failed(&'static str),
}

/// Simulates running a pipeline: PENDING -> RUNNING -> COMPLETED | FAILED.
///
/// The executor never touches a job record directly; it only holds the job id
/// and goes through [`JobStore::update`] for every transition.
#[derive(Clone)]
pub struct PipelineExecutor {
    store: Arc<JobStore>,
    config: ExecutorConfig,
}

impl PipelineExecutor {
    pub fn new(store: Arc<JobStore>, config: ExecutorConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Starts the run in the background and returns immediately.
    ///
    /// The handle is only useful to tests; dropping it does not cancel the run.
    pub fn spawn(&self, job_id: Uuid, pipeline_name: String) -> JoinHandle<()> {
        let executor = self.clone();
        tokio::spawn(async move { executor.run(job_id, &pipeline_name).await })
    }

    /// Drives one job to a terminal state. Never returns an error: every fault
    /// after the job starts running ends as a FAILED record.
    pub async fn run(&self, job_id: Uuid, pipeline_name: &str) {
        tracing::info!(job_id = %job_id, pipeline = pipeline_name, "Starting mock pipeline execution");

        if let Err(e) = self.store.update(&job_id, JobUpdate::running(Utc::now())) {
            tracing::warn!(job_id = %job_id, error = %e, "Could not mark job as running");
            return;
        }
        tracing::info!(job_id = %job_id, "Job status updated to running");

        let config = self.config;
        let outcome = match tokio::spawn(simulate(config)).await {
            Ok(result) => result,
            Err(e) => Err(ExecutionFault::Aborted(e.to_string())),
        };

        let update = match outcome {
            Ok((duration, Outcome::Completed)) => {
                tracing::info!(
                    job_id = %job_id,
                    duration_secs = duration.as_secs_f64(),
                    "Job completed successfully"
                );
                JobUpdate::completed(Utc::now())
            }
            Ok((duration, Outcome::Failed(message))) => {
                tracing::warn!(
                    job_id = %job_id,
                    duration_secs = duration.as_secs_f64(),
                    error = message,
                    "Job failed"
                );
                JobUpdate::failed(Utc::now(), message)
            }
            Err(fault) => {
                let message = format!("Unexpected error during pipeline execution: {fault}");
                tracing::error!(job_id = %job_id, error = %fault, "Job encountered an error");
                JobUpdate::failed(Utc::now(), message)
            }
        };

        if let Err(e) = self.store.update(&job_id, update) {
            tracing::error!(job_id = %job_id, error = %e, "Could not record job outcome");
        }
    }
}

async fn simulate(config: ExecutorConfig) -> Result<(Duration, Outcome), ExecutionFault> {
    let duration = draw_duration(&config)?;
    tracing::debug!(duration_secs = duration.as_secs_f64(), "Simulated run scheduled");
    tokio::time::sleep(duration).await;
    let outcome = draw_outcome(&config)?;
    Ok((duration, outcome))
}

fn draw_duration(config: &ExecutorConfig) -> Result<Duration, ExecutionFault> {
    let (min, max) = (config.min_duration, config.max_duration);
    if min > max {
        return Err(ExecutionFault::InvalidDuration { min, max });
    }
    if min == max {
        return Ok(min);
    }
    let secs = rand::thread_rng().gen_range(min.as_secs_f64()..=max.as_secs_f64());
    Ok(Duration::from_secs_f64(secs))
}

fn draw_outcome(config: &ExecutorConfig) -> Result<Outcome, ExecutionFault> {
    let rate = config.success_rate;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ExecutionFault::InvalidSuccessRate(rate));
    }
    let mut rng = rand::thread_rng();
    if rng.gen::<f64>() < rate {
        return Ok(Outcome::Completed);
    }
    let message = FAILURE_MESSAGES[rng.gen_range(0..FAILURE_MESSAGES.len())];
    Ok(Outcome::Failed(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Job, JobStatus};
    use serde_json::json;

    fn fast_config(success_rate: f64) -> ExecutorConfig {
        ExecutorConfig::new(Duration::from_millis(10), Duration::from_millis(30), success_rate)
    }

    fn store_with_job() -> (Arc<JobStore>, Uuid) {
        let store = Arc::new(JobStore::new());
        let job = Job::new("test_pipeline".to_string(), json!({"test": "data"}), None, None);
        let id = store.create(job).unwrap().id;
        (store, id)
    }

    #[tokio::test]
    async fn run_with_full_success_rate_completes() {
        let (store, id) = store_with_job();
        let executor = PipelineExecutor::new(Arc::clone(&store), fast_config(1.0));

        executor.run(id, "test_pipeline").await;

        let job = store.get(&id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.error_message.is_none());
        let started = job.started_at.unwrap();
        let completed = job.completed_at.unwrap();
        assert!(started <= completed);
        assert!(job.updated_at >= completed);
    }

    #[tokio::test]
    async fn run_with_zero_success_rate_fails_with_canned_message() {
        let (store, id) = store_with_job();
        let executor = PipelineExecutor::new(Arc::clone(&store), fast_config(0.0));

        executor.run(id, "test_pipeline").await;

        let job = store.get(&id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.started_at.is_some());
        assert!(job.completed_at.is_some());
        let message = job.error_message.unwrap();
        assert!(!message.is_empty());
        assert!(FAILURE_MESSAGES.contains(&message.as_str()));
    }

    #[tokio::test]
    async fn run_contains_faults_as_failed_job() {
        let (store, id) = store_with_job();
        let config = ExecutorConfig::new(Duration::from_millis(50), Duration::from_millis(10), 1.0);
        let executor = PipelineExecutor::new(Arc::clone(&store), config);

        executor.run(id, "test_pipeline").await;

        let job = store.get(&id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.completed_at.is_some());
        assert!(job
            .error_message
            .unwrap()
            .starts_with("Unexpected error during pipeline execution:"));
    }

    #[tokio::test]
    async fn run_with_invalid_success_rate_fails() {
        let (store, id) = store_with_job();
        let executor = PipelineExecutor::new(Arc::clone(&store), fast_config(f64::NAN));

        executor.run(id, "test_pipeline").await;

        let job = store.get(&id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.error_message.unwrap().contains("invalid success rate"));
    }

    #[tokio::test]
    async fn run_for_missing_job_leaves_store_untouched() {
        let store = Arc::new(JobStore::new());
        let executor = PipelineExecutor::new(Arc::clone(&store), fast_config(1.0));

        executor.run(Uuid::new_v4(), "test_pipeline").await;

        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn spawn_does_not_wait_for_the_run() {
        let (store, id) = store_with_job();
        let config = ExecutorConfig::new(Duration::from_millis(200), Duration::from_millis(200), 1.0);
        let executor = PipelineExecutor::new(Arc::clone(&store), config);

        let handle = executor.spawn(id, "test_pipeline".to_string());
        let job = store.get(&id).unwrap();
        assert!(!job.status.is_terminal());

        handle.await.unwrap();
        assert_eq!(store.get(&id).unwrap().status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn concurrent_runs_each_reach_a_terminal_state() {
        let store = Arc::new(JobStore::new());
        let executor = PipelineExecutor::new(Arc::clone(&store), fast_config(0.5));

        let ids: Vec<Uuid> = (0..8)
            .map(|i| {
                let job = Job::new(format!("pipeline_{i}"), json!({}), None, None);
                store.create(job).unwrap().id
            })
            .collect();
        let handles: Vec<_> = ids
            .iter()
            .map(|id| executor.spawn(*id, "test_pipeline".to_string()))
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        for id in ids {
            let job = store.get(&id).unwrap();
            assert!(job.status.is_terminal());
            assert_eq!(job.error_message.is_some(), job.status == JobStatus::Failed);
        }
    }

    #[test]
    fn draw_duration_stays_in_range() {
        let config = ExecutorConfig::new(Duration::from_millis(100), Duration::from_millis(200), 0.8);
        for _ in 0..100 {
            let d = draw_duration(&config).unwrap();
            assert!(d >= Duration::from_millis(100) && d <= Duration::from_millis(200));
        }
    }

    #[test]
    fn draw_outcome_with_zero_rate_always_picks_a_canned_message() {
        let config = fast_config(0.0);
        for _ in 0..100 {
            match draw_outcome(&config).unwrap() {
                Outcome::Failed(message) => assert!(FAILURE_MESSAGES.contains(&message)),
                Outcome::Completed => panic!("zero success rate completed"),
            }
        }
    }

    #[test]
    fn draw_duration_with_equal_bounds() {
        let config = ExecutorConfig::new(Duration::from_millis(5), Duration::from_millis(5), 0.8);
        assert_eq!(draw_duration(&config).unwrap(), Duration::from_millis(5));
    }
}
