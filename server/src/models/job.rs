use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Forward-only transitions. `Pending -> Failed` covers a job whose
    /// hand-off to the orchestrator never happened.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Pending, Running) | (Pending, Failed) | (Running, Completed) | (Running, Failed)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    pub pipeline_name: String,
    pub parameters: Value,
    pub description: Option<String>,
    pub research_group: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl Job {
    pub fn new(
        pipeline_name: String,
        parameters: Value,
        description: Option<String>,
        research_group: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: JobStatus::Pending,
            pipeline_name,
            parameters,
            description,
            research_group,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
            error_message: None,
        }
    }
}

/// Partial update applied by the store. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl JobUpdate {
    pub fn running(at: DateTime<Utc>) -> Self {
        Self {
            status: Some(JobStatus::Running),
            started_at: Some(at),
            ..Default::default()
        }
    }

    pub fn completed(at: DateTime<Utc>) -> Self {
        Self {
            status: Some(JobStatus::Completed),
            completed_at: Some(at),
            ..Default::default()
        }
    }

    pub fn failed(at: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            completed_at: Some(at),
            error_message: Some(message.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobSubmission {
    pub pipeline_name: String,
    /// Must be a JSON object; anything else is rejected while parsing.
    #[serde(default)]
    pub parameters: Map<String, Value>,
    pub description: Option<String>,
    pub research_group: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobList {
    pub jobs: Vec<Job>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    pub research_group: Option<String>,
    pub status: Option<JobStatus>,
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        let group_ok = match &self.research_group {
            Some(group) => job.research_group.as_deref() == Some(group.as_str()),
            None => true,
        };
        let status_ok = self.status.map_or(true, |status| job.status == status);
        group_ok && status_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_job_is_pending_with_matching_timestamps() {
        let job = Job::new("gatk_variant_calling".into(), json!({}), None, None);
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.created_at, job.updated_at);
        assert!(job.started_at.is_none());
        assert!(job.completed_at.is_none());
        assert!(job.error_message.is_none());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(JobStatus::Running).unwrap(), json!("running"));
        let parsed: JobStatus = serde_json::from_value(json!("failed")).unwrap();
        assert_eq!(parsed, JobStatus::Failed);
    }

    #[test]
    fn transitions_only_move_forward() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Running));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Completed));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Failed));
        assert!(!JobStatus::Running.can_transition_to(JobStatus::Pending));
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Failed));
        assert!(!JobStatus::Failed.can_transition_to(JobStatus::Running));
        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Completed));
    }

    #[test]
    fn unset_fields_serialize_as_null() {
        let job = Job::new("rnaseq_deseq2".into(), json!({"sample_id": "RNA_001"}), None, None);
        let value = serde_json::to_value(&job).unwrap();
        assert!(value["description"].is_null());
        assert!(value["research_group"].is_null());
        assert!(value["started_at"].is_null());
        assert!(value["completed_at"].is_null());
        assert!(value["error_message"].is_null());
        assert_eq!(value["status"], "pending");
    }

    #[test]
    fn submission_defaults_parameters_to_empty_object() {
        let submission: JobSubmission =
            serde_json::from_value(json!({"pipeline_name": "rnaseq_deseq2"})).unwrap();
        assert!(submission.parameters.is_empty());
        assert!(submission.description.is_none());
    }

    #[test]
    fn submission_rejects_non_object_parameters() {
        for parameters in [json!(["WGS_001"]), json!(null), json!("WGS_001")] {
            let parsed = serde_json::from_value::<JobSubmission>(json!({
                "pipeline_name": "gatk_variant_calling",
                "parameters": parameters,
            }));
            assert!(parsed.is_err());
        }
    }

    #[test]
    fn filter_matches_on_group_and_status() {
        let mut job = Job::new("x".into(), json!({}), None, Some("genomics_lab".into()));
        let filter = JobFilter {
            research_group: Some("genomics_lab".into()),
            status: Some(JobStatus::Pending),
        };
        assert!(filter.matches(&job));

        job.status = JobStatus::Running;
        assert!(!filter.matches(&job));
        assert!(JobFilter::default().matches(&job));

        let other_group = JobFilter {
            research_group: Some("clinical".into()),
            status: None,
        };
        assert!(!other_group.matches(&job));
    }
}
