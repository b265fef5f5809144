pub mod client;
pub mod error;
pub mod utils;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub use client::JobClient;
pub use error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
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

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

/// A job as reported by the server.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct JobRecord {
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

impl JobRecord {
    /// Wall-clock run time, once the job has both started and finished.
    pub fn run_time(&self) -> Option<chrono::Duration> {
        Some(self.completed_at? - self.started_at?)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobListing {
    pub jobs: Vec<JobRecord>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Submission {
    pub pipeline_name: String,
    #[serde(default = "empty_object")]
    pub parameters: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_group: Option<String>,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl Submission {
    pub fn new(pipeline_name: impl Into<String>, parameters: Value) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            parameters,
            description: None,
            research_group: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_research_group(mut self, group: impl Into<String>) -> Self {
        self.research_group = Some(group.into());
        self
    }
}
