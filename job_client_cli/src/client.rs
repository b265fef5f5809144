use std::time::Duration;

use backoff::{future::retry_notify, ExponentialBackoff, ExponentialBackoffBuilder};
use futures::stream::{self, StreamExt};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::{JobListing, JobRecord, JobStatus, Submission};

const DEFAULT_RETRY_BUDGET: Duration = Duration::from_secs(30);

/// Thin HTTP client for the job service.
///
/// Connection failures, timeouts and 5xx responses on reads are retried with
/// exponential backoff until the retry budget runs out. A submission is only
/// retried when the connection was never made, since the server may already
/// have recorded the job. Any other non-2xx response fails immediately.
pub struct JobClient {
    client: Client,
    base_url: Url,
    retry_budget: Duration,
}

impl JobClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            base_url,
            retry_budget: DEFAULT_RETRY_BUDGET,
        })
    }

    pub fn with_retry_budget(mut self, budget: Duration) -> Self {
        self.retry_budget = budget;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn submit(&self, submission: &Submission) -> Result<JobRecord> {
        let body = serde_json::to_value(submission)?;
        self.send(Method::POST, "jobs", &[], Some(&body)).await
    }

    pub async fn get(&self, id: Uuid) -> Result<JobRecord> {
        self.send(Method::GET, &format!("jobs/{id}"), &[], None).await
    }

    pub async fn list(
        &self,
        research_group: Option<&str>,
        status: Option<JobStatus>,
    ) -> Result<JobListing> {
        let mut query = Vec::new();
        if let Some(group) = research_group {
            query.push(("research_group", group.to_string()));
        }
        if let Some(status) = status {
            query.push(("status", status.as_str().to_string()));
        }
        self.send(Method::GET, "jobs", &query, None).await
    }

    /// Either the full catalogue or, with a name, one pipeline's schema and example.
    pub async fn pipelines(&self, name: Option<&str>) -> Result<Value> {
        let path = match name {
            Some(name) => format!("pipelines/{name}"),
            None => "pipelines".to_string(),
        };
        self.send(Method::GET, &path, &[], None).await
    }

    pub async fn orchestrator_status(&self) -> Result<Value> {
        self.send(Method::GET, "orchestrator/status", &[], None).await
    }

    pub async fn health(&self) -> Result<String> {
        self.send(Method::GET, "health", &[], None).await
    }

    /// Polls until the job is completed or failed.
    pub async fn wait_for_completion(
        &self,
        id: Uuid,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<JobRecord> {
        let poll = async {
            loop {
                let job = self.get(id).await?;
                if job.status.is_terminal() {
                    return Ok(job);
                }
                tracing::debug!(job_id = %id, status = job.status.as_str(), "Job still in progress");
                tokio::time::sleep(poll_interval).await;
            }
        };
        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| ClientError::Timeout(id))?
    }

    /// Submits every entry with at most `concurrency` requests in flight.
    /// Results come back in input order.
    pub async fn submit_batch(
        &self,
        submissions: Vec<Submission>,
        concurrency: usize,
    ) -> Vec<Result<JobRecord>> {
        stream::iter(submissions)
            .map(|submission| async move { self.submit(&submission).await })
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(200))
            .with_max_interval(Duration::from_secs(5))
            .with_max_elapsed_time(Some(self.retry_budget))
            .build()
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<T> {
        let url = self.base_url.join(path)?;
        retry_notify(
            self.backoff(),
            || self.attempt(&method, &url, query, body),
            |err: ClientError, wait: Duration| {
                tracing::warn!(url = %url, error = %err, retry_in = ?wait, "Request failed, retrying");
            },
        )
        .await
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        method: &Method,
        url: &Url,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> std::result::Result<T, backoff::Error<ClientError>> {
        let mut request = self.client.request(method.clone(), url.clone()).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        // POST /jobs creates a record on every delivery.
        let idempotent = method.is_idempotent();

        let response = request.send().await.map_err(|e| {
            if e.is_connect() || (idempotent && e.is_timeout()) {
                backoff::Error::transient(ClientError::Http(e))
            } else {
                backoff::Error::permanent(ClientError::Http(e))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| backoff::Error::permanent(ClientError::Http(e)));
        }

        let message = error_message(response).await;
        Err(match status {
            StatusCode::NOT_FOUND => backoff::Error::permanent(ClientError::NotFound(message)),
            s if s.is_server_error() && idempotent => {
                backoff::Error::transient(ClientError::Server { status: s, message })
            }
            s if s.is_server_error() => {
                backoff::Error::permanent(ClientError::Server { status: s, message })
            }
            s => backoff::Error::permanent(ClientError::Rejected { status: s, message }),
        })
    }
}

/// The service reports errors as `{"message": ...}`; fall back to the reason phrase.
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string())
}
