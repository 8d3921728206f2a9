//! reqwest-backed transport for the task-serving API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::error::ClientError;
use super::{BatchQuery, Submission, TaskTransport};
use crate::config::AgentConfig;
use crate::task::Task;

/// Body of `GET /tasks/next`.
#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    batch: Vec<Task>,
}

/// HTTP transport talking JSON to `{api_url}/tasks/*`.
pub struct HttpTransport {
    client: Client,
    next_url: String,
    submit_url: String,
}

impl HttpTransport {
    /// Build a transport for the configured API.
    pub fn new(config: &AgentConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            next_url: config.endpoint("tasks/next"),
            submit_url: config.endpoint("tasks/submit"),
        })
    }

    /// Turn a non-2xx response into a `ClientError::Status` with its body.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl TaskTransport for HttpTransport {
    async fn next_batch(&self, query: &BatchQuery) -> Result<Vec<Task>, ClientError> {
        let response = self
            .client
            .get(&self.next_url)
            .query(&query.params())
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body = response.text().await?;
        let parsed: BatchResponse = serde_json::from_str(&body).map_err(|e| {
            ClientError::Parse(format!("Failed to parse batch: {}, body: {}", e, body))
        })?;
        Ok(parsed.batch)
    }

    async fn submit(&self, submission: &Submission) -> Result<(), ClientError> {
        let response = self
            .client
            .post(&self.submit_url)
            .json(submission)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
