//! Task client - the only network boundary of an annotator.
//!
//! Two operations, neither of which ever returns an error to the caller:
//! - `fetch_batch`: bounded attempts with linear backoff; exhaustion
//!   degrades to an empty batch
//! - `submit_task`: a single attempt; failure is logged and dropped
//!
//! The wire protocol sits behind `TaskTransport` so tests can script
//! server behavior without a live API.

mod error;
mod http;

pub use error::ClientError;
pub use http::HttpTransport;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::AgentConfig;
use crate::task::{Decision, Task};

/// Query parameters of `GET /tasks/next`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchQuery {
    pub dataset_id: Option<String>,
    pub user_id: String,
    pub batch_size: usize,
}

impl BatchQuery {
    /// Role under which simulated annotators request work.
    pub const ROLE: &'static str = "annotator";

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);
        if let Some(dataset_id) = &self.dataset_id {
            params.push(("datasetId", dataset_id.clone()));
        }
        params.push(("userId", self.user_id.clone()));
        params.push(("batchSize", self.batch_size.to_string()));
        params.push(("role", Self::ROLE.to_string()));
        params
    }
}

/// Body of `POST /tasks/submit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub task_id: String,
    pub dataset_id: Option<String>,
    pub label: String,
    pub labor_cost_ms: u64,
    pub annotator_id: String,
    pub is_ambiguous: bool,
    pub confusion_note: Option<String>,
}

/// Wire protocol of the task-serving API.
#[async_trait]
pub trait TaskTransport: Send + Sync {
    /// One `GET /tasks/next` round trip.
    async fn next_batch(&self, query: &BatchQuery) -> Result<Vec<Task>, ClientError>;

    /// One `POST /tasks/submit` round trip.
    async fn submit(&self, submission: &Submission) -> Result<(), ClientError>;
}

/// Result of a bounded fetch.
#[derive(Debug)]
pub enum BatchOutcome {
    /// The server answered; the batch may be empty.
    Fetched { tasks: Vec<Task>, attempts: u32 },
    /// Every attempt failed.
    Exhausted { attempts: u32, last_error: ClientError },
}

impl BatchOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Fetched { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// The fetched tasks, or nothing if the fetch was exhausted.
    pub fn into_tasks(self) -> Vec<Task> {
        match self {
            Self::Fetched { tasks, .. } => tasks,
            Self::Exhausted { .. } => Vec::new(),
        }
    }
}

/// Result of a single submission attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    Accepted,
    Dropped(ClientError),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Network client for one annotator.
pub struct TaskClient {
    transport: Arc<dyn TaskTransport>,
    annotator_id: String,
    default_dataset: Option<String>,
    batch_size: usize,
    base_delay: Duration,
}

impl TaskClient {
    /// Create a client speaking HTTP to the configured API.
    pub fn new(config: &AgentConfig, annotator_id: impl Into<String>) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport), config, annotator_id))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(
        transport: Arc<dyn TaskTransport>,
        config: &AgentConfig,
        annotator_id: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            annotator_id: annotator_id.into(),
            default_dataset: config.dataset_id.clone(),
            batch_size: config.batch_size,
            base_delay: config.retry_base_delay,
        }
    }

    pub fn annotator_id(&self) -> &str {
        &self.annotator_id
    }

    /// Pause after failed attempt `attempt` (1-based): `base_delay * attempt`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Fetch the next batch assigned to this annotator.
    ///
    /// Makes at most `max_retries` attempts (at least one). Between attempts
    /// sleeps `backoff_delay(n)`; there is no sleep after the last one. A
    /// response that does not parse ends the fetch without another attempt.
    pub async fn fetch_batch(&self, dataset_id: Option<&str>, max_retries: u32) -> BatchOutcome {
        let max_attempts = max_retries.max(1);
        let query = BatchQuery {
            dataset_id: dataset_id
                .map(str::to_string)
                .or_else(|| self.default_dataset.clone()),
            user_id: self.annotator_id.clone(),
            batch_size: self.batch_size,
        };

        let mut attempt = 1;
        loop {
            match self.transport.next_batch(&query).await {
                Ok(tasks) => {
                    if attempt > 1 {
                        tracing::info!(
                            "[{}] fetch succeeded on attempt {}",
                            self.annotator_id,
                            attempt
                        );
                    }
                    tracing::debug!("[{}] fetched {} tasks", self.annotator_id, tasks.len());
                    return BatchOutcome::Fetched {
                        tasks,
                        attempts: attempt,
                    };
                }
                Err(error) if error.is_transient() && attempt < max_attempts => {
                    let delay = self.backoff_delay(attempt);
                    tracing::warn!(
                        "[{}] fetch attempt {}/{} failed, retrying in {:?}: {}",
                        self.annotator_id,
                        attempt,
                        max_attempts,
                        delay,
                        error
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    tracing::error!(
                        "[{}] fetch failed after {} attempt(s), continuing with an empty batch: {}",
                        self.annotator_id,
                        attempt,
                        error
                    );
                    return BatchOutcome::Exhausted {
                        attempts: attempt,
                        last_error: error,
                    };
                }
            }
        }
    }

    /// Submit one decision. Not retried; a failure is logged and dropped.
    pub async fn submit_task(&self, task: &Task, decision: &Decision) -> SubmitOutcome {
        let submission = Submission {
            task_id: task.id.clone(),
            dataset_id: task
                .dataset_id
                .clone()
                .or_else(|| self.default_dataset.clone()),
            label: decision.label().to_string(),
            labor_cost_ms: decision.labor_cost_ms(),
            annotator_id: self.annotator_id.clone(),
            is_ambiguous: decision.is_ambiguous(),
            confusion_note: decision.confusion_note().map(str::to_string),
        };

        match self.transport.submit(&submission).await {
            Ok(()) => SubmitOutcome::Accepted,
            Err(error) => {
                match (error.status_code(), error.body()) {
                    (Some(status), Some(body)) => tracing::error!(
                        "[{}] submit of task {} failed (HTTP {}): {}",
                        self.annotator_id,
                        task.id,
                        status,
                        body
                    ),
                    _ => tracing::error!(
                        "[{}] submit of task {} failed: {}",
                        self.annotator_id,
                        task.id,
                        error
                    ),
                }
                SubmitOutcome::Dropped(error)
            }
        }
    }
}
