//! Task and ground-truth types as served by the task API.
//!
//! # Invariants
//! - A `Task` is immutable once fetched; agents only borrow it while deciding.
//! - `GroundTruth` is a simulation-only oracle and never leaves the process.

use serde::{Deserialize, Serialize};

/// A unit of labeling work handed out by the task-serving API.
///
/// Deserialization accepts both the flat shape (`id`, `text`, `datasetId`)
/// and the stored document shape (`_id`, `data.text`, `projectId`). When a
/// document carries both spellings of a field, the first non-null one wins:
/// `id` over `_id`, `datasetId` over `projectId` over `dataset_id`, and
/// `ground_truth` over `groundTruth`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTask")]
pub struct Task {
    /// Server-assigned identifier
    pub id: String,

    /// Text content to be labeled
    pub text: String,

    /// Dataset/project the task belongs to
    #[serde(rename = "datasetId", skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,

    /// Free-form payload of the stored document (may hold `text`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// True label, present only when the server runs in simulation mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_truth: Option<String>,
}

/// Wire form of a task with every accepted spelling kept apart.
#[derive(Debug, Deserialize)]
struct RawTask {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "datasetId")]
    dataset_id: Option<String>,
    #[serde(default, rename = "projectId")]
    project_id: Option<String>,
    #[serde(default, rename = "dataset_id")]
    dataset_id_snake: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    ground_truth: Option<String>,
    #[serde(default, rename = "groundTruth")]
    ground_truth_camel: Option<String>,
}

impl TryFrom<RawTask> for Task {
    type Error = String;

    fn try_from(raw: RawTask) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .or(raw.mongo_id)
            .ok_or_else(|| "task has neither `id` nor `_id`".to_string())?;
        Ok(Self {
            id,
            text: raw.text.unwrap_or_default(),
            dataset_id: raw.dataset_id.or(raw.project_id).or(raw.dataset_id_snake),
            data: raw.data,
            ground_truth: raw.ground_truth.or(raw.ground_truth_camel),
        })
    }
}

impl Task {
    /// Create a task with plain text content.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            dataset_id: None,
            data: None,
            ground_truth: None,
        }
    }

    /// Attach a dataset identifier.
    pub fn with_dataset(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = Some(dataset_id.into());
        self
    }

    /// Attach the simulation oracle label.
    pub fn with_ground_truth(mut self, label: impl Into<String>) -> Self {
        self.ground_truth = Some(label.into());
        self
    }

    /// The text to read, falling back to `data.text` for stored documents.
    pub fn content(&self) -> &str {
        if !self.text.is_empty() {
            return &self.text;
        }
        self.data
            .as_ref()
            .and_then(|d| d.get("text"))
            .and_then(|t| t.as_str())
            .unwrap_or("")
    }

    /// Number of whitespace-separated words in the content.
    ///
    /// Empty or blank content counts as 0 words, not 1.
    pub fn word_count(&self) -> usize {
        self.content().split_whitespace().count()
    }

    /// The oracle label for this task, if the server supplied one.
    pub fn oracle(&self) -> Option<GroundTruth> {
        self.ground_truth.as_deref().map(GroundTruth::new)
    }
}

/// The true label of a task. Used only to drive simulated behavior.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroundTruth(String);

impl GroundTruth {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn label(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroundTruth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
