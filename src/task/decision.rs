//! The per-task output of a behavior strategy.

use serde::{Deserialize, Serialize};

/// Floor applied to degenerate elapsed times (non-finite or non-positive).
pub const DEGENERATE_ELAPSED_FLOOR_MS: f64 = 3000.0;

/// A labeling decision together with its simulated labor cost.
///
/// # Invariants
/// - `elapsed_ms` is finite and strictly positive (enforced in `new`, which
///   deserialization also goes through)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDecision")]
pub struct Decision {
    label: String,
    elapsed_ms: f64,
    is_ambiguous: bool,
    confusion_note: Option<String>,
}

#[derive(Deserialize)]
struct RawDecision {
    label: String,
    elapsed_ms: Option<f64>,
    #[serde(default)]
    is_ambiguous: bool,
    #[serde(default)]
    confusion_note: Option<String>,
}

impl From<RawDecision> for Decision {
    fn from(raw: RawDecision) -> Self {
        let mut decision = Self::new(raw.label, raw.elapsed_ms.unwrap_or(f64::NAN));
        decision.is_ambiguous = raw.is_ambiguous;
        decision.confusion_note = raw.confusion_note;
        decision
    }
}

impl Decision {
    /// Create a committed decision.
    pub fn new(label: impl Into<String>, elapsed_ms: f64) -> Self {
        let elapsed_ms = if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
            elapsed_ms
        } else {
            DEGENERATE_ELAPSED_FLOOR_MS
        };
        Self {
            label: label.into(),
            elapsed_ms,
            is_ambiguous: false,
            confusion_note: None,
        }
    }

    /// Flag the decision as ambiguous with an explanatory note.
    pub fn ambiguous(mut self, note: impl Into<String>) -> Self {
        self.is_ambiguous = true;
        self.confusion_note = Some(note.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Simulated time spent, always finite and positive.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn is_ambiguous(&self) -> bool {
        self.is_ambiguous
    }

    pub fn confusion_note(&self) -> Option<&str> {
        self.confusion_note.as_deref()
    }

    /// Elapsed time rounded to whole milliseconds, as reported to the API.
    pub fn labor_cost_ms(&self) -> u64 {
        self.elapsed_ms.round() as u64
    }
}
