//! Run reports: what each annotator did and what it cost.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agents::BehaviorKind;
use crate::task::{Decision, GroundTruth};

/// Tallies for one annotator over a run.
///
/// # Invariants
/// - `submitted + dropped == decided`
/// - `mistakes <= decided`, `ambiguous <= decided`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatorReport {
    pub name: String,
    pub behavior: BehaviorKind,
    /// Batch requests made (including exhausted ones)
    pub batches: u32,
    /// Batch requests that exhausted every attempt
    pub failed_fetches: u32,
    pub decided: u64,
    pub submitted: u64,
    pub dropped: u64,
    /// Tasks without an oracle label, left untouched
    pub skipped: u64,
    /// Decisions whose label differs from the ground truth
    pub mistakes: u64,
    pub ambiguous: u64,
    /// Sum of simulated elapsed time over all decisions
    pub labor_cost_ms: f64,
    pub breaks: u32,
    pub final_energy: u32,
}

impl AnnotatorReport {
    pub fn new(name: impl Into<String>, behavior: BehaviorKind) -> Self {
        Self {
            name: name.into(),
            behavior,
            batches: 0,
            failed_fetches: 0,
            decided: 0,
            submitted: 0,
            dropped: 0,
            skipped: 0,
            mistakes: 0,
            ambiguous: 0,
            labor_cost_ms: 0.0,
            breaks: 0,
            final_energy: 0,
        }
    }

    /// Account for one decision and whether its submission went through.
    pub fn record(&mut self, decision: &Decision, truth: &GroundTruth, accepted: bool) {
        self.decided += 1;
        self.labor_cost_ms += decision.elapsed_ms();
        if decision.label() != truth.label() {
            self.mistakes += 1;
        }
        if decision.is_ambiguous() {
            self.ambiguous += 1;
        }
        if accepted {
            self.submitted += 1;
        } else {
            self.dropped += 1;
        }
    }

    /// Share of decisions matching the ground truth, if any were made.
    pub fn accuracy(&self) -> Option<f64> {
        (self.decided > 0).then(|| (self.decided - self.mistakes) as f64 / self.decided as f64)
    }

    /// Mean simulated time per decision, if any were made.
    pub fn mean_elapsed_ms(&self) -> Option<f64> {
        (self.decided > 0).then(|| self.labor_cost_ms / self.decided as f64)
    }
}

/// Outcome of a whole simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub annotators: Vec<AnnotatorReport>,
}

impl SimulationReport {
    /// Total simulated labor in seconds, the unit the dashboards chart.
    pub fn total_cost_secs(&self) -> f64 {
        self.annotators.iter().map(|a| a.labor_cost_ms).sum::<f64>() / 1000.0
    }

    /// Tasks the API accepted across all annotators.
    pub fn tasks_annotated(&self) -> u64 {
        self.annotators.iter().map(|a| a.submitted).sum()
    }

    pub fn annotator(&self, name: &str) -> Option<&AnnotatorReport> {
        self.annotators.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_tallies() {
        let mut report = AnnotatorReport::new("a", BehaviorKind::Honest);
        let truth = GroundTruth::new("Positive");
        report.record(&Decision::new("Positive", 4000.0), &truth, true);
        report.record(&Decision::new("Negative", 2000.0).ambiguous("?"), &truth, false);

        assert_eq!(report.decided, 2);
        assert_eq!(report.submitted, 1);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.mistakes, 1);
        assert_eq!(report.ambiguous, 1);
        assert_eq!(report.accuracy(), Some(0.5));
        assert_eq!(report.mean_elapsed_ms(), Some(3000.0));
    }

    #[test]
    fn test_empty_report_has_no_accuracy() {
        let report = AnnotatorReport::new("a", BehaviorKind::Spammer);
        assert_eq!(report.accuracy(), None);
        assert_eq!(report.mean_elapsed_ms(), None);
    }

    #[test]
    fn test_run_totals() {
        let mut a = AnnotatorReport::new("a", BehaviorKind::Honest);
        a.labor_cost_ms = 1500.0;
        a.submitted = 3;
        let mut b = AnnotatorReport::new("b", BehaviorKind::Fatigued);
        b.labor_cost_ms = 2500.0;
        b.submitted = 2;
        let now = Utc::now();
        let report = SimulationReport {
            run_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            annotators: vec![a, b],
        };
        assert_eq!(report.total_cost_secs(), 4.0);
        assert_eq!(report.tasks_annotated(), 5);
        assert!(report.annotator("b").is_some());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["annotators"][1]["behavior"], "fatigued");
    }
}
