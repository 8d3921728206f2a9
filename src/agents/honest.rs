//! Honest annotator: reads every word, rarely slips.

use rand::Rng;

use super::{chance, pick_wrong_label, reading_time_ms, uniform, AgentState, Strategy};
use crate::task::{Decision, GroundTruth, Task};

/// Setup overhead range (context switch, finding the buttons).
const SETUP_MS: (f64, f64) = (2000.0, 4000.0);
/// Multiplicative speed variance range.
const VARIANCE: (f64, f64) = (0.8, 1.2);
/// Nobody reads and clicks faster than this.
const MIN_ELAPSED_MS: f64 = 3000.0;
const MISTAKE_RATE: f64 = 0.05;

/// A careful, engaged annotator.
#[derive(Debug, Clone)]
pub struct Honest {
    labels: Vec<String>,
}

impl Honest {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }
}

impl Strategy for Honest {
    fn decide<R: Rng + ?Sized>(
        &self,
        _state: &mut AgentState,
        task: &Task,
        truth: &GroundTruth,
        rng: &mut R,
    ) -> Decision {
        let mut elapsed = reading_time_ms(task) + uniform(rng, SETUP_MS.0, SETUP_MS.1);
        elapsed *= uniform(rng, VARIANCE.0, VARIANCE.1);
        let elapsed = elapsed.max(MIN_ELAPSED_MS);

        // A slip picks any other label; with no alternative the truth stands.
        let label = if chance(rng, MISTAKE_RATE) {
            pick_wrong_label(rng, &self.labels, truth).unwrap_or_else(|| truth.label().to_string())
        } else {
            truth.label().to_string()
        };

        Decision::new(label, elapsed)
    }
}
