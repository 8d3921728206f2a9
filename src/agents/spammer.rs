//! Spammer annotator: clicks through most tasks at random, but not all of
//! them, so that simple "always wrong" detectors miss it.

use rand::Rng;

use super::{chance, pick, uniform, AgentState, Strategy};
use crate::task::{Decision, GroundTruth, Task};

const SPAM_RATE: f64 = 0.7;
const SPAM_MS: (f64, f64) = (500.0, 1500.0);
/// Even when behaving, faster than any honest annotator.
const BEHAVING_MS: (f64, f64) = (1500.0, 2500.0);

/// An adversarial annotator.
#[derive(Debug, Clone)]
pub struct Spammer {
    labels: Vec<String>,
}

impl Spammer {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }
}

impl Strategy for Spammer {
    fn decide<R: Rng + ?Sized>(
        &self,
        _state: &mut AgentState,
        _task: &Task,
        truth: &GroundTruth,
        rng: &mut R,
    ) -> Decision {
        if chance(rng, SPAM_RATE) {
            let label = pick(rng, &self.labels)
                .cloned()
                .unwrap_or_else(|| truth.label().to_string());
            Decision::new(label, uniform(rng, SPAM_MS.0, SPAM_MS.1))
        } else {
            Decision::new(truth.label(), uniform(rng, BEHAVING_MS.0, BEHAVING_MS.1))
        }
    }
}
