//! Agents module - synthetic annotators.
//!
//! # Behavior Types
//! - **Honest**: careful reader, rare mistakes
//! - **Fatigued**: energy drains per task; slower and sloppier as it drops
//! - **Spammer**: mostly random labels at inhuman speed, sometimes correct
//!
//! # Design Principles
//! - The behavior set is closed: `Behavior` is an enum and dispatch is an
//!   exhaustive `match`, so a variant without a decision rule does not compile
//! - Decisions are pure apart from the annotator's own `AgentState`
//! - Randomness is always passed in, so every behavior is seedable

mod annotator;
mod fatigued;
mod honest;
mod spammer;
mod types;

pub use annotator::Annotator;
pub use fatigued::Fatigued;
pub use honest::Honest;
pub use spammer::Spammer;
pub use types::{AgentError, AgentState, BehaviorKind, EnergyBand, MAX_ENERGY, RECOVERED_ENERGY};

use rand::Rng;

use crate::task::{Decision, GroundTruth, Task};

/// Reading speed shared by the human-like behaviors.
pub const READING_MS_PER_WORD: f64 = 200.0;

/// A decision rule for one behavioral model.
///
/// # Postconditions
/// - The returned `Decision` has a positive, finite `elapsed_ms`
/// - No I/O is performed; only `state` may be mutated
pub trait Strategy {
    fn decide<R: Rng + ?Sized>(
        &self,
        state: &mut AgentState,
        task: &Task,
        truth: &GroundTruth,
        rng: &mut R,
    ) -> Decision;
}

/// The configured behavior of an annotator.
#[derive(Debug, Clone)]
pub enum Behavior {
    Honest(Honest),
    Fatigued(Fatigued),
    Spammer(Spammer),
}

impl Behavior {
    /// Build the behavior for `kind` over the given label vocabulary.
    pub fn new(kind: BehaviorKind, labels: Vec<String>) -> Self {
        match kind {
            BehaviorKind::Honest => Self::Honest(Honest::new(labels)),
            BehaviorKind::Fatigued => Self::Fatigued(Fatigued::new(labels)),
            BehaviorKind::Spammer => Self::Spammer(Spammer::new(labels)),
        }
    }

    pub fn kind(&self) -> BehaviorKind {
        match self {
            Self::Honest(_) => BehaviorKind::Honest,
            Self::Fatigued(_) => BehaviorKind::Fatigued,
            Self::Spammer(_) => BehaviorKind::Spammer,
        }
    }
}

impl Strategy for Behavior {
    fn decide<R: Rng + ?Sized>(
        &self,
        state: &mut AgentState,
        task: &Task,
        truth: &GroundTruth,
        rng: &mut R,
    ) -> Decision {
        match self {
            Self::Honest(b) => b.decide(state, task, truth, rng),
            Self::Fatigued(b) => b.decide(state, task, truth, rng),
            Self::Spammer(b) => b.decide(state, task, truth, rng),
        }
    }
}

/// Uniform draw in `[lo, hi)`.
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    lo + rng.gen::<f64>() * (hi - lo)
}

/// Bernoulli trial with success probability `p`.
pub(crate) fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.gen::<f64>() < p
}

/// Uniformly pick one element; `None` for an empty slice.
pub(crate) fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let idx = (rng.gen::<f64>() * items.len() as f64) as usize;
    items.get(idx.min(items.len() - 1))
}

/// Uniformly pick a label other than `truth`; `None` if there is no such label.
pub(crate) fn pick_wrong_label<R: Rng + ?Sized>(
    rng: &mut R,
    labels: &[String],
    truth: &GroundTruth,
) -> Option<String> {
    let others: Vec<&String> = labels.iter().filter(|l| l.as_str() != truth.label()).collect();
    pick(rng, &others).map(|l| (*l).clone())
}

/// Reading time for a task at the shared reading speed.
pub(crate) fn reading_time_ms(task: &Task) -> f64 {
    task.word_count() as f64 * READING_MS_PER_WORD
}
