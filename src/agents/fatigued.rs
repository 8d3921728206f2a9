//! Fatigued annotator: an energy state machine.
//!
//! Every decision drains energy by a tier-dependent amount, then time cost
//! and error rate are derived from what is left:
//!
//! ```text
//!   energy   band       drain  penalty  mistake  ambiguous
//!   >= 50    fresh        2     x1.0     0.0       -
//!   40..49   tiring       3     x1.5     0.0       -
//!   20..39   tiring       3     x1.5     0.2       -
//!   15..19   exhausted    5     x4.5     0.5       -
//!   < 15     exhausted    5     x4.5     0.5      0.4
//! ```
//!
//! Drain is picked from the energy *before* the decision; everything else
//! from the energy *after* it. The only upward transition is a break, which
//! resets energy to `RECOVERED_ENERGY`.

use rand::Rng;

use super::{chance, pick, pick_wrong_label, reading_time_ms, uniform, AgentState, Strategy};
use crate::task::{Decision, GroundTruth, Task};

const BASE_SETUP_MS: f64 = 2000.0;
/// Extra setup time at zero energy (staring at the screen).
const FATIGUE_SETUP_MS: f64 = 6000.0;
const SETUP_NOISE_MS: f64 = 1000.0;

const TIRING_BELOW: u32 = 50;
const TIRING_PENALTY: f64 = 1.5;
const EXHAUSTED_BELOW: u32 = 20;
const EXHAUSTED_PENALTY: f64 = 3.0;

const GIVE_UP_BELOW: u32 = 15;
const GIVE_UP_RATE: f64 = 0.4;

/// Energy lost by one decision, chosen from the pre-decision level.
pub fn drop_rate(energy: u32) -> u32 {
    match energy {
        50.. => 2,
        20..=49 => 3,
        _ => 5,
    }
}

/// Probability of a fatigue mistake at the post-decision level.
pub fn mistake_rate(energy: u32) -> f64 {
    match energy {
        40.. => 0.0,
        20..=39 => 0.2,
        _ => 0.5,
    }
}

/// Combined slowdown at the post-decision level. Both tiers stack.
pub fn fatigue_penalty(energy: u32) -> f64 {
    let mut penalty = 1.0;
    if energy < TIRING_BELOW {
        penalty *= TIRING_PENALTY;
    }
    if energy < EXHAUSTED_BELOW {
        penalty *= EXHAUSTED_PENALTY;
    }
    penalty
}

/// An annotator whose speed and accuracy degrade with depleted energy.
#[derive(Debug, Clone)]
pub struct Fatigued {
    labels: Vec<String>,
}

impl Fatigued {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }
}

impl Strategy for Fatigued {
    fn decide<R: Rng + ?Sized>(
        &self,
        state: &mut AgentState,
        task: &Task,
        truth: &GroundTruth,
        rng: &mut R,
    ) -> Decision {
        let before = state.band();
        let energy = state.drain(drop_rate(state.energy()));
        let after = state.band();
        if after != before {
            tracing::info!(
                "[{}] energy {} -> {} ({})",
                state.name(),
                before,
                after,
                energy
            );
        }

        let fatigue = f64::from(100 - energy) / 100.0;
        let setup = BASE_SETUP_MS + fatigue * FATIGUE_SETUP_MS + uniform(rng, 0.0, SETUP_NOISE_MS);
        let elapsed = (reading_time_ms(task) + setup) * fatigue_penalty(energy);

        let mut label = truth.label().to_string();
        let p = mistake_rate(energy);
        if p > 0.0 && chance(rng, p) {
            label = pick_wrong_label(rng, &self.labels, truth)
                .or_else(|| pick(rng, &self.labels).cloned())
                .unwrap_or(label);
            tracing::debug!(
                "[{}] fatigue mistake on task {} (energy {}): {} instead of {}",
                state.name(),
                task.id,
                energy,
                label,
                truth
            );
        }

        let decision = Decision::new(label, elapsed);
        if energy < GIVE_UP_BELOW && chance(rng, GIVE_UP_RATE) {
            tracing::debug!("[{}] gave up on task {}", state.name(), task.id);
            return decision.ambiguous(format!("too tired to decide (energy {energy})"));
        }
        decision
    }
}
