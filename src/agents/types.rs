//! Core types for the annotator agents.

use serde::{Deserialize, Serialize};

use crate::client::ClientError;
use crate::config::ConfigError;

/// Upper bound of the energy gauge.
pub const MAX_ENERGY: u32 = 100;

/// Energy restored by a break. Recovery is deliberately incomplete.
pub const RECOVERED_ENERGY: u32 = 80;

/// Per-annotator mutable state.
///
/// # Invariants
/// - `energy <= MAX_ENERGY` (all writes go through `set_energy`/`drain`)
/// - `tasks_completed` only ever increases, once per accepted submission
///
/// Deserialized snapshots are clamped the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StateSnapshot")]
pub struct AgentState {
    name: String,
    energy: u32,
    tasks_completed: u64,
}

#[derive(Deserialize)]
struct StateSnapshot {
    name: String,
    energy: u32,
    #[serde(default)]
    tasks_completed: u64,
}

impl From<StateSnapshot> for AgentState {
    fn from(snapshot: StateSnapshot) -> Self {
        let mut state = Self::new(snapshot.name).with_energy(snapshot.energy);
        state.tasks_completed = snapshot.tasks_completed;
        state
    }
}

impl AgentState {
    /// Fresh state: full energy, nothing completed.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            energy: MAX_ENERGY,
            tasks_completed: 0,
        }
    }

    /// Start from a specific energy level (clamped).
    pub fn with_energy(mut self, energy: u32) -> Self {
        self.set_energy(energy);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn tasks_completed(&self) -> u64 {
        self.tasks_completed
    }

    pub fn band(&self) -> EnergyBand {
        EnergyBand::of(self.energy)
    }

    /// Lower energy by `amount`, flooring at zero. Returns the new level.
    pub fn drain(&mut self, amount: u32) -> u32 {
        self.energy = self.energy.saturating_sub(amount);
        self.energy
    }

    /// Set energy directly (clamped to `MAX_ENERGY`).
    pub fn set_energy(&mut self, energy: u32) {
        self.energy = energy.min(MAX_ENERGY);
    }

    /// Record one accepted submission.
    pub fn record_completion(&mut self) {
        self.tasks_completed += 1;
    }
}

/// Coarse energy tiers used for logging and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyBand {
    /// energy >= 50
    Fresh,
    /// 20 <= energy < 50
    Tiring,
    /// energy < 20
    Exhausted,
}

impl EnergyBand {
    pub fn of(energy: u32) -> Self {
        match energy {
            50.. => Self::Fresh,
            20..=49 => Self::Tiring,
            _ => Self::Exhausted,
        }
    }
}

impl std::fmt::Display for EnergyBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fresh => write!(f, "fresh"),
            Self::Tiring => write!(f, "tiring"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Which behavioral model an annotator follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorKind {
    Honest,
    Fatigued,
    Spammer,
}

impl BehaviorKind {
    pub const ALL: [BehaviorKind; 3] = [Self::Honest, Self::Fatigued, Self::Spammer];
}

impl std::str::FromStr for BehaviorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "honest" => Ok(Self::Honest),
            "fatigued" => Ok(Self::Fatigued),
            "spammer" => Ok(Self::Spammer),
            other => Err(ConfigError::UnknownBehavior(other.to_string())),
        }
    }
}

impl std::fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Honest => write!(f, "honest"),
            Self::Fatigued => write!(f, "fatigued"),
            Self::Spammer => write!(f, "spammer"),
        }
    }
}

/// Errors that can occur while setting up an annotator.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_is_clamped() {
        let state = AgentState::new("a").with_energy(250);
        assert_eq!(state.energy(), MAX_ENERGY);

        let mut state = AgentState::new("a").with_energy(3);
        assert_eq!(state.drain(5), 0);
        assert_eq!(state.energy(), 0);
    }

    #[test]
    fn test_deserialized_energy_is_clamped() {
        let state: AgentState =
            serde_json::from_str(r#"{"name": "a", "energy": 4000000000, "tasks_completed": 7}"#)
                .unwrap();
        assert_eq!(state.energy(), MAX_ENERGY);
        assert_eq!(state.tasks_completed(), 7);

        let saved = AgentState::new("b").with_energy(42);
        let json = serde_json::to_string(&saved).unwrap();
        assert_eq!(serde_json::from_str::<AgentState>(&json).unwrap(), saved);
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(EnergyBand::of(100), EnergyBand::Fresh);
        assert_eq!(EnergyBand::of(50), EnergyBand::Fresh);
        assert_eq!(EnergyBand::of(49), EnergyBand::Tiring);
        assert_eq!(EnergyBand::of(20), EnergyBand::Tiring);
        assert_eq!(EnergyBand::of(19), EnergyBand::Exhausted);
        assert_eq!(EnergyBand::of(0), EnergyBand::Exhausted);
    }

    #[test]
    fn test_behavior_kind_round_trips_through_display() {
        for kind in BehaviorKind::ALL {
            assert_eq!(kind.to_string().parse::<BehaviorKind>().unwrap(), kind);
        }
        assert_eq!("  Spammer ".parse::<BehaviorKind>().unwrap(), BehaviorKind::Spammer);
    }
}
