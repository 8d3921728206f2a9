//! # Annotator Simulation
//!
//! Synthetic labelers for exercising a cost-aware active learning pipeline.
//!
//! This library provides:
//! - Three behavioral models of human annotators (honest, fatigued, spammer)
//! - A task client for the task-serving API with bounded, backed-off retries
//! - A driver that runs annotators in parallel and reports labor cost
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────┐
//!   │                  Annotator                   │
//!   │  AgentState ── Behavior::decide ── StdRng    │
//!   └──────────────────────┬───────────────────────┘
//!                          │ fetch_batch / submit_task
//!                          ▼
//!                ┌──────────────────┐
//!                │    TaskClient    │
//!                │ (TaskTransport)  │
//!                └────────┬─────────┘
//!                         ▼
//!                ┌──────────────────┐
//!                │  Task API (HTTP) │
//!                └──────────────────┘
//! ```
//!
//! ## Task Flow
//! 1. Fetch a batch of tasks for the annotator
//! 2. Decide each task with the annotator's behavior (label + simulated time)
//! 3. Submit each decision; accepted ones count as completed
//! 4. Optionally take a break to recover energy, then repeat
//!
//! ## Modules
//! - `agents`: annotator state and behaviors
//! - `client`: task API client and transport
//! - `simulation`: driver and run reports
//! - `task`: tasks, ground truth and decisions

pub mod agents;
pub mod client;
pub mod config;
pub mod simulation;
pub mod task;

pub use agents::{Annotator, BehaviorKind};
pub use config::{AgentConfig, Config};
pub use simulation::{SimulationConfig, SimulationReport};
