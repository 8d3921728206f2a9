//! Task module - tasks served by the API and the decisions made about them.
//!
//! - `Task` / `GroundTruth`: what the annotator reads (and the oracle behind it)
//! - `Decision`: what the annotator produces, with its simulated labor cost

pub mod task;
mod decision;

pub use decision::{Decision, DEGENERATE_ELAPSED_FLOOR_MS};
pub use task::{GroundTruth, Task};
