//! Push-style tabletop manipulation task environments.
//!
//! [`PushEnv`] owns one simulator instance and layers task switching,
//! observation assembly, and reward shaping on top of it, exposing the
//! usual reset/step RL surface.

pub mod env;
pub mod observation;
pub mod render;
pub mod reward;
pub mod task;

pub use env::PushEnv;
pub use reward::{ObservationBatch, RewardBreakdown, RewardModel};
pub use task::{Task, TaskPool};
