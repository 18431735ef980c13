//! Simulator collaborator trait, opaque state snapshots, and the shared
//! state-access rig for tabletop environments.
//!
//! All dynamics, contact handling, and rendering live behind the
//! [`Simulator`] trait; this crate only orchestrates reads and writes
//! against it.

pub mod rig;
pub mod simulator;
pub mod snapshot;

pub use rig::{ArmRig, SceneNames};
pub use simulator::{Simulator, IDENTITY_WELD};
pub use snapshot::SimSnapshot;
