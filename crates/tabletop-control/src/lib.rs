//! Heading («zangle») conversion utilities and the incremental mocap
//! actuation controller.

pub mod heading;
pub mod mocap;

pub use heading::{heading_to_quat, quat_to_heading};
pub use mocap::MocapController;
