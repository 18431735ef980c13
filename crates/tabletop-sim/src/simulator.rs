//! Engine-agnostic simulator trait.
//!
//! Any physics engine that can answer the named-state queries below can back
//! an environment. The environment owns exactly one simulator instance for
//! its lifetime and calls it synchronously; no concurrent access occurs.

use nalgebra::{UnitQuaternion, Vector3};

use tabletop_core::error::SimError;

/// Identity weld offset: zero translation, identity rotation (w, x, y, z).
pub const IDENTITY_WELD: [f64; 7] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];

/// Trait that concrete physics engines must implement.
///
/// The engine is responsible for dynamics, contacts, the mocap weld that
/// drives the hand, and rendering. Unknown names surface as [`SimError`]
/// and propagate uncaught to the environment's caller.
pub trait Simulator: Send {
    /// World position of a mocap target body.
    fn mocap_pos(&self, body: &str) -> Result<Vector3<f64>, SimError>;

    /// World orientation of a mocap target body.
    fn mocap_quat(&self, body: &str) -> Result<UnitQuaternion<f64>, SimError>;

    /// Command a mocap target position. Takes effect on the next step.
    fn set_mocap_pos(&mut self, body: &str, pos: Vector3<f64>) -> Result<(), SimError>;

    /// Command a mocap target orientation. Takes effect on the next step.
    fn set_mocap_quat(&mut self, body: &str, quat: UnitQuaternion<f64>) -> Result<(), SimError>;

    /// Copy of the full joint position vector.
    fn qpos(&self) -> Vec<f64>;

    /// Copy of the full joint velocity vector.
    fn qvel(&self) -> Vec<f64>;

    /// Bulk-overwrite the joint state.
    fn set_joint_state(&mut self, qpos: &[f64], qvel: &[f64]) -> Result<(), SimError>;

    /// World position of a named body.
    fn body_pos(&self, body: &str) -> Result<Vector3<f64>, SimError>;

    /// World orientation of a named body.
    fn body_quat(&self, body: &str) -> Result<UnitQuaternion<f64>, SimError>;

    /// World position of a named site.
    fn site_pos(&self, site: &str) -> Result<Vector3<f64>, SimError>;

    /// Move a visualization site. No physical effect.
    fn set_site_pos(&mut self, site: &str, pos: Vector3<f64>) -> Result<(), SimError>;

    /// Show or hide a visualization site. No physical effect.
    fn set_site_visible(&mut self, site: &str, visible: bool) -> Result<(), SimError>;

    /// Advance the simulation by `substeps` physics sub-steps, optionally
    /// writing an actuator control vector first.
    fn step(&mut self, ctrl: Option<&[f64]>, substeps: u32);

    /// Recompute forward kinematics so derived quantities (body and site
    /// positions) are consistent with the current joint state.
    fn forward(&mut self);

    /// Render the named camera to a row-major RGB byte buffer of
    /// `width * height * 3` bytes, scanlines bottom-up.
    fn render(&mut self, camera: &str, width: u32, height: u32) -> Result<Vec<u8>, SimError>;

    /// Number of weld constraints in the scene.
    fn weld_count(&self) -> usize;

    /// Overwrite a weld constraint's relative offset (xyz + wxyz quat).
    fn set_weld_offset(&mut self, index: usize, offset: [f64; 7]);

    /// Human-readable engine name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Verify the trait is object-safe (can be used as `dyn Simulator`).
    #[test]
    fn trait_is_object_safe() {
        fn _accepts_boxed(_: Box<dyn Simulator>) {}
    }

    #[test]
    fn identity_weld_is_identity() {
        assert_eq!(IDENTITY_WELD[..3], [0.0, 0.0, 0.0]);
        assert_eq!(IDENTITY_WELD[3..], [1.0, 0.0, 0.0, 0.0]);
    }
}
