//! Shared state access for mocap-actuated arm scenes.
//!
//! [`ArmRig`] bundles the scene's body/site names with the handful of
//! state operations every task environment needs: weld initialization,
//! snapshot/restore, end-effector lookup, and control-rate sub-stepping.

use nalgebra::Vector3;

use tabletop_core::error::SimError;

use crate::simulator::{Simulator, IDENTITY_WELD};
use crate::snapshot::SimSnapshot;

// ---------------------------------------------------------------------------
// SceneNames
// ---------------------------------------------------------------------------

/// Names of the bodies and sites the rig reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneNames {
    /// Mocap target body driving the hand through a weld.
    pub mocap: String,
    /// End-effector body.
    pub hand: String,
    /// Manipulated object body.
    pub obj: String,
    /// Right gripper-finger site.
    pub right_finger: String,
    /// Left gripper-finger site.
    pub left_finger: String,
    /// Goal visualization site.
    pub goal_site: String,
}

impl Default for SceneNames {
    fn default() -> Self {
        Self {
            mocap: "mocap".into(),
            hand: "hand".into(),
            obj: "obj".into(),
            right_finger: "rightEndEffector".into(),
            left_finger: "leftEndEffector".into(),
            goal_site: "goal".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ArmRig
// ---------------------------------------------------------------------------

/// State-access component for one mocap-driven arm.
///
/// Construction resets every weld constraint to the identity offset so the
/// mocap target starts exactly coincident with the hand body.
#[derive(Debug, Clone)]
pub struct ArmRig {
    names: SceneNames,
    frame_skip: u32,
}

impl ArmRig {
    /// Create a rig and reset the scene's mocap welds to identity offsets.
    pub fn new(sim: &mut dyn Simulator, names: SceneNames, frame_skip: u32) -> Self {
        for index in 0..sim.weld_count() {
            sim.set_weld_offset(index, IDENTITY_WELD);
        }
        Self { names, frame_skip }
    }

    #[must_use]
    pub const fn names(&self) -> &SceneNames {
        &self.names
    }

    #[must_use]
    pub const fn frame_skip(&self) -> u32 {
        self.frame_skip
    }

    /// Deep, independent copy of joint state plus mocap pose. Later simulator
    /// mutations do not alter the snapshot.
    pub fn snapshot(&self, sim: &dyn Simulator) -> Result<SimSnapshot, SimError> {
        Ok(SimSnapshot {
            qpos: sim.qpos(),
            qvel: sim.qvel(),
            mocap_pos: sim.mocap_pos(&self.names.mocap)?,
            mocap_quat: sim.mocap_quat(&self.names.mocap)?,
        })
    }

    /// Write a snapshot back and recompute forward kinematics so derived
    /// quantities are consistent before any further query.
    pub fn restore(&self, sim: &mut dyn Simulator, state: &SimSnapshot) -> Result<(), SimError> {
        sim.set_joint_state(&state.qpos, &state.qvel)?;
        sim.set_mocap_pos(&self.names.mocap, state.mocap_pos)?;
        sim.set_mocap_quat(&self.names.mocap, state.mocap_quat)?;
        sim.forward();
        Ok(())
    }

    /// Copy of the end-effector body's world position.
    pub fn end_effector_pos(&self, sim: &dyn Simulator) -> Result<Vector3<f64>, SimError> {
        sim.body_pos(&self.names.hand)
    }

    /// Move the mocap target onto the hand body's current pose.
    pub fn align_mocap_to_hand(&self, sim: &mut dyn Simulator) -> Result<(), SimError> {
        let pos = sim.body_pos(&self.names.hand)?;
        let quat = sim.body_quat(&self.names.hand)?;
        sim.set_mocap_pos(&self.names.mocap, pos)?;
        sim.set_mocap_quat(&self.names.mocap, quat)
    }

    /// Advance one control step: `frame_skip` physics sub-steps with an
    /// optional actuator control vector.
    pub fn substep(&self, sim: &mut dyn Simulator, ctrl: Option<&[f64]>) {
        sim.step(ctrl, self.frame_skip);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
