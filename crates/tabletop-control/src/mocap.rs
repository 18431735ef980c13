//! Incremental mocap actuation.
//!
//! [`MocapController`] translates a bounded action vector into position
//! (and optionally heading) deltas on the mocap target that drives the
//! hand. Positions are always clamped into the configured operating volume
//! after every update; actions are clamped, never rejected.

use std::f64::consts::{FRAC_PI_2, TAU};

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use tabletop_core::config::HandType;
use tabletop_core::error::SimError;
use tabletop_sim::Simulator;

use crate::heading::{heading_to_quat, quat_to_heading};

/// Heading clamp bounds (radians).
const HEADING_LIMIT: f64 = 3.0;

/// Mocap reset orientation for a hand type.
fn reset_quat_for(hand: HandType) -> UnitQuaternion<f64> {
    match hand {
        HandType::ParallelV1 => UnitQuaternion::new_normalize(Quaternion::new(1.0, 0.0, 1.0, 0.0)),
        HandType::WeissV1 | HandType::WeissV2 => heading_to_quat(FRAC_PI_2),
    }
}

// ---------------------------------------------------------------------------
// MocapController
// ---------------------------------------------------------------------------

/// Bounded incremental controller for one mocap target.
#[derive(Debug, Clone)]
pub struct MocapController {
    action_scale: f64,
    zangle_scale: f64,
    mocap_low: Vector3<f64>,
    mocap_high: Vector3<f64>,
    reset_quat: UnitQuaternion<f64>,
}

impl MocapController {
    /// Controller with the operating volume and reset orientation of the
    /// given hand type, and default action scales.
    #[must_use]
    pub fn for_hand(hand: HandType) -> Self {
        Self {
            action_scale: 0.01,
            zangle_scale: 0.1,
            mocap_low: Vector3::from(hand.hand_low()),
            mocap_high: Vector3::from(hand.hand_high()),
            reset_quat: reset_quat_for(hand),
        }
    }

    /// Set the position delta per unit action component.
    #[must_use]
    pub const fn with_action_scale(mut self, scale: f64) -> Self {
        self.action_scale = scale;
        self
    }

    /// Set the heading delta per unit action component.
    #[must_use]
    pub const fn with_zangle_scale(mut self, scale: f64) -> Self {
        self.zangle_scale = scale;
        self
    }

    /// The fixed orientation written back on every position-only action.
    #[must_use]
    pub fn reset_quat(&self) -> UnitQuaternion<f64> {
        self.reset_quat
    }

    #[must_use]
    pub fn mocap_low(&self) -> Vector3<f64> {
        self.mocap_low
    }

    #[must_use]
    pub fn mocap_high(&self) -> Vector3<f64> {
        self.mocap_high
    }

    fn clamp_to_volume(&self, pos: Vector3<f64>) -> Vector3<f64> {
        Vector3::new(
            pos.x.clamp(self.mocap_low.x, self.mocap_high.x),
            pos.y.clamp(self.mocap_low.y, self.mocap_high.y),
            pos.z.clamp(self.mocap_low.z, self.mocap_high.z),
        )
    }

    fn position_delta(&self, action: &[f64; 3]) -> Vector3<f64> {
        Vector3::new(
            action[0].clamp(-1.0, 1.0),
            action[1].clamp(-1.0, 1.0),
            action[2].clamp(-1.0, 1.0),
        ) * self.action_scale
    }

    /// Apply a position action: clamp, scale, add to the current mocap
    /// position, clamp into the operating volume, and write the result
    /// together with the fixed reset orientation.
    ///
    /// Always succeeds given a well-formed simulator handle.
    pub fn apply_position_action(
        &self,
        sim: &mut dyn Simulator,
        mocap: &str,
        action: [f64; 3],
    ) -> Result<(), SimError> {
        let new_pos = self.clamp_to_volume(sim.mocap_pos(mocap)? + self.position_delta(&action));
        sim.set_mocap_pos(mocap, new_pos)?;
        sim.set_mocap_quat(mocap, self.reset_quat)
    }

    /// Apply a position-and-heading action: the first three components as in
    /// [`apply_position_action`](Self::apply_position_action) (without the
    /// orientation reset), the fourth as a heading delta. The resulting
    /// heading is clamped to ±3.0 rad and wrapped by +2π when negative.
    pub fn apply_position_heading_action(
        &self,
        sim: &mut dyn Simulator,
        mocap: &str,
        action: [f64; 4],
    ) -> Result<(), SimError> {
        let pos_part = [action[0], action[1], action[2]];
        let new_pos = self.clamp_to_volume(sim.mocap_pos(mocap)? + self.position_delta(&pos_part));
        sim.set_mocap_pos(mocap, new_pos)?;

        let delta = action[3].clamp(-1.0, 1.0) * self.zangle_scale;
        let mut heading = quat_to_heading(sim.mocap_quat(mocap)?) + delta;
        heading = heading.clamp(-HEADING_LIMIT, HEADING_LIMIT);
        if heading < 0.0 {
            heading += TAU;
        }
        sim.set_mocap_quat(mocap, heading_to_quat(heading))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
