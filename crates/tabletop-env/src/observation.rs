//! Observation assembly.

use nalgebra::Vector3;

use tabletop_core::config::RenderMode;
use tabletop_core::error::SimError;
use tabletop_core::types::Observation;
use tabletop_sim::{ArmRig, Simulator};

use crate::render::{render_frame, RenderSettings};

/// Builds observations in the mode fixed at environment construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationBuilder {
    image: bool,
}

impl ObservationBuilder {
    #[must_use]
    pub const fn state() -> Self {
        Self { image: false }
    }

    #[must_use]
    pub const fn image() -> Self {
        Self { image: true }
    }

    #[must_use]
    pub const fn is_image(&self) -> bool {
        self.image
    }

    /// Assemble the observation for the current simulator state.
    pub fn build(
        &self,
        sim: &mut dyn Simulator,
        rig: &ArmRig,
        goal: Vector3<f64>,
        render: &RenderSettings,
    ) -> Result<Observation, SimError> {
        let hand = rig.end_effector_pos(sim)?;
        let obj = sim.body_pos(&rig.names().obj)?;
        let flat = vec![hand.x, hand.y, hand.z, obj.x, obj.y, obj.z];

        if self.image {
            let frame = render_frame(sim, render, RenderMode::Nn)?;
            let mut img = frame.into_flat();
            img.extend_from_slice(&[hand.x, hand.y, hand.z]);
            Ok(Observation::Image {
                img_observation: img,
                state_observation: flat,
            })
        } else {
            Ok(Observation::State {
                state_observation: flat,
                state_desired_goal: vec![goal.x, goal.y, goal.z],
                state_achieved_goal: vec![obj.x, obj.y, obj.z],
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
