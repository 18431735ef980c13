//! Shaped reward computation for push tasks.

use nalgebra::Vector3;

use tabletop_core::config::RewardMode;
use tabletop_core::error::ValidationError;
use tabletop_core::types::{Action, Observation};

/// Reported place distance is capped at this multiple of the original
/// placing distance, bounding the penalty for tasks with distant goals.
pub const PLACE_DIST_CAP: f64 = 1.5;

// ---------------------------------------------------------------------------
// RewardBreakdown
// ---------------------------------------------------------------------------

/// Reward value plus the distances it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardBreakdown {
    pub reward: f64,
    /// Object to gripper-finger midpoint, 3D.
    pub reach_dist: f64,
    /// Object to goal, planar, capped at `PLACE_DIST_CAP * orig_placing_dist`.
    pub place_dist: f64,
}

// ---------------------------------------------------------------------------
// ObservationBatch
// ---------------------------------------------------------------------------

/// Keyed batch of observations for batch reward computation: one state row
/// per entry, column-major the way replay-buffer consumers hand it over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationBatch {
    pub state_observation: Vec<Vec<f64>>,
}

impl ObservationBatch {
    #[must_use]
    pub const fn new(state_observation: Vec<Vec<f64>>) -> Self {
        Self { state_observation }
    }

    /// Collect the state rows out of full observations.
    #[must_use]
    pub fn from_observations(observations: &[Observation]) -> Self {
        Self {
            state_observation: observations
                .iter()
                .map(|obs| obs.state_observation().to_vec())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.state_observation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state_observation.is_empty()
    }
}

// ---------------------------------------------------------------------------
// RewardModel
// ---------------------------------------------------------------------------

/// Reward shaping for one environment instance. The mode is validated at
/// construction (closed enum); per-task state (`orig_placing_dist`) is
/// passed in by the caller, which owns task switching.
#[derive(Debug, Clone, Copy)]
pub struct RewardModel {
    mode: RewardMode,
    indicator_dist: f64,
}

impl RewardModel {
    #[must_use]
    pub const fn new(mode: RewardMode, indicator_dist: f64) -> Self {
        Self {
            mode,
            indicator_dist,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> RewardMode {
        self.mode
    }

    /// Compute the reward for one configuration of object, goal, and gripper.
    #[must_use]
    pub fn compute(
        &self,
        obj: Vector3<f64>,
        goal: Vector3<f64>,
        finger_com: Vector3<f64>,
        orig_placing_dist: f64,
    ) -> RewardBreakdown {
        let reach_dist = (obj - finger_com).norm();
        let place_dist = (obj.xy() - goal.xy()).norm();

        let reward = match self.mode {
            RewardMode::L2 => -reach_dist - place_dist,
            RewardMode::L2Sparse => -place_dist,
            RewardMode::L2SparseInd => {
                if place_dist < self.indicator_dist {
                    -place_dist
                } else {
                    -orig_placing_dist
                }
            }
            RewardMode::PosPlace => {
                -reach_dist + 100.0 * (orig_placing_dist - place_dist).max(0.0)
            }
        };

        RewardBreakdown {
            reward,
            reach_dist,
            place_dist: place_dist.min(orig_placing_dist * PLACE_DIST_CAP),
        }
    }

    /// Compute from a flat state row (`[hand(3), obj(3)]`). Fails fast when
    /// the row is shorter than 6 entries.
    pub fn compute_from_state(
        &self,
        state: &[f64],
        goal: Vector3<f64>,
        finger_com: Vector3<f64>,
        orig_placing_dist: f64,
    ) -> Result<RewardBreakdown, ValidationError> {
        if state.len() < 6 {
            return Err(ValidationError::StateTooShort {
                expected: 6,
                got: state.len(),
            });
        }
        let obj = Vector3::new(state[3], state[4], state[5]);
        Ok(self.compute(obj, goal, finger_com, orig_placing_dist))
    }

    /// Per-entry reward over parallel action/observation lists, as batch
    /// training consumers expect. Fails fast on a length mismatch.
    pub fn compute_batch(
        &self,
        actions: &[Action],
        batch: &ObservationBatch,
        goal: Vector3<f64>,
        finger_com: Vector3<f64>,
        orig_placing_dist: f64,
    ) -> Result<Vec<f64>, ValidationError> {
        if actions.len() != batch.len() {
            return Err(ValidationError::BatchLengthMismatch {
                actions: actions.len(),
                observations: batch.len(),
            });
        }
        actions
            .iter()
            .zip(batch.state_observation.iter())
            .map(|(action, state)| {
                action.require_dim(3)?;
                self.compute_from_state(state, goal, finger_com, orig_placing_dist)
                    .map(|breakdown| breakdown.reward)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
