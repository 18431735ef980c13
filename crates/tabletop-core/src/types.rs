use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Bounded per-step displacement request, optionally with a heading delta.
///
/// Components are interpreted in [-1, 1]; out-of-range values are clamped
/// before use, never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    data: Vec<f64>,
}

impl Action {
    pub const fn new(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// Action filled with zeros.
    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Clamp every component to [-1, 1] in place.
    pub fn clip_normalized(&mut self) {
        for val in &mut self.data {
            *val = val.clamp(-1.0, 1.0);
        }
    }

    /// Copy with every component clamped to [-1, 1].
    #[must_use]
    pub fn clamped(&self) -> Self {
        let mut out = self.clone();
        out.clip_normalized();
        out
    }

    /// Fail fast unless the action carries at least `expected` components.
    pub fn require_dim(&self, expected: usize) -> Result<(), ValidationError> {
        if self.data.len() < expected {
            return Err(ValidationError::ActionDimMismatch {
                expected,
                got: self.data.len(),
            });
        }
        Ok(())
    }
}

impl From<Vec<f64>> for Action {
    fn from(data: Vec<f64>) -> Self {
        Self::new(data)
    }
}

impl<const N: usize> From<[f64; N]> for Action {
    fn from(data: [f64; N]) -> Self {
        Self::new(data.to_vec())
    }
}

impl std::ops::Index<usize> for Action {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        &self.data[i]
    }
}

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

/// Environment observation. Exactly one variant is produced per environment
/// instance; the mode is fixed at construction and never switches at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Observation {
    /// State-based observation.
    State {
        /// End-effector position followed by object position (6 values).
        state_observation: Vec<f64>,
        /// Current task goal (3 values).
        state_desired_goal: Vec<f64>,
        /// Current object position (3 values).
        state_achieved_goal: Vec<f64>,
    },
    /// Image-based observation.
    Image {
        /// Flattened rendered crop followed by the end-effector position.
        img_observation: Vec<f64>,
        /// Full state vector (6 values), as in the state variant.
        state_observation: Vec<f64>,
    },
}

impl Observation {
    /// The full state vector, present in both variants.
    pub fn state_observation(&self) -> &[f64] {
        match self {
            Self::State {
                state_observation, ..
            }
            | Self::Image {
                state_observation, ..
            } => state_observation,
        }
    }

    /// Object position slice of the state vector, or an error if the state
    /// vector is shorter than 6 entries.
    pub fn object_pos(&self) -> Result<&[f64], ValidationError> {
        let state = self.state_observation();
        if state.len() < 6 {
            return Err(ValidationError::StateTooShort {
                expected: 6,
                got: state.len(),
            });
        }
        Ok(&state[3..6])
    }
}

// ---------------------------------------------------------------------------
// StepResult / StepInfo
// ---------------------------------------------------------------------------

/// Result of `env.step(action)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    /// Horizon reached. There is no early termination on success or failure.
    pub done: bool,
    pub info: StepInfo,
}

/// Per-step diagnostics record.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StepInfo {
    /// Distance from the object to the gripper-finger midpoint.
    pub reach_dist: f64,
    /// Planar object-to-goal distance, capped (see the reward model).
    pub place_dist: f64,
    /// Reward granted this step.
    pub reward: f64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Action ----

    #[test]
    fn action_new_and_len() {
        let action = Action::new(vec![0.5, -0.5, 0.1]);
        assert_eq!(action.len(), 3);
        assert!(!action.is_empty());
        assert_eq!(action.as_slice(), &[0.5, -0.5, 0.1]);
    }

    #[test]
    fn action_zeros() {
        let action = Action::zeros(3);
        assert_eq!(action.as_slice(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn action_clip_normalized() {
        let mut action = Action::new(vec![-2.0, 0.5, 1.5]);
        action.clip_normalized();
        assert_eq!(action.as_slice(), &[-1.0, 0.5, 1.0]);
    }

    #[test]
    fn action_clamped_leaves_original_untouched() {
        let action = Action::new(vec![7.0]);
        let clamped = action.clamped();
        assert_eq!(action.as_slice(), &[7.0]);
        assert_eq!(clamped.as_slice(), &[1.0]);
    }

    #[test]
    fn action_require_dim() {
        let action = Action::zeros(3);
        assert!(action.require_dim(3).is_ok());
        let err = action.require_dim(4).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ActionDimMismatch {
                expected: 4,
                got: 3
            }
        );
    }

    #[test]
    fn action_from_array_and_vec() {
        let a: Action = [1.0, 2.0, 3.0].into();
        let b: Action = vec![1.0, 2.0, 3.0].into();
        assert_eq!(a, b);
        assert!((a[2] - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn action_into_vec_roundtrip() {
        let data = vec![0.1, 0.2, 0.3];
        let action = Action::new(data.clone());
        assert_eq!(action.into_vec(), data);
    }

    #[test]
    fn action_serialize_roundtrip() {
        let action = Action::new(vec![0.1, -0.2]);
        let json = serde_json::to_string(&action).unwrap();
        let action2: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(action, action2);
    }

    // ---- Observation ----

    fn state_obs() -> Observation {
        Observation::State {
            state_observation: vec![0.0, 0.4, 0.05, 0.0, 0.6, 0.02],
            state_desired_goal: vec![0.0, 0.7, 0.02],
            state_achieved_goal: vec![0.0, 0.6, 0.02],
        }
    }

    #[test]
    fn observation_state_accessors() {
        let obs = state_obs();
        assert_eq!(obs.state_observation().len(), 6);
        assert_eq!(obs.object_pos().unwrap(), &[0.0, 0.6, 0.02]);
    }

    #[test]
    fn observation_image_accessors() {
        let obs = Observation::Image {
            img_observation: vec![0.0; 12],
            state_observation: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        };
        assert_eq!(obs.state_observation(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(obs.object_pos().unwrap(), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn observation_object_pos_too_short() {
        let obs = Observation::State {
            state_observation: vec![1.0, 2.0, 3.0],
            state_desired_goal: vec![],
            state_achieved_goal: vec![],
        };
        let err = obs.object_pos().unwrap_err();
        assert_eq!(err, ValidationError::StateTooShort { expected: 6, got: 3 });
    }

    #[test]
    fn observation_serialize_roundtrip() {
        let obs = state_obs();
        let json = serde_json::to_string(&obs).unwrap();
        let obs2: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(obs, obs2);
    }

    // ---- StepResult / StepInfo ----

    #[test]
    fn step_result_construction() {
        let result = StepResult {
            observation: state_obs(),
            reward: 9.9,
            done: false,
            info: StepInfo {
                reach_dist: 0.1,
                place_dist: 0.5,
                reward: 9.9,
            },
        };
        assert!(!result.done);
        assert!((result.info.reach_dist - 0.1).abs() < f64::EPSILON);
        assert!((result.info.reward - result.reward).abs() < f64::EPSILON);
    }

    #[test]
    fn step_info_default() {
        let info = StepInfo::default();
        assert!(info.reach_dist.abs() < f64::EPSILON);
        assert!(info.place_dist.abs() < f64::EPSILON);
        assert!(info.reward.abs() < f64::EPSILON);
    }

    #[test]
    fn step_result_serialize_roundtrip() {
        let result = StepResult {
            observation: state_obs(),
            reward: -0.25,
            done: true,
            info: StepInfo::default(),
        };
        let json = serde_json::to_string(&result).unwrap();
        let result2: StepResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result.observation, result2.observation);
        assert!((result.reward - result2.reward).abs() < f64::EPSILON);
        assert_eq!(result.done, result2.done);
    }

    // ---- Send + Sync ----

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn types_are_send_sync() {
        assert_send_sync::<Action>();
        assert_send_sync::<Observation>();
        assert_send_sync::<StepResult>();
    }
}
