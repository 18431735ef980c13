//! Box spaces and observation-space descriptors, following Gymnasium
//! conventions.

use serde::{Deserialize, Serialize};

use crate::types::Action;

// ---------------------------------------------------------------------------
// BoxSpace
// ---------------------------------------------------------------------------

/// Axis-aligned box of valid values, componentwise `low[i] <= v[i] <= high[i]`.
///
/// `low` and `high` must have equal length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSpace {
    pub low: Vec<f64>,
    pub high: Vec<f64>,
}

impl BoxSpace {
    pub const fn new(low: Vec<f64>, high: Vec<f64>) -> Self {
        Self { low, high }
    }

    /// Box with the same scalar bounds in every dimension.
    pub fn uniform(low: f64, high: f64, dim: usize) -> Self {
        Self {
            low: vec![low; dim],
            high: vec![high; dim],
        }
    }

    /// Concatenation of two boxes, dimension-wise.
    #[must_use]
    pub fn hstack(&self, other: &Self) -> Self {
        let mut low = self.low.clone();
        low.extend_from_slice(&other.low);
        let mut high = self.high.clone();
        high.extend_from_slice(&other.high);
        Self { low, high }
    }

    pub fn dim(&self) -> usize {
        self.low.len()
    }

    pub fn contains(&self, values: &[f64]) -> bool {
        values.len() == self.low.len()
            && values
                .iter()
                .zip(self.low.iter().zip(self.high.iter()))
                .all(|(v, (l, h))| v >= l && v <= h)
    }

    /// Clamp a value vector into the box componentwise.
    pub fn clamp(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .zip(self.low.iter().zip(self.high.iter()))
            .map(|(v, (l, h))| v.clamp(*l, *h))
            .collect()
    }

    /// Sample a uniform random point. Takes `&mut impl Rng` for determinism.
    pub fn sample(&self, rng: &mut impl rand::Rng) -> Action {
        let data: Vec<f64> = self
            .low
            .iter()
            .zip(self.high.iter())
            .map(|(l, h)| rng.gen_range(*l..=*h))
            .collect();
        Action::new(data)
    }
}

// ---------------------------------------------------------------------------
// ObservationSpace
// ---------------------------------------------------------------------------

/// Shape descriptor for the observation record, one variant per mode.
///
/// Dimensions match exactly what the observation builder produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObservationSpace {
    State {
        state_observation: BoxSpace,
        state_desired_goal: BoxSpace,
        state_achieved_goal: BoxSpace,
    },
    Image {
        img_observation: BoxSpace,
        state_observation: BoxSpace,
    },
}

impl ObservationSpace {
    /// Total scalar count across all record fields.
    pub fn size(&self) -> usize {
        match self {
            Self::State {
                state_observation,
                state_desired_goal,
                state_achieved_goal,
            } => {
                state_observation.dim() + state_desired_goal.dim() + state_achieved_goal.dim()
            }
            Self::Image {
                img_observation,
                state_observation,
            } => img_observation.dim() + state_observation.dim(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
