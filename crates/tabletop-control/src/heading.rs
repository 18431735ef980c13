//! Heading/quaternion conversion.
//!
//! End-effector orientation is parameterized by a single scalar heading
//! («zangle»): a fixed base rotation of π about +Y, composed with a spin
//! about −Z by the heading angle. This pins the gripper facing the table
//! while leaving one rotational degree of freedom for control.

use std::f64::consts::PI;

use nalgebra::{UnitQuaternion, UnitVector3, Vector3};

fn base_rotation() -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), PI)
}

fn spin_axis() -> UnitVector3<f64> {
    UnitVector3::new_normalize(Vector3::new(0.0, 0.0, -1.0))
}

/// Orientation for a heading angle (radians). Pure; accepts any real angle.
///
/// # Example
///
/// ```
/// use tabletop_control::heading::{heading_to_quat, quat_to_heading};
///
/// let quat = heading_to_quat(1.2);
/// assert!((quat_to_heading(quat) - 1.2).abs() < 1e-12);
/// ```
#[must_use]
pub fn heading_to_quat(heading: f64) -> UnitQuaternion<f64> {
    base_rotation() * UnitQuaternion::from_axis_angle(&spin_axis(), heading)
}

/// Heading angle for an orientation produced by [`heading_to_quat`].
///
/// Algebraic inverse with the base rotation factored out. The returned angle
/// lies in (−π, π]; it equals the input of [`heading_to_quat`] modulo 2π.
#[must_use]
pub fn quat_to_heading(quat: UnitQuaternion<f64>) -> f64 {
    let spin = base_rotation().inverse() * quat;
    -spin.scaled_axis().z
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
