//! Opaque simulator state snapshots.

use nalgebra::{UnitQuaternion, Vector3};

/// Deep, independent copy of the simulator state an environment cares about:
/// joint state plus the mocap pose.
///
/// Callers only save and restore snapshots; the contents are never
/// introspected.
#[derive(Debug, Clone, PartialEq)]
pub struct SimSnapshot {
    pub(crate) qpos: Vec<f64>,
    pub(crate) qvel: Vec<f64>,
    pub(crate) mocap_pos: Vector3<f64>,
    pub(crate) mocap_quat: UnitQuaternion<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_clone_is_independent() {
        let snap = SimSnapshot {
            qpos: vec![1.0, 2.0],
            qvel: vec![0.0, 0.0],
            mocap_pos: Vector3::new(0.0, 0.4, 0.05),
            mocap_quat: UnitQuaternion::identity(),
        };
        let mut copy = snap.clone();
        copy.qpos[0] = 99.0;
        assert!((snap.qpos[0] - 1.0).abs() < f64::EPSILON);
        assert_ne!(snap, copy);
    }
}
