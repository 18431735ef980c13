//! In-memory simulator mock.
//!
//! [`MockSimulator`] emulates just enough of a mocap-welded arm scene to
//! exercise the environment layer: the hand body (and its finger sites)
//! tracks the mocap target on every step, and the object body tracks its
//! `qpos` block on step/forward. Rendering produces a deterministic byte
//! pattern so image-pipeline tests can assert exact pixels.

use std::collections::HashMap;

use nalgebra::{UnitQuaternion, Vector3};

use tabletop_core::error::SimError;
use tabletop_sim::Simulator;

/// Finger site offsets from the hand body, one per side.
fn right_finger_offset() -> Vector3<f64> {
    Vector3::new(0.02, 0.0, 0.0)
}
fn left_finger_offset() -> Vector3<f64> {
    Vector3::new(-0.02, 0.0, 0.0)
}

/// Scripted in-memory stand-in for a physics engine.
pub struct MockSimulator {
    qpos: Vec<f64>,
    qvel: Vec<f64>,
    mocap: HashMap<String, (Vector3<f64>, UnitQuaternion<f64>)>,
    bodies: HashMap<String, (Vector3<f64>, UnitQuaternion<f64>)>,
    sites: HashMap<String, (Vector3<f64>, bool)>,
    welds: Vec<[f64; 7]>,
    cameras: Vec<String>,
    obj_qpos_addr: usize,
    last_ctrl: Option<Vec<f64>>,
    total_substeps: u64,
    forward_calls: u64,
}

impl MockSimulator {
    /// A scene matching the default tabletop names: one `mocap` target, a
    /// `hand` and `obj` body, finger and `goal` sites, one weld constraint,
    /// and the `robotview_zoomed` camera. The object block starts at
    /// `qpos[9]` / `qvel[9]`.
    #[must_use]
    pub fn tabletop() -> Self {
        let mut mocap = HashMap::new();
        mocap.insert(
            "mocap".to_string(),
            (Vector3::new(0.0, 0.4, 0.05), UnitQuaternion::identity()),
        );
        let mut bodies = HashMap::new();
        bodies.insert(
            "hand".to_string(),
            (Vector3::new(0.0, 0.4, 0.05), UnitQuaternion::identity()),
        );
        bodies.insert(
            "obj".to_string(),
            (Vector3::zeros(), UnitQuaternion::identity()),
        );
        let mut sites = HashMap::new();
        sites.insert(
            "rightEndEffector".to_string(),
            (Vector3::new(0.0, 0.4, 0.05) + right_finger_offset(), true),
        );
        sites.insert(
            "leftEndEffector".to_string(),
            (Vector3::new(0.0, 0.4, 0.05) + left_finger_offset(), true),
        );
        sites.insert("goal".to_string(), (Vector3::zeros(), true));
        Self {
            qpos: vec![0.0; 16],
            qvel: vec![0.0; 15],
            mocap,
            bodies,
            sites,
            welds: vec![[7.0; 7]],
            cameras: vec!["robotview_zoomed".to_string()],
            obj_qpos_addr: 9,
            last_ctrl: None,
            total_substeps: 0,
            forward_calls: 0,
        }
    }

    /// Deterministic render pattern: `(row * width + col + channel) % 256`
    /// in raw (bottom-up) buffer order.
    #[must_use]
    pub fn pattern_byte(row: u32, col: u32, channel: u32, width: u32) -> u8 {
        ((row * width + col + channel) % 256) as u8
    }

    /// Control vector written by the most recent `step`, if any.
    #[must_use]
    pub fn last_ctrl(&self) -> Option<&[f64]> {
        self.last_ctrl.as_deref()
    }

    /// Physics sub-steps advanced since construction.
    #[must_use]
    pub const fn total_substeps(&self) -> u64 {
        self.total_substeps
    }

    /// Forward-kinematics recomputes since construction.
    #[must_use]
    pub const fn forward_calls(&self) -> u64 {
        self.forward_calls
    }

    /// Current offset of a weld constraint.
    #[must_use]
    pub fn weld(&self, index: usize) -> [f64; 7] {
        self.welds[index]
    }

    /// Goal site visibility flag.
    #[must_use]
    pub fn site_visible(&self, site: &str) -> Option<bool> {
        self.sites.get(site).map(|(_, visible)| *visible)
    }

    /// Place a body directly (test arrangement only).
    pub fn place_body(&mut self, body: &str, pos: Vector3<f64>) {
        self.bodies
            .insert(body.to_string(), (pos, UnitQuaternion::identity()));
        if body == "hand" {
            self.sync_fingers();
        }
    }

    fn sync_fingers(&mut self) {
        if let Some(&(hand, _)) = self.bodies.get("hand") {
            if let Some(entry) = self.sites.get_mut("rightEndEffector") {
                entry.0 = hand + right_finger_offset();
            }
            if let Some(entry) = self.sites.get_mut("leftEndEffector") {
                entry.0 = hand + left_finger_offset();
            }
        }
    }

    fn sync_object(&mut self) {
        let addr = self.obj_qpos_addr;
        if self.qpos.len() >= addr + 3 {
            let pos = Vector3::new(self.qpos[addr], self.qpos[addr + 1], self.qpos[addr + 2]);
            if let Some(entry) = self.bodies.get_mut("obj") {
                entry.0 = pos;
            }
        }
    }
}

impl Default for MockSimulator {
    fn default() -> Self {
        Self::tabletop()
    }
}

impl Simulator for MockSimulator {
    fn mocap_pos(&self, body: &str) -> Result<Vector3<f64>, SimError> {
        self.mocap
            .get(body)
            .map(|(pos, _)| *pos)
            .ok_or_else(|| SimError::UnknownMocap(body.into()))
    }

    fn mocap_quat(&self, body: &str) -> Result<UnitQuaternion<f64>, SimError> {
        self.mocap
            .get(body)
            .map(|(_, quat)| *quat)
            .ok_or_else(|| SimError::UnknownMocap(body.into()))
    }

    fn set_mocap_pos(&mut self, body: &str, pos: Vector3<f64>) -> Result<(), SimError> {
        match self.mocap.get_mut(body) {
            Some(entry) => {
                entry.0 = pos;
                Ok(())
            }
            None => Err(SimError::UnknownMocap(body.into())),
        }
    }

    fn set_mocap_quat(&mut self, body: &str, quat: UnitQuaternion<f64>) -> Result<(), SimError> {
        match self.mocap.get_mut(body) {
            Some(entry) => {
                entry.1 = quat;
                Ok(())
            }
            None => Err(SimError::UnknownMocap(body.into())),
        }
    }

    fn qpos(&self) -> Vec<f64> {
        self.qpos.clone()
    }

    fn qvel(&self) -> Vec<f64> {
        self.qvel.clone()
    }

    fn set_joint_state(&mut self, qpos: &[f64], qvel: &[f64]) -> Result<(), SimError> {
        if qpos.len() != self.qpos.len() || qvel.len() != self.qvel.len() {
            return Err(SimError::JointStateMismatch {
                qpos: qpos.len(),
                qvel: qvel.len(),
            });
        }
        self.qpos = qpos.to_vec();
        self.qvel = qvel.to_vec();
        Ok(())
    }

    fn body_pos(&self, body: &str) -> Result<Vector3<f64>, SimError> {
        self.bodies
            .get(body)
            .map(|(pos, _)| *pos)
            .ok_or_else(|| SimError::UnknownBody(body.into()))
    }

    fn body_quat(&self, body: &str) -> Result<UnitQuaternion<f64>, SimError> {
        self.bodies
            .get(body)
            .map(|(_, quat)| *quat)
            .ok_or_else(|| SimError::UnknownBody(body.into()))
    }

    fn site_pos(&self, site: &str) -> Result<Vector3<f64>, SimError> {
        self.sites
            .get(site)
            .map(|(pos, _)| *pos)
            .ok_or_else(|| SimError::UnknownSite(site.into()))
    }

    fn set_site_pos(&mut self, site: &str, pos: Vector3<f64>) -> Result<(), SimError> {
        match self.sites.get_mut(site) {
            Some(entry) => {
                entry.0 = pos;
                Ok(())
            }
            None => Err(SimError::UnknownSite(site.into())),
        }
    }

    fn set_site_visible(&mut self, site: &str, visible: bool) -> Result<(), SimError> {
        match self.sites.get_mut(site) {
            Some(entry) => {
                entry.1 = visible;
                Ok(())
            }
            None => Err(SimError::UnknownSite(site.into())),
        }
    }

    fn step(&mut self, ctrl: Option<&[f64]>, substeps: u32) {
        self.last_ctrl = ctrl.map(<[f64]>::to_vec);
        self.total_substeps += u64::from(substeps);
        // Weld emulation: the hand settles onto the mocap target.
        if let Some(&(pos, quat)) = self.mocap.get("mocap") {
            self.bodies.insert("hand".to_string(), (pos, quat));
        }
        self.sync_fingers();
        self.sync_object();
    }

    fn forward(&mut self) {
        self.forward_calls += 1;
        self.sync_fingers();
        self.sync_object();
    }

    fn render(&mut self, camera: &str, width: u32, height: u32) -> Result<Vec<u8>, SimError> {
        if !self.cameras.iter().any(|c| c == camera) {
            return Err(SimError::UnknownCamera(camera.into()));
        }
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for row in 0..height {
            for col in 0..width {
                for channel in 0..3 {
                    data.push(Self::pattern_byte(row, col, channel, width));
                }
            }
        }
        Ok(data)
    }

    fn weld_count(&self) -> usize {
        self.welds.len()
    }

    fn set_weld_offset(&mut self, index: usize, offset: [f64; 7]) {
        self.welds[index] = offset;
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
