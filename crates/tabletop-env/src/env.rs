//! The push task environment.
//!
//! [`PushEnv`] owns one simulator instance for its lifetime and serves one
//! sequential caller: every `reset`/`step` is a blocking, synchronous call
//! into the simulator. Lifecycle: construct, `reset`, then `step` until
//! `done`; there is no early termination on success or failure.

use nalgebra::Vector3;
use tracing::debug;

use tabletop_control::MocapController;
use tabletop_core::config::{EnvConfig, RenderMode};
use tabletop_core::error::{ConfigError, SimError, TabletopError};
use tabletop_core::spaces::{BoxSpace, ObservationSpace};
use tabletop_core::types::{Action, Observation, StepInfo, StepResult};
use tabletop_sim::{ArmRig, SceneNames, SimSnapshot, Simulator};

use crate::observation::ObservationBuilder;
use crate::render::{render_frame, Frame, RenderSettings, IMG_CROP_LEN};
use crate::reward::{ObservationBatch, RewardBreakdown, RewardModel};
use crate::task::{Task, TaskPool};

/// Idle gripper control written on every control step.
const GRIPPER_IDLE: [f64; 2] = [0.0, 0.0];

/// Mocap write/settle iterations used to re-home the hand on reset, letting
/// the weld pull the arm onto the target.
const RESET_SETTLE_ROUNDS: u32 = 10;

// ---------------------------------------------------------------------------
// PushEnv
// ---------------------------------------------------------------------------

/// Multi-task push environment over a mocap-actuated arm.
pub struct PushEnv<S: Simulator> {
    sim: S,
    rig: ArmRig,
    controller: MocapController,
    reward: RewardModel,
    builder: ObservationBuilder,
    render_settings: RenderSettings,
    pool: TaskPool,
    active: Vec<Task>,
    hand_init_pos: Vector3<f64>,
    max_path_length: u32,
    obj_qpos_addr: usize,
    obj_qvel_addr: usize,
    action_space: BoxSpace,
    observation_space: ObservationSpace,
    state_goal: Vector3<f64>,
    obj_init_pos: Vector3<f64>,
    orig_placing_dist: f64,
    curr_path_length: u32,
    pick_completed: bool,
}

impl<S: Simulator> PushEnv<S> {
    /// Create an environment over `sim` with the default scene names.
    pub fn new(sim: S, config: &EnvConfig) -> Result<Self, TabletopError> {
        Self::with_names(sim, config, SceneNames::default())
    }

    /// Create an environment over `sim` with custom body/site names.
    pub fn with_names(
        mut sim: S,
        config: &EnvConfig,
        names: SceneNames,
    ) -> Result<Self, TabletopError> {
        config.validate()?;

        let rig = ArmRig::new(&mut sim, names, config.frame_skip);
        let controller = MocapController::for_hand(config.hand_type)
            .with_action_scale(config.action_scale)
            .with_zangle_scale(config.action_zangle_scale);
        let reward = RewardModel::new(config.rew_mode, config.indicator_dist);

        let pool = TaskPool::from_specs(&config.tasks)?;
        let active = pool.sample(config.n_tasks)?;

        let builder = if config.image {
            ObservationBuilder::image()
        } else {
            ObservationBuilder::state()
        };
        let render_settings = RenderSettings {
            camera_name: config.camera_name.clone(),
            image_dim: config.image_dim,
            hide_goal: config.hide_goal,
            goal_site: rig.names().goal_site.clone(),
        };

        let hand_low = config.hand_type.hand_low();
        let hand_high = config.hand_type.hand_high();
        let (obj_low, obj_high) = config.obj_bounds();
        let (goal_low, goal_high) = config.goal_bounds();
        let hand_and_obj = BoxSpace::new(hand_low.to_vec(), hand_high.to_vec())
            .hstack(&BoxSpace::new(obj_low.to_vec(), obj_high.to_vec()));
        let goal_space = BoxSpace::new(goal_low.to_vec(), goal_high.to_vec());
        let observation_space = if config.image {
            ObservationSpace::Image {
                img_observation: BoxSpace::uniform(0.0, 1.0, IMG_CROP_LEN + 3),
                state_observation: hand_and_obj,
            }
        } else {
            ObservationSpace::State {
                state_observation: hand_and_obj,
                state_desired_goal: goal_space.clone(),
                state_achieved_goal: goal_space,
            }
        };

        let first = active[0].clone();
        Ok(Self {
            sim,
            rig,
            controller,
            reward,
            builder,
            render_settings,
            pool,
            active,
            hand_init_pos: Vector3::from(config.hand_init_pos),
            max_path_length: config.max_path_length,
            obj_qpos_addr: config.obj_qpos_addr,
            obj_qvel_addr: config.obj_qvel_addr,
            action_space: BoxSpace::uniform(-1.0, 1.0, 3),
            observation_space,
            state_goal: first.goal,
            obj_init_pos: first.obj_init_pos,
            orig_placing_dist: first.placing_dist(),
            curr_path_length: 0,
            pick_completed: false,
        })
    }

    // -- Spaces & accessors --------------------------------------------------

    #[must_use]
    pub const fn action_space(&self) -> &BoxSpace {
        &self.action_space
    }

    #[must_use]
    pub const fn observation_space(&self) -> &ObservationSpace {
        &self.observation_space
    }

    /// The current desired goal.
    #[must_use]
    pub const fn goal(&self) -> Vector3<f64> {
        self.state_goal
    }

    /// Planar goal-to-object distance captured at the last task change.
    #[must_use]
    pub const fn orig_placing_dist(&self) -> f64 {
        self.orig_placing_dist
    }

    /// Steps taken since the last reset.
    #[must_use]
    pub const fn current_path_length(&self) -> u32 {
        self.curr_path_length
    }

    #[must_use]
    pub const fn max_path_length(&self) -> u32 {
        self.max_path_length
    }

    /// Lifecycle flag for pick variants; cleared on reset, never consulted
    /// by the push reward.
    #[must_use]
    pub const fn pick_completed(&self) -> bool {
        self.pick_completed
    }

    #[must_use]
    pub fn active_tasks(&self) -> &[Task] {
        &self.active
    }

    /// Read-only access to the underlying simulator.
    #[must_use]
    pub const fn simulator(&self) -> &S {
        &self.sim
    }

    /// Mutable access to the underlying simulator.
    pub const fn simulator_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    /// Copy of the end-effector body's world position.
    pub fn end_effector_pos(&self) -> Result<Vector3<f64>, TabletopError> {
        Ok(self.rig.end_effector_pos(&self.sim)?)
    }

    // -- Task management -----------------------------------------------------

    /// The first `n` tasks of the fixed draw order into the pool.
    /// Deterministic: no randomness is involved.
    pub fn sample_tasks(&self, n: usize) -> Result<Vec<Task>, TabletopError> {
        Ok(self.pool.sample(n)?)
    }

    /// Indices of the active task set.
    #[must_use]
    pub fn all_task_indices(&self) -> std::ops::Range<usize> {
        0..self.active.len()
    }

    /// Switch to active task `idx` without re-homing the arm or touching the
    /// step counter.
    pub fn reset_task(&mut self, idx: usize) -> Result<(), TabletopError> {
        let task = self.active_task(idx)?;
        self.change_task(task)?;
        Ok(())
    }

    fn active_task(&self, idx: usize) -> Result<Task, TabletopError> {
        self.active.get(idx).cloned().ok_or_else(|| {
            TabletopError::Config(ConfigError::InvalidValue {
                field: "task_index".into(),
                message: format!("{idx} out of range for {} active tasks", self.active.len()),
            })
        })
    }

    fn change_task(&mut self, task: Task) -> Result<(), SimError> {
        self.state_goal = task.goal;
        self.pin_goal_marker()?;
        self.obj_init_pos = task.obj_init_pos;
        self.orig_placing_dist = task.placing_dist();
        debug!(
            goal = ?self.state_goal,
            obj_init = ?self.obj_init_pos,
            orig_placing_dist = self.orig_placing_dist,
            "task changed"
        );
        Ok(())
    }

    // -- Episode lifecycle ---------------------------------------------------

    /// Start a new episode: select a task (explicitly by index into the
    /// active set, or the deterministic draw), re-home the hand, place the
    /// object, and return the initial observation.
    pub fn reset(&mut self, task_index: Option<usize>) -> Result<Observation, TabletopError> {
        let task = match task_index {
            Some(idx) => self.active_task(idx)?,
            None => self.pool.sample(1)?.remove(0),
        };
        self.change_task(task)?;
        self.reset_hand()?;
        self.set_object_pos(self.obj_init_pos)?;
        self.curr_path_length = 0;
        self.pick_completed = false;
        debug!(task_index, "episode reset");
        Ok(self.observe()?)
    }

    /// Advance one control step.
    pub fn step(&mut self, action: &Action) -> Result<StepResult, TabletopError> {
        action.require_dim(3)?;
        let a = action.as_slice();
        self.controller.apply_position_action(
            &mut self.sim,
            &self.rig.names().mocap,
            [a[0], a[1], a[2]],
        )?;
        self.rig.substep(&mut self.sim, Some(&GRIPPER_IDLE));
        self.pin_goal_marker()?;

        let observation = self.observe()?;
        let breakdown = self.score(&observation)?;

        self.curr_path_length += 1;
        let done = self.curr_path_length == self.max_path_length;

        Ok(StepResult {
            observation,
            reward: breakdown.reward,
            done,
            info: StepInfo {
                reach_dist: breakdown.reach_dist,
                place_dist: breakdown.place_dist,
                reward: breakdown.reward,
            },
        })
    }

    /// Force a flat `[hand(3), obj(3)]` state: command the hand target,
    /// settle, then inject the object position directly.
    pub fn apply_flat_state(&mut self, state: &[f64; 6]) -> Result<(), TabletopError> {
        let hand = Vector3::new(state[0], state[1], state[2]);
        let obj = Vector3::new(state[3], state[4], state[5]);
        self.sim.set_mocap_pos(&self.rig.names().mocap, hand)?;
        self.rig.substep(&mut self.sim, None);
        self.set_object_pos(obj)?;
        Ok(())
    }

    /// Deep copy of the simulator state for later [`restore`](Self::restore).
    pub fn snapshot(&self) -> Result<SimSnapshot, TabletopError> {
        Ok(self.rig.snapshot(&self.sim)?)
    }

    /// Write a snapshot back and recompute forward kinematics.
    pub fn restore(&mut self, state: &SimSnapshot) -> Result<(), TabletopError> {
        Ok(self.rig.restore(&mut self.sim, state)?)
    }

    /// Render a frame for the given purpose.
    pub fn render(&mut self, mode: RenderMode) -> Result<Frame, TabletopError> {
        Ok(render_frame(&mut self.sim, &self.render_settings, mode)?)
    }

    // -- Rewards -------------------------------------------------------------

    /// Reward for an action/observation pair against the current task.
    /// The action is validated (3 components) but otherwise unused.
    pub fn compute_reward(
        &self,
        action: &Action,
        observation: &Observation,
    ) -> Result<RewardBreakdown, TabletopError> {
        action.require_dim(3)?;
        self.score(observation)
    }

    /// Per-entry rewards over parallel action/observation lists.
    pub fn compute_rewards(
        &self,
        actions: &[Action],
        batch: &ObservationBatch,
    ) -> Result<Vec<f64>, TabletopError> {
        let finger_com = self.finger_com()?;
        Ok(self.reward.compute_batch(
            actions,
            batch,
            self.state_goal,
            finger_com,
            self.orig_placing_dist,
        )?)
    }

    // -- Internals -----------------------------------------------------------

    fn observe(&mut self) -> Result<Observation, SimError> {
        self.builder
            .build(&mut self.sim, &self.rig, self.state_goal, &self.render_settings)
    }

    fn score(&self, observation: &Observation) -> Result<RewardBreakdown, TabletopError> {
        let finger_com = self.finger_com()?;
        Ok(self.reward.compute_from_state(
            observation.state_observation(),
            self.state_goal,
            finger_com,
            self.orig_placing_dist,
        )?)
    }

    fn finger_com(&self) -> Result<Vector3<f64>, SimError> {
        let right = self.sim.site_pos(&self.rig.names().right_finger)?;
        let left = self.sim.site_pos(&self.rig.names().left_finger)?;
        Ok((right + left) / 2.0)
    }

    fn pin_goal_marker(&mut self) -> Result<(), SimError> {
        self.sim
            .set_site_pos(&self.rig.names().goal_site, self.state_goal)
    }

    fn reset_hand(&mut self) -> Result<(), SimError> {
        let reset_quat = self.controller.reset_quat();
        for _ in 0..RESET_SETTLE_ROUNDS {
            self.sim
                .set_mocap_pos(&self.rig.names().mocap, self.hand_init_pos)?;
            self.sim
                .set_mocap_quat(&self.rig.names().mocap, reset_quat)?;
            self.rig.substep(&mut self.sim, None);
        }
        Ok(())
    }

    /// Place the object by direct joint-state injection (no physical drop):
    /// overwrite its position block and zero its 6-dof velocity block.
    fn set_object_pos(&mut self, pos: Vector3<f64>) -> Result<(), SimError> {
        let mut qpos = self.sim.qpos();
        let mut qvel = self.sim.qvel();
        let pa = self.obj_qpos_addr;
        let va = self.obj_qvel_addr;
        if qpos.len() < pa + 3 || qvel.len() < va + 6 {
            return Err(SimError::JointStateMismatch {
                qpos: qpos.len(),
                qvel: qvel.len(),
            });
        }
        qpos[pa..pa + 3].copy_from_slice(&[pos.x, pos.y, pos.z]);
        for v in &mut qvel[va..va + 6] {
            *v = 0.0;
        }
        self.sim.set_joint_state(&qpos, &qvel)?;
        self.sim.forward();
        Ok(())
    }
}
