use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_hand_init_pos() -> [f64; 3] {
    [0.0, 0.4, 0.05]
}
const fn default_indicator_dist() -> f64 {
    0.05
}
const fn default_image_dim() -> u32 {
    84
}
fn default_camera_name() -> String {
    "robotview_zoomed".into()
}
const fn default_max_path_length() -> u32 {
    150
}
const fn default_true() -> bool {
    true
}
const fn default_n_tasks() -> usize {
    2
}
const fn default_action_scale() -> f64 {
    0.01
}
const fn default_action_zangle_scale() -> f64 {
    0.1
}
const fn default_frame_skip() -> u32 {
    5
}
const fn default_obj_qpos_addr() -> usize {
    9
}
const fn default_obj_qvel_addr() -> usize {
    9
}
fn default_tasks() -> Vec<TaskSpec> {
    vec![TaskSpec {
        goal: vec![0.0, 0.7, 0.02],
        obj_init_pos: vec![0.0, 0.6, 0.02],
    }]
}

// ---------------------------------------------------------------------------
// HandType
// ---------------------------------------------------------------------------

/// Gripper hardware variant. Selects the hand operating volume and the
/// fixed mocap reset orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandType {
    #[default]
    ParallelV1,
    WeissV1,
    WeissV2,
}

impl HandType {
    /// Lower corner of the hand (and mocap) operating volume.
    #[must_use]
    pub const fn hand_low(self) -> [f64; 3] {
        match self {
            Self::ParallelV1 => [-0.5, 0.4, 0.05],
            Self::WeissV1 => [-0.5, 0.25, 0.05],
            Self::WeissV2 => [-0.5, 0.25, 0.0],
        }
    }

    /// Upper corner of the hand (and mocap) operating volume.
    #[must_use]
    pub const fn hand_high(self) -> [f64; 3] {
        [0.5, 1.0, 0.5]
    }
}

// ---------------------------------------------------------------------------
// RewardMode
// ---------------------------------------------------------------------------

/// Reward shaping variant. Serialized names match the historical config
/// strings consumers pass (`l2`, `l2Sparse`, `l2SparseInd`, `posPlace`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RewardMode {
    L2,
    L2Sparse,
    L2SparseInd,
    #[default]
    PosPlace,
}

// ---------------------------------------------------------------------------
// RenderMode
// ---------------------------------------------------------------------------

/// Render purpose. `Nn` and `VisNn` produce the cropped network-input frame;
/// `Human` produces a full-size frame with the goal marker forced visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Human,
    Nn,
    VisNn,
}

// ---------------------------------------------------------------------------
// TaskSpec
// ---------------------------------------------------------------------------

/// One task-pool entry as configured: goal position and object initial
/// position, each with 2 or 3 components. 2-component entries get the
/// default object height appended when the pool is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub goal: Vec<f64>,
    pub obj_init_pos: Vec<f64>,
}

// ---------------------------------------------------------------------------
// EnvConfig
// ---------------------------------------------------------------------------

/// Push environment configuration.
///
/// # Example
///
/// ```
/// use tabletop_core::config::EnvConfig;
///
/// let config = EnvConfig {
///     n_tasks: 1,
///     ..EnvConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// assert_eq!(config.max_path_length, 150);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Object position bounds; defaults to the hand bounds when absent.
    #[serde(default)]
    pub obj_low: Option<[f64; 3]>,
    #[serde(default)]
    pub obj_high: Option<[f64; 3]>,

    /// Goal position bounds; defaults to the hand bounds when absent.
    #[serde(default)]
    pub goal_low: Option<[f64; 3]>,
    #[serde(default)]
    pub goal_high: Option<[f64; 3]>,

    /// Hand re-homing target on reset.
    #[serde(default = "default_hand_init_pos")]
    pub hand_init_pos: [f64; 3],

    /// Reward shaping variant (default: `posPlace`).
    #[serde(default)]
    pub rew_mode: RewardMode,

    /// Threshold for the indicator-sparse reward mode.
    #[serde(default = "default_indicator_dist")]
    pub indicator_dist: f64,

    /// Produce image observations instead of state observations.
    #[serde(default)]
    pub image: bool,

    /// Square render resolution for network frames (default: 84).
    #[serde(default = "default_image_dim")]
    pub image_dim: u32,

    /// Camera used for image observations.
    #[serde(default = "default_camera_name")]
    pub camera_name: String,

    /// Episode horizon; `done` fires exactly when the step counter reaches it.
    #[serde(default = "default_max_path_length")]
    pub max_path_length: u32,

    /// Hide the goal marker after each render.
    #[serde(default = "default_true")]
    pub hide_goal: bool,

    /// Gripper hardware variant.
    #[serde(default)]
    pub hand_type: HandType,

    /// Number of active tasks drawn from the pool.
    #[serde(default = "default_n_tasks")]
    pub n_tasks: usize,

    /// Task pool definitions.
    #[serde(default = "default_tasks")]
    pub tasks: Vec<TaskSpec>,

    /// Position delta per unit action component.
    #[serde(default = "default_action_scale")]
    pub action_scale: f64,

    /// Heading delta per unit action component.
    #[serde(default = "default_action_zangle_scale")]
    pub action_zangle_scale: f64,

    /// Physics sub-steps per control step.
    #[serde(default = "default_frame_skip")]
    pub frame_skip: u32,

    /// Start of the object's position block in `qpos`.
    #[serde(default = "default_obj_qpos_addr")]
    pub obj_qpos_addr: usize,

    /// Start of the object's 6-dof velocity block in `qvel`.
    #[serde(default = "default_obj_qvel_addr")]
    pub obj_qvel_addr: usize,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            obj_low: None,
            obj_high: None,
            goal_low: None,
            goal_high: None,
            hand_init_pos: default_hand_init_pos(),
            rew_mode: RewardMode::default(),
            indicator_dist: default_indicator_dist(),
            image: false,
            image_dim: default_image_dim(),
            camera_name: default_camera_name(),
            max_path_length: default_max_path_length(),
            hide_goal: true,
            hand_type: HandType::default(),
            n_tasks: default_n_tasks(),
            tasks: default_tasks(),
            action_scale: default_action_scale(),
            action_zangle_scale: default_action_zangle_scale(),
            frame_skip: default_frame_skip(),
            obj_qpos_addr: default_obj_qpos_addr(),
            obj_qvel_addr: default_obj_qvel_addr(),
        }
    }
}

/// Positions in the fixed task draw order. Deliberately deterministic:
/// downstream consumers rely on this exact ordering, so it must never be
/// replaced with a random draw.
pub const TASK_DRAW_ORDER: [usize; 10] = [0, 4, 7, 3, 5, 16, 8, 10, 15, 18];

impl EnvConfig {
    /// Object bounds, falling back to the hand bounds.
    #[must_use]
    pub fn obj_bounds(&self) -> ([f64; 3], [f64; 3]) {
        (
            self.obj_low.unwrap_or_else(|| self.hand_type.hand_low()),
            self.obj_high.unwrap_or_else(|| self.hand_type.hand_high()),
        )
    }

    /// Goal bounds, falling back to the hand bounds.
    #[must_use]
    pub fn goal_bounds(&self) -> ([f64; 3], [f64; 3]) {
        (
            self.goal_low.unwrap_or_else(|| self.hand_type.hand_low()),
            self.goal_high.unwrap_or_else(|| self.hand_type.hand_high()),
        )
    }

    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tasks.is_empty() {
            return Err(ConfigError::EmptyTaskPool);
        }
        for (index, task) in self.tasks.iter().enumerate() {
            for (field, vec) in [("goal", &task.goal), ("obj_init_pos", &task.obj_init_pos)] {
                if vec.len() != 2 && vec.len() != 3 {
                    return Err(ConfigError::BadTaskVector {
                        index,
                        field,
                        got: vec.len(),
                    });
                }
            }
        }
        if self.n_tasks == 0 || self.n_tasks > TASK_DRAW_ORDER.len() {
            return Err(ConfigError::InvalidValue {
                field: "n_tasks".into(),
                message: format!("must be in 1..={}", TASK_DRAW_ORDER.len()),
            });
        }
        for &index in &TASK_DRAW_ORDER[..self.n_tasks] {
            if index >= self.tasks.len() {
                return Err(ConfigError::DrawIndexOutOfRange {
                    index,
                    pool: self.tasks.len(),
                });
            }
        }
        for (field, (low, high)) in [
            ("obj bounds", self.obj_bounds()),
            ("goal bounds", self.goal_bounds()),
        ] {
            if low.iter().zip(high.iter()).any(|(l, h)| l > h) {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    message: "low exceeds high".into(),
                });
            }
        }
        if self.image && self.image_dim < 74 {
            return Err(ConfigError::InvalidValue {
                field: "image_dim".into(),
                message: "must be at least 74 to cover the network crop".into(),
            });
        }
        if self.frame_skip == 0 {
            return Err(ConfigError::InvalidValue {
                field: "frame_skip".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.max_path_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_path_length".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_of(n: usize) -> Vec<TaskSpec> {
        (0..n)
            .map(|i| TaskSpec {
                goal: vec![0.0, 0.7, 0.02],
                obj_init_pos: vec![0.01 * i as f64, 0.6],
            })
            .collect()
    }

    // ---- Defaults ----

    #[test]
    fn config_default_values() {
        let cfg = EnvConfig::default();
        assert_eq!(cfg.hand_init_pos, [0.0, 0.4, 0.05]);
        assert_eq!(cfg.rew_mode, RewardMode::PosPlace);
        assert!((cfg.indicator_dist - 0.05).abs() < f64::EPSILON);
        assert!(!cfg.image);
        assert_eq!(cfg.image_dim, 84);
        assert_eq!(cfg.camera_name, "robotview_zoomed");
        assert_eq!(cfg.max_path_length, 150);
        assert!(cfg.hide_goal);
        assert_eq!(cfg.hand_type, HandType::ParallelV1);
        assert_eq!(cfg.n_tasks, 2);
        assert_eq!(cfg.tasks.len(), 1);
        assert!((cfg.action_scale - 0.01).abs() < f64::EPSILON);
        assert!((cfg.action_zangle_scale - 0.1).abs() < f64::EPSILON);
        assert_eq!(cfg.frame_skip, 5);
        assert_eq!(cfg.obj_qpos_addr, 9);
        assert_eq!(cfg.obj_qvel_addr, 9);
    }

    /// The historical default pool holds a single task while `n_tasks` is 2,
    /// so the second draw index (4) is out of range; callers must supply a
    /// larger pool or set `n_tasks = 1`.
    #[test]
    fn config_default_pool_too_small_for_two_tasks() {
        let cfg = EnvConfig::default();
        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DrawIndexOutOfRange { index: 4, pool: 1 }
        ));
    }

    #[test]
    fn config_default_valid_with_one_task() {
        let cfg = EnvConfig {
            n_tasks: 1,
            ..EnvConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    // ---- HandType ----

    #[test]
    fn hand_type_bounds() {
        assert_eq!(HandType::ParallelV1.hand_low(), [-0.5, 0.4, 0.05]);
        assert_eq!(HandType::WeissV1.hand_low(), [-0.5, 0.25, 0.05]);
        assert_eq!(HandType::WeissV2.hand_low(), [-0.5, 0.25, 0.0]);
        assert_eq!(HandType::ParallelV1.hand_high(), [0.5, 1.0, 0.5]);
    }

    #[test]
    fn hand_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&HandType::ParallelV1).unwrap(),
            "\"parallel_v1\""
        );
        assert_eq!(
            serde_json::from_str::<HandType>("\"weiss_v2\"").unwrap(),
            HandType::WeissV2
        );
    }

    #[test]
    fn hand_type_unknown_string_rejected() {
        assert!(serde_json::from_str::<HandType>("\"threefinger\"").is_err());
    }

    // ---- RewardMode / RenderMode ----

    #[test]
    fn reward_mode_serde_names() {
        assert_eq!(serde_json::to_string(&RewardMode::L2).unwrap(), "\"l2\"");
        assert_eq!(
            serde_json::to_string(&RewardMode::L2Sparse).unwrap(),
            "\"l2Sparse\""
        );
        assert_eq!(
            serde_json::to_string(&RewardMode::L2SparseInd).unwrap(),
            "\"l2SparseInd\""
        );
        assert_eq!(
            serde_json::to_string(&RewardMode::PosPlace).unwrap(),
            "\"posPlace\""
        );
    }

    #[test]
    fn reward_mode_unknown_string_rejected() {
        assert!(serde_json::from_str::<RewardMode>("\"l3\"").is_err());
    }

    #[test]
    fn render_mode_serde_names() {
        assert_eq!(
            serde_json::from_str::<RenderMode>("\"vis_nn\"").unwrap(),
            RenderMode::VisNn
        );
        assert_eq!(serde_json::to_string(&RenderMode::Nn).unwrap(), "\"nn\"");
        assert!(serde_json::from_str::<RenderMode>("\"depth\"").is_err());
    }

    // ---- Bounds fallbacks ----

    #[test]
    fn bounds_default_to_hand_bounds() {
        let cfg = EnvConfig::default();
        let (obj_low, obj_high) = cfg.obj_bounds();
        assert_eq!(obj_low, HandType::ParallelV1.hand_low());
        assert_eq!(obj_high, HandType::ParallelV1.hand_high());
        let (goal_low, _) = cfg.goal_bounds();
        assert_eq!(goal_low, HandType::ParallelV1.hand_low());
    }

    #[test]
    fn explicit_bounds_override_hand_bounds() {
        let cfg = EnvConfig {
            obj_low: Some([-0.1, 0.5, 0.02]),
            obj_high: Some([0.1, 0.8, 0.02]),
            ..EnvConfig::default()
        };
        let (low, high) = cfg.obj_bounds();
        assert_eq!(low, [-0.1, 0.5, 0.02]);
        assert_eq!(high, [0.1, 0.8, 0.02]);
    }

    // ---- Validation ----

    #[test]
    fn validate_empty_pool() {
        let cfg = EnvConfig {
            tasks: vec![],
            ..EnvConfig::default()
        };
        assert!(matches!(
            cfg.validate().unwrap_err(),
            ConfigError::EmptyTaskPool
        ));
    }

    #[test]
    fn validate_bad_task_arity() {
        let cfg = EnvConfig {
            n_tasks: 1,
            tasks: vec![TaskSpec {
                goal: vec![0.0, 0.7, 0.02, 1.0],
                obj_init_pos: vec![0.0, 0.6],
            }],
            ..EnvConfig::default()
        };
        assert!(matches!(
            cfg.validate().unwrap_err(),
            ConfigError::BadTaskVector {
                index: 0,
                field: "goal",
                got: 4
            }
        ));
    }

    #[test]
    fn validate_two_component_tasks_ok() {
        let cfg = EnvConfig {
            n_tasks: 1,
            tasks: pool_of(1),
            ..EnvConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_n_tasks_range() {
        let cfg = EnvConfig {
            n_tasks: 0,
            ..EnvConfig::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = EnvConfig {
            n_tasks: 11,
            tasks: pool_of(19),
            ..EnvConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_full_draw_order_needs_nineteen_tasks() {
        // The largest draw index is 18, so 10 active tasks need a 19-task pool.
        let cfg = EnvConfig {
            n_tasks: 10,
            tasks: pool_of(19),
            ..EnvConfig::default()
        };
        assert!(cfg.validate().is_ok());
        let cfg = EnvConfig {
            n_tasks: 10,
            tasks: pool_of(18),
            ..EnvConfig::default()
        };
        assert!(matches!(
            cfg.validate().unwrap_err(),
            ConfigError::DrawIndexOutOfRange { index: 18, pool: 18 }
        ));
    }

    #[test]
    fn validate_inverted_bounds() {
        let cfg = EnvConfig {
            n_tasks: 1,
            obj_low: Some([0.5, 0.4, 0.05]),
            obj_high: Some([-0.5, 1.0, 0.5]),
            ..EnvConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_image_dim_floor() {
        let cfg = EnvConfig {
            n_tasks: 1,
            image: true,
            image_dim: 64,
            ..EnvConfig::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = EnvConfig {
            n_tasks: 1,
            image: true,
            image_dim: 84,
            ..EnvConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_frame_skip_and_horizon() {
        let cfg = EnvConfig {
            n_tasks: 1,
            frame_skip: 0,
            ..EnvConfig::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = EnvConfig {
            n_tasks: 1,
            max_path_length: 0,
            ..EnvConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    // ---- TOML ----

    #[test]
    fn config_toml_deserialization() {
        let toml_str = r#"
            rew_mode = "l2SparseInd"
            indicator_dist = 0.1
            hand_type = "weiss_v1"
            n_tasks = 1
            max_path_length = 50

            [[tasks]]
            goal = [0.1, 0.8]
            obj_init_pos = [0.0, 0.6, 0.02]
        "#;
        let cfg: EnvConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.rew_mode, RewardMode::L2SparseInd);
        assert!((cfg.indicator_dist - 0.1).abs() < f64::EPSILON);
        assert_eq!(cfg.hand_type, HandType::WeissV1);
        assert_eq!(cfg.n_tasks, 1);
        assert_eq!(cfg.max_path_length, 50);
        assert_eq!(cfg.tasks.len(), 1);
        assert_eq!(cfg.tasks[0].goal, vec![0.1, 0.8]);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_toml_defaults_applied() {
        let cfg: EnvConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, EnvConfig::default());
    }

    #[test]
    fn config_toml_unknown_mode_fails_at_parse() {
        let toml_str = r#"rew_mode = "l2Dense""#;
        assert!(toml::from_str::<EnvConfig>(toml_str).is_err());
    }

    #[test]
    fn config_from_file() {
        let dir = std::env::temp_dir().join("tabletop_test_env_config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("push.toml");
        std::fs::write(
            &path,
            r#"
            n_tasks = 1
            max_path_length = 25
            "#,
        )
        .unwrap();

        let cfg = EnvConfig::from_file(&path).unwrap();
        assert_eq!(cfg.n_tasks, 1);
        assert_eq!(cfg.max_path_length, 25);

        // Cleanup
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_dir(&dir);
    }

    #[test]
    fn config_from_file_invalid() {
        let dir = std::env::temp_dir().join("tabletop_test_env_config_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "n_tasks = 0\n").unwrap();

        assert!(EnvConfig::from_file(&path).is_err());

        // Cleanup
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_dir(&dir);
    }

    #[test]
    fn config_from_file_not_found() {
        assert!(EnvConfig::from_file("/nonexistent/push.toml").is_err());
    }
}
