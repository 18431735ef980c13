use thiserror::Error;

/// Top-level error type for the tabletop crates.
#[derive(Debug, Error)]
pub enum TabletopError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Configuration errors, surfaced at construction time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Task pool is empty")]
    EmptyTaskPool,

    #[error("Task {index}: {field} must have 2 or 3 components, got {got}")]
    BadTaskVector {
        index: usize,
        field: &'static str,
        got: usize,
    },

    #[error("Draw-order index {index} out of range for task pool of {pool}")]
    DrawIndexOutOfRange { index: usize, pool: usize },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Simulator runtime errors. Fatal to the caller; never retried.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Unknown body: {0}")]
    UnknownBody(String),

    #[error("Unknown site: {0}")]
    UnknownSite(String),

    #[error("Unknown mocap target: {0}")]
    UnknownMocap(String),

    #[error("Unknown camera: {0}")]
    UnknownCamera(String),

    #[error("Joint state length mismatch: qpos {qpos}, qvel {qvel}")]
    JointStateMismatch { qpos: usize, qvel: usize },

    #[error("Render failed: {0}")]
    RenderFailed(String),
}

/// Action/observation validation errors.
///
/// Copy + static messages for cheap propagation in hot paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Action dimension mismatch: expected {expected}, got {got}")]
    ActionDimMismatch { expected: usize, got: usize },

    #[error("Batch length mismatch: {actions} actions, {observations} observations")]
    BatchLengthMismatch { actions: usize, observations: usize },

    #[error("State observation too short: expected at least {expected}, got {got}")]
    StateTooShort { expected: usize, got: usize },
}
