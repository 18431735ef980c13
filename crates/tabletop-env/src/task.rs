//! Immutable task pool and deterministic task sampling.

use nalgebra::Vector3;

use tabletop_core::config::{TaskSpec, TASK_DRAW_ORDER};
use tabletop_core::error::ConfigError;

/// Height appended to 2-component goal/object positions.
pub const DEFAULT_OBJ_HEIGHT: f64 = 0.02;

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// One manipulation task: where the object starts and where it should go.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub goal: Vector3<f64>,
    pub obj_init_pos: Vector3<f64>,
}

impl Task {
    /// Planar (x, y) distance from the object's initial position to the goal.
    #[must_use]
    pub fn placing_dist(&self) -> f64 {
        (self.obj_init_pos.xy() - self.goal.xy()).norm()
    }
}

// ---------------------------------------------------------------------------
// TaskPool
// ---------------------------------------------------------------------------

/// Immutable pool of tasks built once from configuration.
///
/// Sampling is a pure function of the pool and the requested count: the
/// active set is always the first `n` entries of [`TASK_DRAW_ORDER`].
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPool {
    tasks: Vec<Task>,
}

impl TaskPool {
    /// Build a pool from config entries, appending the default height to any
    /// 2-component position.
    pub fn from_specs(specs: &[TaskSpec]) -> Result<Self, ConfigError> {
        if specs.is_empty() {
            return Err(ConfigError::EmptyTaskPool);
        }
        let tasks = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                Ok(Task {
                    goal: lift(index, "goal", &spec.goal)?,
                    obj_init_pos: lift(index, "obj_init_pos", &spec.obj_init_pos)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { tasks })
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// The first `n` tasks of the fixed draw order. Deterministic: two calls
    /// with the same `n` return identical results.
    pub fn sample(&self, n: usize) -> Result<Vec<Task>, ConfigError> {
        if n == 0 || n > TASK_DRAW_ORDER.len() {
            return Err(ConfigError::InvalidValue {
                field: "n_tasks".into(),
                message: format!("must be in 1..={}", TASK_DRAW_ORDER.len()),
            });
        }
        TASK_DRAW_ORDER[..n]
            .iter()
            .map(|&index| {
                self.tasks
                    .get(index)
                    .cloned()
                    .ok_or(ConfigError::DrawIndexOutOfRange {
                        index,
                        pool: self.tasks.len(),
                    })
            })
            .collect()
    }
}

fn lift(index: usize, field: &'static str, values: &[f64]) -> Result<Vector3<f64>, ConfigError> {
    match values {
        [x, y] => Ok(Vector3::new(*x, *y, DEFAULT_OBJ_HEIGHT)),
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(ConfigError::BadTaskVector {
            index,
            field,
            got: values.len(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(x: f64) -> TaskSpec {
        TaskSpec {
            goal: vec![x, 0.7],
            obj_init_pos: vec![x, 0.6, 0.02],
        }
    }

    fn pool_of(n: usize) -> TaskPool {
        let specs: Vec<TaskSpec> = (0..n).map(|i| spec(0.01 * i as f64)).collect();
        TaskPool::from_specs(&specs).unwrap()
    }

    #[test]
    fn two_component_positions_get_default_height() {
        let pool = pool_of(1);
        let task = pool.get(0).unwrap();
        assert!((task.goal.z - DEFAULT_OBJ_HEIGHT).abs() < f64::EPSILON);
        assert!((task.obj_init_pos.z - 0.02).abs() < f64::EPSILON);
    }

    #[test]
    fn three_component_positions_kept_verbatim() {
        let pool = TaskPool::from_specs(&[TaskSpec {
            goal: vec![0.1, 0.8, 0.3],
            obj_init_pos: vec![0.0, 0.6, 0.02],
        }])
        .unwrap();
        assert!((pool.get(0).unwrap().goal.z - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_pool_rejected() {
        assert!(matches!(
            TaskPool::from_specs(&[]),
            Err(ConfigError::EmptyTaskPool)
        ));
    }

    #[test]
    fn bad_arity_rejected() {
        let err = TaskPool::from_specs(&[TaskSpec {
            goal: vec![0.1],
            obj_init_pos: vec![0.0, 0.6],
        }])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::BadTaskVector {
                index: 0,
                field: "goal",
                got: 1
            }
        ));
    }

    #[test]
    fn sample_follows_fixed_draw_order() {
        let pool = pool_of(19);
        let drawn = pool.sample(5).unwrap();
        for (task, &index) in drawn.iter().zip(TASK_DRAW_ORDER.iter()) {
            assert_eq!(task, pool.get(index).unwrap());
        }
    }

    #[test]
    fn sample_is_deterministic() {
        let pool = pool_of(19);
        assert_eq!(pool.sample(10).unwrap(), pool.sample(10).unwrap());
        assert_eq!(pool.sample(1).unwrap(), pool.sample(1).unwrap());
    }

    #[test]
    fn sample_one_draws_pool_head() {
        // The draw order starts at 0, so a single draw is always pool[0].
        let pool = pool_of(19);
        let drawn = pool.sample(1).unwrap();
        assert_eq!(drawn.len(), 1);
        assert_eq!(&drawn[0], pool.get(0).unwrap());
    }

    #[test]
    fn sample_out_of_range_draw_index() {
        let pool = pool_of(5);
        // Third draw index is 7, beyond a 5-task pool.
        let err = pool.sample(3).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DrawIndexOutOfRange { index: 7, pool: 5 }
        ));
    }

    #[test]
    fn sample_count_bounds() {
        let pool = pool_of(19);
        assert!(pool.sample(0).is_err());
        assert!(pool.sample(11).is_err());
        assert_eq!(pool.sample(10).unwrap().len(), 10);
    }

    #[test]
    fn placing_dist_is_planar() {
        let task = Task {
            goal: Vector3::new(0.0, 0.7, 5.0),
            obj_init_pos: Vector3::new(0.0, 0.1, 0.02),
        };
        // z difference is ignored.
        assert!((task.placing_dist() - 0.6).abs() < 1e-12);
    }
}
