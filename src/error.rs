//! Generation error taxonomy
//!
//! Only the startup checks (`InvalidPhysicsConstants`, `InvalidSettings`) are
//! fatal. Everything else is logged at the call site and the operation
//! degrades to a no-op.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenError {
    #[error("invalid physics constants: gravity={gravity}, jump_velocity={jump_velocity}, run_speed={run_speed}")]
    InvalidPhysicsConstants {
        gravity: f32,
        jump_velocity: f32,
        run_speed: f32,
    },
    #[error("unreachable gap dx={dx:.1} dy={dy:.1} (limit dx={max_dx:.1} dy={max_dy:.1})")]
    UnreachableGapAttempt {
        dx: f32,
        dy: f32,
        max_dx: f32,
        max_dy: f32,
    },
    #[error("pattern {index} not found (library has {len})")]
    PatternNotFound { index: usize, len: usize },
    #[error("{0} spawner unavailable")]
    SpawnerUnavailable(&'static str),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}
