// heli_core/src/error.rs

use thiserror::Error;

/// Construction-time failures of the core algorithms. Flight events such as crashes
/// are reported through return values, never through this type.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("heightmap must have at least one row and one column")]
    EmptyHeightmap,

    #[error("heightmap row {row} has {len} columns, expected {expected}")]
    RaggedHeightmap {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("task has no waypoints")]
    EmptyTask,

    #[error("invalid physics parameter `{name}`: {reason}")]
    InvalidPhysics { name: &'static str, reason: String },
}
