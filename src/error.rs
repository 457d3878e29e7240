use thiserror::Error;

use crate::euler::Axis;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoseError {
    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Can not load pose from string: length should be {expected} but is {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Bone not found: {0}")]
    BoneNotFound(String),

    #[error("Invalid bounds for bone {bone} on axis {axis}: min {min} must be lower than max {max}")]
    InvalidBounds {
        bone: String,
        axis: Axis,
        min: f32,
        max: f32,
    },

    #[error("Bone {0} is configured more than once")]
    DuplicateBone(String),

    #[error("Invalid bone table: {0}")]
    InvalidTable(String),
}

pub type Result<T> = std::result::Result<T, PoseError>;

impl PoseError {
    pub(crate) fn serialization(message: impl Into<String>) -> Self {
        PoseError::Serialization(message.into())
    }
}
