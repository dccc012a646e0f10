//! Error types for frame and transform operations

use thiserror::Error;

/// Kinematics errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KinematicsError {
    #[error("{what} must be {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Required argument '{0}' is missing")]
    NullArgument(&'static str),

    #[error("Frame '{0}' not found")]
    FrameNotFound(String),

    #[error("Frame '{parent}' already has a frame named '{name}' in its tree")]
    DuplicateName { parent: String, name: String },

    #[error("Attaching '{child}' under '{parent}' would create a cycle")]
    CycleDetected { parent: String, child: String },

    #[error("Frames '{0}' and '{1}' do not share a root")]
    NoCommonRoot(String, String),

    #[error("Pose of frame '{0}' is not a rigid transform")]
    NotRigid(String),

    #[error("Chain has {expected} joints but {actual} joint values were given")]
    JointCountMismatch { expected: usize, actual: usize },
}

/// Result type for kinematics operations
pub type KinematicsResult<T> = Result<T, KinematicsError>;

impl KinematicsError {
    pub(crate) fn dimension_mismatch(
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        Self::DimensionMismatch {
            what,
            expected: format!("{}x{}", expected.0, expected.1),
            actual: format!("{}x{}", actual.0, actual.1),
        }
    }
}
