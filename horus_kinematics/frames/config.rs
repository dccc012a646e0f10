//! Configuration for the frame tree

use serde::{Deserialize, Serialize};

/// Default orthonormality tolerance for edge poses
pub const DEFAULT_RIGID_TOLERANCE: f64 = 1e-6;

/// Configuration for [`FrameTree`](super::FrameTree)
///
/// Controls how strictly attach operations are validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameTreeConfig {
    /// Require frame names to be unique across a whole tree
    ///
    /// Tree-wide lookup returns the first match of a pre-order search, so
    /// only unique names resolve unambiguously. When false, only a collision
    /// with a direct sibling is rejected.
    ///
    /// Default: true
    pub unique_names: bool,

    /// Tolerance used to check that edge poses are rigid transforms
    ///
    /// `None` disables the check.
    ///
    /// Default: Some(1e-6)
    pub rigid_tolerance: Option<f64>,
}

impl Default for FrameTreeConfig {
    fn default() -> Self {
        Self::strict()
    }
}

impl FrameTreeConfig {
    /// Tree-wide unique names and rigid edge poses
    pub fn strict() -> Self {
        Self {
            unique_names: true,
            rigid_tolerance: Some(DEFAULT_RIGID_TOLERANCE),
        }
    }

    /// Sibling-only name checks, edge poses accepted as given
    pub fn permissive() -> Self {
        Self {
            unique_names: false,
            rigid_tolerance: None,
        }
    }

    /// Builder: set name uniqueness
    pub fn with_unique_names(mut self, unique: bool) -> Self {
        self.unique_names = unique;
        self
    }

    /// Builder: set rigid tolerance
    pub fn with_rigid_tolerance(mut self, tolerance: Option<f64>) -> Self {
        self.rigid_tolerance = tolerance;
        self
    }
}
