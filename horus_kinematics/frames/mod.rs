//! HORUS Kinematic Frames
//!
//! Reference frame hierarchy and homogeneous transformation matrices for
//! describing rigid-body poses between frames.
//!
//! # Overview
//!
//! The frames system provides:
//! - Homogeneous transform math (DH construction, composition, inverse)
//! - Elementary rotations (roll about Z, pitch about Y, yaw about X)
//! - A named frame tree with tree-wide lookup from any node
//! - Pose resolution between any two frames of the same tree
//! - Denavit-Hartenberg kinematic chains (forward kinematics only)
//!
//! # Example
//!
//! ```rust
//! use horus_kinematics::frames::{FrameTree, HomogeneousTM};
//! use std::f64::consts::FRAC_PI_2;
//!
//! let mut tree = FrameTree::new();
//! let base = tree.create_frame("base");
//! let arm1 = tree.create_frame("arm1");
//! let gripper = tree.create_frame("gripper");
//!
//! // Shoulder: 0.3m link rotated about the base z axis
//! tree.add_child(base, arm1, HomogeneousTM::from_dh(0.3, 0.0, 0.1, FRAC_PI_2))?;
//! tree.add_child(arm1, gripper, HomogeneousTM::from_translation(0.2, 0.0, 0.0))?;
//!
//! // Lookup works from any node of the tree
//! assert_eq!(tree.search_frame(gripper, "base"), Some(base));
//!
//! // Pose of the gripper expressed in the base frame
//! let pose = tree.resolve(gripper, base)?;
//! assert!((pose.translation().y - 0.5).abs() < 1e-12);
//! # Ok::<(), horus_kinematics::KinematicsError>(())
//! ```

mod chain;
mod config;
mod error;
mod htm;
mod rotation;
mod tree;

// Re-export all public types
pub use chain::{DhParameters, JointKind, KinematicChain, Link};
pub use config::FrameTreeConfig;
pub use error::{KinematicsError, KinematicsResult};
pub use htm::HomogeneousTM;
pub use tree::{create_shared_tree, FrameId, FrameNode, FrameTree, SharedFrameTree};
