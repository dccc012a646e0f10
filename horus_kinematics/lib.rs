//! # HORUS Kinematics
//!
//! Coordinate frame and rigid-body transform substrate for HORUS kinematics
//! planning.
//!
//! ## Structure
//!
//! ```text
//! horus_kinematics/
//! ── frames/         # Frame tree, homogeneous transforms, DH chains
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use horus_kinematics::{FrameTree, HomogeneousTM};
//! use nalgebra::Point3;
//!
//! let mut tree = FrameTree::new();
//! let base = tree.create_frame("base");
//! let arm = tree.create_frame("arm1");
//! tree.add_child(base, arm, HomogeneousTM::from_translation(0.0, 0.0, 0.5))
//!     .unwrap();
//!
//! let found = tree.search_frame(arm, "base");
//! assert_eq!(found, Some(base));
//!
//! let p = tree
//!     .transform_point(&Point3::new(0.1, 0.0, 0.0), arm, base)
//!     .unwrap();
//! assert!((p.z - 0.5).abs() < 1e-12);
//! ```

pub mod frames;

// Re-export the frame API at the crate root for convenience
pub use frames::{
    DhParameters, FrameId, FrameNode, FrameTree, FrameTreeConfig, HomogeneousTM, JointKind,
    KinematicChain, KinematicsError, KinematicsResult, Link,
};
