//! Denavit-Hartenberg kinematic chains
//!
//! A serial chain of links, each described by standard DH parameters and a
//! joint kind. Evaluating the chain for a joint vector yields one transform
//! per link and their product, base to end effector. Only forward
//! kinematics is provided.

use super::error::{KinematicsError, KinematicsResult};
use super::htm::HomogeneousTM;
use super::tree::{FrameId, FrameTree};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a joint value enters the DH parameters of its link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointKind {
    /// Joint value is added to `theta`
    #[default]
    Revolute,
    /// Joint value is added to `d`
    Prismatic,
    /// No joint value
    Fixed,
}

/// Standard DH parameters of one link
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DhParameters {
    /// Link length along the new x axis
    pub a: f64,
    /// Link twist about the new x axis (radians)
    pub alpha: f64,
    /// Link offset along the previous z axis
    pub d: f64,
    /// Joint angle about the previous z axis (radians)
    pub theta: f64,
    #[serde(default)]
    pub joint: JointKind,
}

impl DhParameters {
    /// Revolute link: the joint value is added to `theta_offset`
    pub fn revolute(a: f64, alpha: f64, d: f64, theta_offset: f64) -> Self {
        Self {
            a,
            alpha,
            d,
            theta: theta_offset,
            joint: JointKind::Revolute,
        }
    }

    /// Prismatic link: the joint value is added to `d_offset`
    pub fn prismatic(a: f64, alpha: f64, d_offset: f64, theta: f64) -> Self {
        Self {
            a,
            alpha,
            d: d_offset,
            theta,
            joint: JointKind::Prismatic,
        }
    }

    /// Fixed link, posed by its DH parameters alone
    pub fn fixed(a: f64, alpha: f64, d: f64, theta: f64) -> Self {
        Self {
            a,
            alpha,
            d,
            theta,
            joint: JointKind::Fixed,
        }
    }

    /// Check if this link consumes a joint value
    pub fn is_movable(&self) -> bool {
        self.joint != JointKind::Fixed
    }

    /// Link transform for a joint value (ignored for fixed links)
    pub fn transform(&self, joint_value: f64) -> HomogeneousTM {
        match self.joint {
            JointKind::Revolute => {
                HomogeneousTM::from_dh(self.a, self.alpha, self.d, self.theta + joint_value)
            }
            JointKind::Prismatic => {
                HomogeneousTM::from_dh(self.a, self.alpha, self.d + joint_value, self.theta)
            }
            JointKind::Fixed => HomogeneousTM::from_dh(self.a, self.alpha, self.d, self.theta),
        }
    }
}

/// A named link of a chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub dh: DhParameters,
}

/// Serial chain of DH links, ordered from base to end effector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicChain {
    links: Vec<Link>,
}

impl KinematicChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a link at the end of the chain
    pub fn push_link(&mut self, name: impl Into<String>, dh: DhParameters) -> &mut Self {
        self.links.push(Link {
            name: name.into(),
            dh,
        });
        self
    }

    /// Builder: append a link
    pub fn with_link(mut self, name: impl Into<String>, dh: DhParameters) -> Self {
        self.push_link(name, dh);
        self
    }

    /// Links from base to end effector
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Number of movable joints
    pub fn dof(&self) -> usize {
        self.links.iter().filter(|link| link.dh.is_movable()).count()
    }

    /// Transform of every link relative to the previous one
    ///
    /// `joints` holds one value per movable joint, in chain order.
    pub fn link_transforms(&self, joints: &[f64]) -> KinematicsResult<Vec<HomogeneousTM>> {
        let dof = self.dof();
        if joints.len() != dof {
            return Err(KinematicsError::JointCountMismatch {
                expected: dof,
                actual: joints.len(),
            });
        }

        let mut values = joints.iter().copied();
        Ok(self
            .links
            .iter()
            .map(|link| {
                let q = if link.dh.is_movable() {
                    values.next().unwrap_or(0.0)
                } else {
                    0.0
                };
                link.dh.transform(q)
            })
            .collect())
    }

    /// Pose of the end effector in the base frame
    pub fn forward(&self, joints: &[f64]) -> KinematicsResult<HomogeneousTM> {
        Ok(self
            .link_transforms(joints)?
            .iter()
            .fold(HomogeneousTM::identity(), |acc, tf| acc.compose(tf)))
    }

    /// Create one frame per link below `base`, posed for `joints`
    ///
    /// Returns the new frame ids in chain order. The whole chain is checked
    /// before any frame is created, so on error the tree is unchanged.
    pub fn attach_to(
        &self,
        tree: &mut FrameTree,
        base: FrameId,
        joints: &[f64],
    ) -> KinematicsResult<Vec<FrameId>> {
        let transforms = self.link_transforms(joints)?;

        let planned: Vec<(&str, HomogeneousTM)> = self
            .links
            .iter()
            .zip(transforms.iter().copied())
            .map(|(link, tf)| (link.name.as_str(), tf))
            .collect();
        tree.check_chain(base, &planned)?;

        let mut parent = base;
        let mut ids = Vec::with_capacity(self.links.len());
        for (link, tf) in self.links.iter().zip(transforms) {
            let id = tree.create_frame(link.name.clone());
            tree.add_child(parent, id, tf)?;
            ids.push(id);
            parent = id;
        }

        debug!("attached {}-link chain ({} dof)", ids.len(), self.dof());
        Ok(ids)
    }

    /// Re-pose frames created by [`KinematicChain::attach_to`] for new joint values
    pub fn update_poses(
        &self,
        tree: &mut FrameTree,
        frames: &[FrameId],
        joints: &[f64],
    ) -> KinematicsResult<()> {
        if frames.len() != self.links.len() {
            return Err(KinematicsError::DimensionMismatch {
                what: "frame list",
                expected: format!("{} frames", self.links.len()),
                actual: format!("{} frames", frames.len()),
            });
        }

        for (id, tf) in frames.iter().zip(self.link_transforms(joints)?) {
            tree.set_pose(*id, tf)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::FrameTreeConfig;
    use approx::relative_eq;
    use nalgebra::{Point3, Vector3};
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    /// Planar two-link arm with a fixed tool offset
    fn planar_arm() -> KinematicChain {
        KinematicChain::new()
            .with_link("link1", DhParameters::revolute(1.0, 0.0, 0.0, 0.0))
            .with_link("link2", DhParameters::revolute(0.5, 0.0, 0.0, 0.0))
            .with_link("tool", DhParameters::fixed(0.1, 0.0, 0.0, 0.0))
    }

    #[test]
    fn test_dof_skips_fixed_links() {
        assert_eq!(planar_arm().dof(), 2);
        assert_eq!(planar_arm().links().len(), 3);
    }

    #[test]
    fn test_forward_zero_pose() {
        let tf = planar_arm().forward(&[0.0, 0.0]).unwrap();
        assert!(relative_eq!(tf.translation(), Vector3::new(1.6, 0.0, 0.0), epsilon = EPS));
    }

    #[test]
    fn test_forward_bent_elbow() {
        let tf = planar_arm().forward(&[0.0, FRAC_PI_2]).unwrap();
        assert!(relative_eq!(tf.translation(), Vector3::new(1.0, 0.6, 0.0), epsilon = EPS));
    }

    #[test]
    fn test_forward_matches_link_product() {
        let chain = planar_arm();
        let q = [0.3, -1.1];
        let links = chain.link_transforms(&q).unwrap();

        let expected = links[0].compose(&links[1]).compose(&links[2]);
        let tf = chain.forward(&q).unwrap();
        assert!(relative_eq!(*tf.matrix(), *expected.matrix(), epsilon = EPS));
    }

    #[test]
    fn test_prismatic_joint_extends_d() {
        let chain =
            KinematicChain::new().with_link("slide", DhParameters::prismatic(0.0, 0.0, 0.2, 0.0));
        let tf = chain.forward(&[0.3]).unwrap();
        assert!((tf.translation().z - 0.5).abs() < EPS);
    }

    #[test]
    fn test_joint_count_mismatch() {
        let result = planar_arm().forward(&[0.0]);
        assert_eq!(
            result,
            Err(KinematicsError::JointCountMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_attach_and_update() {
        let chain = planar_arm();
        let mut tree = FrameTree::new();
        let base = tree.create_frame("base");

        let frames = chain.attach_to(&mut tree, base, &[0.0, 0.0]).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(tree.search_frame(base, "tool"), Some(frames[2]));

        let tip = tree
            .transform_point(&Point3::origin(), frames[2], base)
            .unwrap();
        assert!(relative_eq!(tip, Point3::new(1.6, 0.0, 0.0), epsilon = EPS));

        chain
            .update_poses(&mut tree, &frames, &[FRAC_PI_2, 0.0])
            .unwrap();
        let tip = tree
            .transform_point(&Point3::origin(), frames[2], base)
            .unwrap();
        assert!(relative_eq!(tip, Point3::new(0.0, 1.6, 0.0), epsilon = EPS));
    }

    #[test]
    fn test_attach_rejects_duplicate_link_names() {
        let chain = KinematicChain::new()
            .with_link("link", DhParameters::revolute(1.0, 0.0, 0.0, 0.0))
            .with_link("link", DhParameters::revolute(1.0, 0.0, 0.0, 0.0));
        let mut tree = FrameTree::new();
        let base = tree.create_frame("base");

        let result = chain.attach_to(&mut tree, base, &[0.0, 0.0]);
        assert!(matches!(result, Err(KinematicsError::DuplicateName { .. })));
        assert_eq!(tree.len(), 1);
        assert!(tree.children(base).is_empty());
    }

    #[test]
    fn test_failed_attach_leaves_tree_unchanged() {
        let mut tree = FrameTree::new();
        let base = tree.create_frame("base");
        let elbow = tree.create_frame("elbow");
        tree.add_child(base, elbow, HomogeneousTM::identity()).unwrap();

        let chain = KinematicChain::new()
            .with_link("shoulder", DhParameters::revolute(0.0, FRAC_PI_2, 0.3, 0.0))
            .with_link("elbow", DhParameters::revolute(0.4, 0.0, 0.0, 0.0));

        let result = chain.attach_to(&mut tree, base, &[0.0, 0.0]);
        assert_eq!(
            result,
            Err(KinematicsError::DuplicateName {
                parent: "shoulder".to_string(),
                name: "elbow".to_string(),
            })
        );
        assert_eq!(tree.search_frame(base, "shoulder"), None);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.roots(), vec![base]);
        assert_eq!(tree.children(base), vec![elbow]);
    }

    #[test]
    fn test_permissive_attach_checks_first_link_against_siblings() {
        let mut tree = FrameTree::with_config(FrameTreeConfig::permissive());
        let base = tree.create_frame("base");
        let tool = tree.create_frame("tool");
        tree.add_child(base, tool, HomogeneousTM::identity()).unwrap();

        // Repeated names deeper in the chain are fine without tree-wide uniqueness
        let nested = KinematicChain::new()
            .with_link("arm", DhParameters::revolute(1.0, 0.0, 0.0, 0.0))
            .with_link("tool", DhParameters::fixed(0.1, 0.0, 0.0, 0.0));
        assert!(nested.attach_to(&mut tree, base, &[0.0]).is_ok());

        let clashing =
            KinematicChain::new().with_link("tool", DhParameters::fixed(0.1, 0.0, 0.0, 0.0));
        let before = tree.len();
        assert!(matches!(
            clashing.attach_to(&mut tree, base, &[]),
            Err(KinematicsError::DuplicateName { .. })
        ));
        assert_eq!(tree.len(), before);
    }

    #[test]
    fn test_chain_from_toml() {
        let text = r#"
            [[links]]
            name = "shoulder"
            dh = { a = 0.0, alpha = 1.5707963267948966, d = 0.3, theta = 0.0 }

            [[links]]
            name = "flange"
            dh = { a = 0.0, alpha = 0.0, d = 0.1, theta = 0.0, joint = "fixed" }
        "#;
        let chain: KinematicChain = toml::from_str(text).unwrap();

        assert_eq!(chain.dof(), 1);
        assert_eq!(chain.links()[0].dh.joint, JointKind::Revolute);
        assert_eq!(chain.links()[1].dh.joint, JointKind::Fixed);

        // Twist turns the flange offset from z into -y
        let tf = chain.forward(&[0.0]).unwrap();
        assert!(relative_eq!(tf.translation(), Vector3::new(0.0, -0.1, 0.3), epsilon = EPS));
    }
}
