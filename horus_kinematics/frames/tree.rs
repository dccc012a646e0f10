//! Frame Tree - named reference frame hierarchy
//!
//! Frames live in an arena owned by [`FrameTree`] and are addressed by
//! [`FrameId`]. Parent and child links are stored as ids, and every edge
//! carries the pose of the child frame expressed in its parent.

use super::config::FrameTreeConfig;
use super::error::{KinematicsError, KinematicsResult};
use super::htm::HomogeneousTM;
use nalgebra::Point3;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{debug, trace};

/// Handle to a frame inside a [`FrameTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(usize);

impl FrameId {
    /// Arena index of this frame
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the frame tree
#[derive(Debug, Clone)]
pub struct FrameNode {
    name: String,
    parent: Option<FrameId>,
    /// Children keyed by name, iterated in ascending key order
    children: BTreeMap<String, FrameId>,
    /// Pose of this frame in its parent (identity while parentless)
    pose: HomogeneousTM,
}

impl FrameNode {
    fn new(name: String) -> Self {
        Self {
            name,
            parent: None,
            children: BTreeMap::new(),
            pose: HomogeneousTM::identity(),
        }
    }

    /// Frame name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent frame (None for a root)
    pub fn parent(&self) -> Option<FrameId> {
        self.parent
    }

    /// Check if this frame has no parent
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Children in ascending name order
    pub fn children(&self) -> impl Iterator<Item = (&str, FrameId)> {
        self.children.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Pose of this frame expressed in its parent
    pub fn pose(&self) -> &HomogeneousTM {
        &self.pose
    }
}

/// Arena of reference frames forming one or more trees
///
/// Frames are created parentless and joined with [`FrameTree::add_child`].
/// The arena only grows; dropping the `FrameTree` tears every frame down.
#[derive(Debug, Default)]
pub struct FrameTree {
    frames: Vec<FrameNode>,
    config: FrameTreeConfig,
}

impl FrameTree {
    /// Create an empty tree with the default configuration
    pub fn new() -> Self {
        Self::with_config(FrameTreeConfig::default())
    }

    /// Create an empty tree with the given configuration
    pub fn with_config(config: FrameTreeConfig) -> Self {
        Self {
            frames: Vec::new(),
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &FrameTreeConfig {
        &self.config
    }

    /// Number of frames in the arena
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if the arena holds no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Create a new parentless frame with no children
    ///
    /// Names are not checked here; collisions are caught when frames are
    /// joined with [`FrameTree::add_child`].
    pub fn create_frame(&mut self, name: impl Into<String>) -> FrameId {
        let id = FrameId(self.frames.len());
        let node = FrameNode::new(name.into());
        trace!("created frame '{}' ({})", node.name, id);
        self.frames.push(node);
        id
    }

    /// Get a frame by id
    pub fn get(&self, id: FrameId) -> Option<&FrameNode> {
        self.frames.get(id.0)
    }

    /// Name of a frame
    pub fn name(&self, id: FrameId) -> Option<&str> {
        self.get(id).map(FrameNode::name)
    }

    /// Parent of a frame
    pub fn parent(&self, id: FrameId) -> Option<FrameId> {
        self.get(id).and_then(FrameNode::parent)
    }

    /// Direct children of a frame in ascending name order
    pub fn children(&self, id: FrameId) -> Vec<FrameId> {
        self.get(id)
            .map(|node| node.children.values().copied().collect())
            .unwrap_or_default()
    }

    /// All frames below `id`, in pre-order
    pub fn descendants(&self, id: FrameId) -> Vec<FrameId> {
        self.preorder(id).skip(1).collect()
    }

    /// All parentless frames
    pub fn roots(&self) -> Vec<FrameId> {
        (0..self.frames.len())
            .map(FrameId)
            .filter(|id| self.frames[id.0].is_root())
            .collect()
    }

    /// Root of the tree containing `id`
    pub fn root_of(&self, id: FrameId) -> Option<FrameId> {
        let mut current = id;
        let mut node = self.get(current)?;
        while let Some(parent) = node.parent {
            current = parent;
            node = self.get(current)?;
        }
        Some(current)
    }

    /// Check if `ancestor` lies strictly above `id`
    pub fn is_ancestor(&self, ancestor: FrameId, id: FrameId) -> bool {
        let mut current = self.parent(id);
        while let Some(frame) = current {
            if frame == ancestor {
                return true;
            }
            current = self.parent(frame);
        }
        false
    }

    /// Attach `child` under `parent` with the given edge pose
    ///
    /// `pose` is the pose of `child` expressed in `parent`. A child that
    /// already has a parent is moved. Collisions are rejected with
    /// `DuplicateName` and leave the tree unchanged: always against the
    /// parent's direct children, and against every frame of the destination
    /// tree when `unique_names` is configured.
    pub fn add_child(
        &mut self,
        parent: FrameId,
        child: FrameId,
        pose: HomogeneousTM,
    ) -> KinematicsResult<()> {
        let parent_name = self.node(parent)?.name.clone();
        let child_name = self.node(child)?.name.clone();

        if parent == child || self.is_ancestor(child, parent) {
            debug!("rejected attach of '{}' under '{}': cycle", child_name, parent_name);
            return Err(KinematicsError::CycleDetected {
                parent: parent_name,
                child: child_name,
            });
        }

        self.check_rigid(&child_name, &pose)?;

        if let Some(name) = self.find_collision(parent, child) {
            debug!(
                "rejected attach of '{}' under '{}': duplicate name '{}'",
                child_name, parent_name, name
            );
            return Err(KinematicsError::DuplicateName {
                parent: parent_name,
                name,
            });
        }

        if let Some(old_parent) = self.frames[child.0].parent {
            let siblings = &mut self.frames[old_parent.0].children;
            if siblings.get(&child_name) == Some(&child) {
                siblings.remove(&child_name);
            }
        }

        let node = &mut self.frames[child.0];
        node.parent = Some(parent);
        node.pose = pose;
        self.frames[parent.0].children.insert(child_name.clone(), child);

        debug!("attached frame '{}' under '{}'", child_name, parent_name);
        Ok(())
    }

    /// Replace the pose stored on the edge above `id`
    pub fn set_pose(&mut self, id: FrameId, pose: HomogeneousTM) -> KinematicsResult<()> {
        let name = self.node(id)?.name.clone();
        self.check_rigid(&name, &pose)?;
        self.frames[id.0].pose = pose;
        trace!("updated pose of frame '{}'", name);
        Ok(())
    }

    /// Pose of `id` expressed in its parent
    pub fn pose_in_parent(&self, id: FrameId) -> Option<HomogeneousTM> {
        self.get(id).map(|node| node.pose)
    }

    /// Depth-first pre-order search of `from` and its descendants
    ///
    /// `from` is tested first, then its children in ascending name order.
    pub fn search_child_frame(&self, from: FrameId, name: &str) -> Option<FrameId> {
        let found = self.preorder(from).find(|id| self.frames[id.0].name == name);
        trace!("search_child_frame('{}') from {} -> {:?}", name, from, found);
        found
    }

    /// Tree-wide search: walk up to the root, then search down from it
    pub fn search_frame(&self, from: FrameId, name: &str) -> Option<FrameId> {
        let root = self.root_of(from)?;
        self.search_child_frame(root, name)
    }

    /// Pose of `id` expressed in the root of its tree
    pub fn pose_in_root(&self, id: FrameId) -> KinematicsResult<HomogeneousTM> {
        let path = self.path_to_root(id)?;
        Ok(self.pose_below(&path))
    }

    /// Pose of `target` expressed in `reference`
    ///
    /// The returned transform maps coordinates in `target` to coordinates in
    /// `reference`. It is composed through the closest common ancestor.
    pub fn resolve(&self, target: FrameId, reference: FrameId) -> KinematicsResult<HomogeneousTM> {
        if target == reference {
            self.node(target)?;
            return Ok(HomogeneousTM::identity());
        }

        let (target_path, reference_path) = self.paths_to_common_ancestor(target, reference)?;

        // ancestor <- target, ancestor <- reference
        let target_in_ancestor = self.pose_below(&target_path);
        let reference_in_ancestor = self.pose_below(&reference_path);

        Ok(reference_in_ancestor.inverse().compose(&target_in_ancestor))
    }

    /// Like [`FrameTree::resolve`], with both frames looked up by name from `from`
    pub fn resolve_by_name(
        &self,
        from: FrameId,
        target: &str,
        reference: &str,
    ) -> KinematicsResult<HomogeneousTM> {
        let target_id = self
            .search_frame(from, target)
            .ok_or_else(|| KinematicsError::FrameNotFound(target.to_string()))?;
        let reference_id = self
            .search_frame(from, reference)
            .ok_or_else(|| KinematicsError::FrameNotFound(reference.to_string()))?;
        self.resolve(target_id, reference_id)
    }

    /// Express a point given in `source` coordinates in `target` coordinates
    pub fn transform_point(
        &self,
        point: &Point3<f64>,
        source: FrameId,
        target: FrameId,
    ) -> KinematicsResult<Point3<f64>> {
        Ok(self.resolve(source, target)?.transform_point(point))
    }

    /// Frames visited going from `source` to `target` through their common ancestor
    pub fn frame_chain(&self, source: FrameId, target: FrameId) -> KinematicsResult<Vec<FrameId>> {
        if source == target {
            self.node(source)?;
            return Ok(vec![source]);
        }

        let (mut source_path, target_path) = self.paths_to_common_ancestor(source, target)?;

        // Combine paths: source -> common ancestor -> target
        source_path.extend(target_path.into_iter().rev().skip(1));
        Ok(source_path)
    }

    /// Check that a run of new frames can hang below `base`, each under the previous one
    ///
    /// Applies the rules of [`FrameTree::add_child`] to every link without
    /// touching the tree, so a caller can reject the whole run up front.
    pub(crate) fn check_chain(
        &self,
        base: FrameId,
        links: &[(&str, HomogeneousTM)],
    ) -> KinematicsResult<()> {
        let mut parent_name = self.node(base)?.name.clone();

        let mut taken: HashSet<String> = HashSet::new();
        if self.config.unique_names {
            if let Some(root) = self.root_of(base) {
                taken.extend(self.preorder(root).map(|id| self.frames[id.0].name.clone()));
            }
        } else {
            taken.extend(self.frames[base.0].children.keys().cloned());
        }

        for (name, pose) in links {
            self.check_rigid(name, pose)?;

            if taken.contains(*name) {
                debug!(
                    "rejected chain below '{}': duplicate name '{}'",
                    self.frames[base.0].name, name
                );
                return Err(KinematicsError::DuplicateName {
                    parent: parent_name,
                    name: name.to_string(),
                });
            }

            if self.config.unique_names {
                taken.insert(name.to_string());
            } else {
                // Later links only have fresh frames as parents
                taken.clear();
            }
            parent_name = name.to_string();
        }

        Ok(())
    }

    fn node(&self, id: FrameId) -> KinematicsResult<&FrameNode> {
        self.get(id)
            .ok_or_else(|| KinematicsError::FrameNotFound(id.to_string()))
    }

    fn preorder(&self, from: FrameId) -> Preorder<'_> {
        let stack = if self.get(from).is_some() {
            vec![from]
        } else {
            Vec::new()
        };
        Preorder { tree: self, stack }
    }

    fn check_rigid(&self, name: &str, pose: &HomogeneousTM) -> KinematicsResult<()> {
        match self.config.rigid_tolerance {
            Some(tolerance) if !pose.is_rigid(tolerance) => {
                debug!("rejected non-rigid pose for frame '{}'", name);
                Err(KinematicsError::NotRigid(name.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// First name of `child`'s subtree that would collide after attaching it to `parent`
    fn find_collision(&self, parent: FrameId, child: FrameId) -> Option<String> {
        let child_name = &self.frames[child.0].name;
        if let Some(existing) = self.frames[parent.0].children.get(child_name) {
            if *existing != child {
                return Some(child_name.clone());
            }
        }

        if !self.config.unique_names {
            return None;
        }

        let moving: HashSet<FrameId> = self.preorder(child).collect();
        let root = self.root_of(parent)?;
        let taken: HashSet<&str> = self
            .preorder(root)
            .filter(|id| !moving.contains(id))
            .map(|id| self.frames[id.0].name.as_str())
            .collect();

        self.preorder(child)
            .map(|id| &self.frames[id.0].name)
            .find(|name| taken.contains(name.as_str()))
            .cloned()
    }

    /// `[id, parent, ..., root]`
    fn path_to_root(&self, id: FrameId) -> KinematicsResult<Vec<FrameId>> {
        let mut path = vec![id];
        let mut current = self.node(id)?;
        while let Some(parent) = current.parent {
            path.push(parent);
            current = self.node(parent)?;
        }
        Ok(path)
    }

    /// Paths `[a, ..., ancestor]` and `[b, ..., ancestor]` to the closest common ancestor
    fn paths_to_common_ancestor(
        &self,
        a: FrameId,
        b: FrameId,
    ) -> KinematicsResult<(Vec<FrameId>, Vec<FrameId>)> {
        let a_path = self.path_to_root(a)?;
        let b_path = self.path_to_root(b)?;

        for (i, frame) in a_path.iter().enumerate() {
            if let Some(j) = b_path.iter().position(|f| f == frame) {
                return Ok((a_path[..=i].to_vec(), b_path[..=j].to_vec()));
            }
        }

        Err(KinematicsError::NoCommonRoot(
            self.frames[a.0].name.clone(),
            self.frames[b.0].name.clone(),
        ))
    }

    /// Pose of `path[0]` in the last frame of `path`, composing edge poses downwards
    fn pose_below(&self, path: &[FrameId]) -> HomogeneousTM {
        let Some((_, below)) = path.split_last() else {
            return HomogeneousTM::identity();
        };

        below
            .iter()
            .rev()
            .fold(HomogeneousTM::identity(), |acc, id| acc.compose(&self.frames[id.0].pose))
    }
}

/// Pre-order traversal with children in ascending name order
struct Preorder<'a> {
    tree: &'a FrameTree,
    stack: Vec<FrameId>,
}

impl Iterator for Preorder<'_> {
    type Item = FrameId;

    fn next(&mut self) -> Option<FrameId> {
        let id = self.stack.pop()?;
        // Reverse so the smallest key is popped first
        self.stack
            .extend(self.tree.frames[id.0].children.values().rev().copied());
        Some(id)
    }
}

/// Thread-safe wrapper for FrameTree
///
/// Mutations go through the write lock; a finished tree can be shared
/// freely behind the read lock.
pub type SharedFrameTree = Arc<RwLock<FrameTree>>;

/// Create a new shared frame tree
pub fn create_shared_tree(config: FrameTreeConfig) -> SharedFrameTree {
    Arc::new(RwLock::new(FrameTree::with_config(config)))
}
