//! Frame tree and transform behaviour through the public API

use approx::relative_eq;
use horus_kinematics::{
    DhParameters, FrameTree, FrameTreeConfig, HomogeneousTM, KinematicChain, KinematicsError,
};
use nalgebra::{DMatrix, Point3};
use std::f64::consts::FRAC_PI_2;

const EPS: f64 = 1e-9;

#[test]
fn test_base_arm_gripper_lookup() {
    let mut tree = FrameTree::new();
    let base = tree.create_frame("base");
    let arm1 = tree.create_frame("arm1");
    let gripper = tree.create_frame("gripper");

    tree.add_child(base, arm1, HomogeneousTM::from_dh(0.4, 0.0, 0.2, 0.0))
        .unwrap();
    tree.add_child(arm1, gripper, HomogeneousTM::from_dh(0.3, 0.0, 0.0, FRAC_PI_2))
        .unwrap();

    assert_eq!(tree.search_frame(base, "gripper"), Some(gripper));
    assert_eq!(tree.search_frame(arm1, "base"), Some(base));
    assert_eq!(tree.search_frame(base, "missing"), None);
}

#[test]
fn test_duplicate_child_policy_is_reject() {
    let mut tree = FrameTree::new();
    let base = tree.create_frame("base");
    let first = tree.create_frame("arm1");
    let second = tree.create_frame("arm1");

    assert!(tree.add_child(base, first, HomogeneousTM::identity()).is_ok());
    assert!(matches!(
        tree.add_child(base, second, HomogeneousTM::identity()),
        Err(KinematicsError::DuplicateName { .. })
    ));
    assert_eq!(tree.children(base), vec![first]);
}

#[test]
fn test_point_round_trip_between_frames() {
    let mut tree = FrameTree::new();
    let world = tree.create_frame("world");
    let camera = tree.create_frame("camera");
    let tool = tree.create_frame("tool");

    let camera_pose = HomogeneousTM::from_parts(
        &HomogeneousTM::rotation_matrix(0.4, -0.2, 1.0),
        &HomogeneousTM::translation_vector(1.0, 2.0, 0.5),
    );
    let tool_pose = HomogeneousTM::from_parts(
        &HomogeneousTM::rotation_matrix(-1.3, 0.7, 0.1),
        &HomogeneousTM::translation_vector(-0.5, 0.0, 1.5),
    );
    tree.add_child(world, camera, camera_pose).unwrap();
    tree.add_child(world, tool, tool_pose).unwrap();

    let p = Point3::new(0.2, -0.1, 0.8);
    let in_tool = tree.transform_point(&p, camera, tool).unwrap();
    let back = tree.transform_point(&in_tool, tool, camera).unwrap();
    assert!(relative_eq!(back, p, epsilon = EPS));

    // Same answer as composing the edge poses by hand
    let expected = tool_pose.inverse().compose(&camera_pose).transform_point(&p);
    assert!(relative_eq!(in_tool, expected, epsilon = EPS));
}

#[test]
fn test_chain_in_tree_matches_forward_kinematics() {
    let chain = KinematicChain::new()
        .with_link("shoulder", DhParameters::revolute(0.0, FRAC_PI_2, 0.33, 0.0))
        .with_link("upper_arm", DhParameters::revolute(0.45, 0.0, 0.0, 0.0))
        .with_link("forearm", DhParameters::revolute(0.4, 0.0, 0.0, 0.0))
        .with_link("flange", DhParameters::fixed(0.0, 0.0, 0.08, 0.0));
    let q = [0.2, -0.6, 1.1];

    let mut tree = FrameTree::new();
    let world = tree.create_frame("world");
    let base = tree.create_frame("base");
    tree.add_child(world, base, HomogeneousTM::from_translation(0.0, 0.0, 0.75))
        .unwrap();
    let frames = chain.attach_to(&mut tree, base, &q).unwrap();

    let via_tree = tree.resolve_by_name(world, "flange", "base").unwrap();
    let via_chain = chain.forward(&q).unwrap();
    assert!(relative_eq!(*via_tree.matrix(), *via_chain.matrix(), epsilon = EPS));

    let in_world = tree.pose_in_root(frames[3]).unwrap();
    assert!((in_world.translation().z - via_chain.translation().z - 0.75).abs() < EPS);
}

#[test]
fn test_dynamic_inputs_are_shape_checked() {
    let rotation = DMatrix::<f64>::identity(2, 2);
    let translation = DMatrix::<f64>::zeros(3, 1);

    let err = HomogeneousTM::from_rotation_translation(&rotation, &translation).unwrap_err();
    assert!(matches!(err, KinematicsError::DimensionMismatch { .. }));
    assert_eq!(err.to_string(), "rotation must be 3x3, got 2x2");
}

#[test]
fn test_permissive_tree_allows_repeated_names_in_branches() {
    let mut tree = FrameTree::with_config(FrameTreeConfig::permissive());
    let base = tree.create_frame("base");
    let left = tree.create_frame("left");
    let right = tree.create_frame("right");
    let left_tool = tree.create_frame("tool");
    let right_tool = tree.create_frame("tool");

    tree.add_child(base, left, HomogeneousTM::identity()).unwrap();
    tree.add_child(base, right, HomogeneousTM::identity()).unwrap();
    tree.add_child(left, left_tool, HomogeneousTM::identity()).unwrap();
    tree.add_child(right, right_tool, HomogeneousTM::identity())
        .unwrap();

    // First match in key order wins from anywhere in the tree
    assert_eq!(tree.search_frame(right_tool, "tool"), Some(left_tool));
    assert_eq!(tree.search_child_frame(right, "tool"), Some(right_tool));
}
