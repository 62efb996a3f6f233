//! Transform and world-matrix tests
//!
//! Tests for:
//! - Transform TRS operations and dirty checking
//! - look_at orientation and yaw rotation
//! - Hierarchical matrix propagation (full scene and subtree)
//! - World-space edits through parent transforms

use arview::scene::{Node, Scene, Transform};
use glam::{Mat4, Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

fn quat_approx(a: Quat, b: Quat) -> bool {
    a.angle_between(b) < 1e-4
}

// ============================================================================
// Transform Unit Tests
// ============================================================================

#[test]
fn cache_rebuilds_only_after_trs_edits() {
    let mut t = Transform::new();
    assert!(t.update_local_matrix(), "fresh transform has no cache");

    let edits: [fn(&mut Transform); 3] = [
        |t| t.position.x += 0.5,
        |t| t.rotation = Quat::from_rotation_z(0.3) * t.rotation,
        |t| t.scale *= 1.5,
    ];
    for edit in edits {
        assert!(!t.update_local_matrix());
        edit(&mut t);
        assert!(t.update_local_matrix());
    }

    let cached = Mat4::from(*t.local_matrix());
    assert!(cached.abs_diff_eq(Mat4::from(t.compose()), EPSILON));
}

#[test]
fn camera_style_look_at_faces_target() {
    let mut t = Transform::from_trs(Vec3::new(0.0, 2.0, 6.0), Quat::IDENTITY, Vec3::ONE);
    t.look_at(Vec3::new(0.0, 2.0, 0.0), Vec3::Y);
    assert!(vec3_approx(t.rotation * Vec3::NEG_Z, Vec3::NEG_Z));

    // Straight overhead gives no usable right vector
    let before = t.rotation;
    t.look_at(t.position + Vec3::Y * 3.0, Vec3::Y);
    assert_eq!(t.rotation, before);
}

#[test]
fn transform_rotate_yaw_accumulates_about_vertical() {
    let mut t = Transform::new();
    t.rotation = Quat::from_rotation_x(0.4);
    t.rotate_yaw(FRAC_PI_4);
    t.rotate_yaw(FRAC_PI_4);

    let expected = Quat::from_rotation_y(FRAC_PI_2) * Quat::from_rotation_x(0.4);
    assert!(quat_approx(t.rotation, expected));
}

#[test]
fn transform_look_at_from_offset_position() {
    let mut t = Transform::new();
    t.position = Vec3::new(3.0, 0.0, 0.0);
    t.look_at(Vec3::ZERO, Vec3::Y);

    let forward = t.rotation * Vec3::NEG_Z;
    assert!(vec3_approx(forward, Vec3::NEG_X));
    assert!(vec3_approx(t.rotation * Vec3::Y, Vec3::Y));
}

#[test]
fn transform_compose_ignores_stale_cache() {
    let mut t = Transform::from_trs(Vec3::X, Quat::IDENTITY, Vec3::ONE);
    t.update_local_matrix();
    t.position = Vec3::new(0.0, 4.0, 0.0);

    let cached: Vec3 = t.local_matrix().translation.into();
    let fresh: Vec3 = t.compose().translation.into();
    assert!(vec3_approx(cached, Vec3::X));
    assert!(vec3_approx(fresh, Vec3::new(0.0, 4.0, 0.0)));
}

#[test]
fn transform_mark_dirty_forces_update() {
    let mut t = Transform::new();
    t.update_local_matrix();
    assert!(!t.update_local_matrix());

    t.mark_dirty();
    assert!(t.update_local_matrix());
}

// ============================================================================
// Hierarchy Propagation
// ============================================================================

fn create_chain(scene: &mut Scene, length: usize) -> Vec<arview::NodeHandle> {
    let mut handles = Vec::new();
    for i in 0..length {
        let mut node = Node::new();
        node.transform.position = Vec3::new(1.0, 0.0, 0.0);
        let handle = if i == 0 {
            scene.add_node(node)
        } else {
            scene.add_to_parent(node, handles[i - 1])
        };
        handles.push(handle);
    }
    handles
}

#[test]
fn hierarchy_chain_accumulates_translation() {
    let mut scene = Scene::new();
    let chain = create_chain(&mut scene, 5);
    scene.update_matrix_world();

    for (i, &handle) in chain.iter().enumerate() {
        let world = scene.get_node(handle).unwrap().world_matrix();
        let expected = Vec3::new((i + 1) as f32, 0.0, 0.0);
        assert!(vec3_approx(world.translation.into(), expected), "node {i}");
    }
}

#[test]
fn fresh_world_matrix_matches_propagated_cache() {
    let mut scene = Scene::new();
    let chain = create_chain(&mut scene, 4);
    scene.get_node_mut(chain[1]).unwrap().transform.rotation = Quat::from_rotation_z(FRAC_PI_2);
    scene.update_matrix_world();

    let leaf = *chain.last().unwrap();
    let cached: Vec3 = scene.get_node(leaf).unwrap().world_matrix().translation.into();
    let fresh = scene.world_position(leaf).unwrap();
    assert!(vec3_approx(cached, fresh));
}

#[test]
fn update_subtree_only_touches_subtree() {
    let mut scene = Scene::new();
    let a = create_chain(&mut scene, 2);
    let b = create_chain(&mut scene, 2);
    scene.update_matrix_world();

    scene.get_node_mut(a[0]).unwrap().transform.position = Vec3::new(10.0, 0.0, 0.0);
    scene.get_node_mut(b[0]).unwrap().transform.position = Vec3::new(20.0, 0.0, 0.0);
    scene.update_subtree(a[0]);

    let a_leaf: Vec3 = scene.get_node(a[1]).unwrap().world_matrix().translation.into();
    let b_leaf: Vec3 = scene.get_node(b[1]).unwrap().world_matrix().translation.into();
    assert!(vec3_approx(a_leaf, Vec3::new(11.0, 0.0, 0.0)));
    // Not refreshed yet
    assert!(vec3_approx(b_leaf, Vec3::new(2.0, 0.0, 0.0)));
}

// ============================================================================
// World-space edits
// ============================================================================

#[test]
fn translate_world_respects_parent_rotation_and_scale() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    {
        let t = &mut scene.get_node_mut(parent).unwrap().transform;
        t.rotation = Quat::from_rotation_y(FRAC_PI_2);
        t.scale = Vec3::splat(2.0);
    }
    let child = scene.add_to_parent(Node::new(), parent);

    let before = scene.world_position(child).unwrap();
    scene.translate_world(child, Vec3::new(1.0, 0.0, 0.0));
    let after = scene.world_position(child).unwrap();

    assert!(vec3_approx(after - before, Vec3::new(1.0, 0.0, 0.0)));
}

#[test]
fn set_world_rotation_compensates_parent() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    scene.get_node_mut(parent).unwrap().transform.rotation = Quat::from_rotation_x(0.7);
    let child = scene.add_to_parent(Node::new(), parent);

    let target = Quat::from_rotation_y(1.1);
    scene.set_world_rotation(child, target);
    assert!(quat_approx(scene.world_rotation(child).unwrap(), target));
}

#[test]
fn set_world_position_places_origin() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    scene.get_node_mut(parent).unwrap().transform.position = Vec3::new(3.0, 1.0, 0.0);
    let child = scene.add_to_parent(Node::new(), parent);

    scene.set_world_position(child, Vec3::new(-1.0, 2.0, 5.0));
    assert!(vec3_approx(scene.world_position(child).unwrap(), Vec3::new(-1.0, 2.0, 5.0)));
}
