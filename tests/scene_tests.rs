//! Scene Integration Tests
//!
//! Tests for:
//! - Scene: create/remove nodes, attach/detach hierarchy
//! - Node query: names, root_nodes, subtree collection, visibility
//! - Bounds and ray queries against mesh geometry

use arview::math::Ray;
use arview::scene::primitives::{create_box, create_plane};
use arview::scene::{Mesh, Node, Scene};
use glam::{Quat, Vec3};
use std::f32::consts::FRAC_PI_4;

const EPSILON: f32 = 1e-4;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

fn unit_box(scene: &mut Scene, name: &'static str, position: Vec3) -> arview::NodeHandle {
    let handle = scene.add_mesh(Mesh::new(name, create_box(1.0, 1.0, 1.0)), None);
    scene.get_node_mut(handle).unwrap().transform.position = position;
    handle
}

// ============================================================================
// Node Creation & Removal
// ============================================================================

#[test]
fn scene_create_node() {
    let mut scene = Scene::new();
    let handle = scene.create_node();
    assert!(scene.get_node(handle).is_some());
    assert!(scene.root_nodes.contains(&handle));
}

#[test]
fn scene_create_node_with_name() {
    let mut scene = Scene::new();
    let handle = scene.create_node_with_name("blade");
    assert_eq!(scene.get_name(handle), Some("blade"));
    assert_eq!(scene.find_by_name("blade"), Some(handle));
}

#[test]
fn scene_set_name() {
    let mut scene = Scene::new();
    let handle = scene.create_node();
    scene.set_name(handle, "renamed");
    assert_eq!(scene.get_name(handle), Some("renamed"));
}

#[test]
fn scene_remove_node_removes_subtree_and_meshes() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    let child = scene.add_mesh(Mesh::new("part", create_box(1.0, 1.0, 1.0)), Some(parent));
    let grandchild = scene.add_to_parent(Node::new(), child);
    assert_eq!(scene.meshes.len(), 1);

    scene.remove_node(parent);

    assert!(!scene.contains(parent));
    assert!(!scene.contains(child));
    assert!(!scene.contains(grandchild));
    assert!(scene.meshes.is_empty());
    assert!(scene.root_nodes.is_empty());
}

#[test]
fn scene_remove_stale_handle_is_noop() {
    let mut scene = Scene::new();
    let handle = scene.create_node();
    scene.remove_node(handle);
    scene.remove_node(handle);
    assert_eq!(scene.node_count(), 0);
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn scene_attach_sets_parent_child() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    let child = scene.create_node();
    scene.attach(child, parent);

    assert_eq!(scene.parent_of(child), Some(parent));
    assert_eq!(scene.get_node(parent).unwrap().children(), &[child]);
    assert!(!scene.root_nodes.contains(&child));
}

#[test]
fn scene_attach_removes_from_old_parent() {
    let mut scene = Scene::new();
    let a = scene.create_node();
    let b = scene.create_node();
    let child = scene.add_to_parent(Node::new(), a);

    scene.attach(child, b);

    assert!(scene.get_node(a).unwrap().children().is_empty());
    assert_eq!(scene.parent_of(child), Some(b));
}

#[test]
fn scene_attach_to_self_is_noop() {
    let mut scene = Scene::new();
    let node = scene.create_node();
    scene.attach(node, node);
    assert_eq!(scene.parent_of(node), None);
}

#[test]
fn scene_attach_rejects_cycles() {
    let mut scene = Scene::new();
    let a = scene.create_node();
    let b = scene.add_to_parent(Node::new(), a);
    scene.attach(a, b);
    assert_eq!(scene.parent_of(a), None);
    assert_eq!(scene.parent_of(b), Some(a));
}

#[test]
fn scene_detach_moves_to_root() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    let child = scene.add_to_parent(Node::new(), parent);
    scene.detach(child);
    assert_eq!(scene.parent_of(child), None);
    assert!(scene.root_nodes.contains(&child));
}

#[test]
fn scene_is_descendant_of_is_strict() {
    let mut scene = Scene::new();
    let root = scene.create_node();
    let mid = scene.add_to_parent(Node::new(), root);
    let leaf = scene.add_to_parent(Node::new(), mid);

    assert!(scene.is_descendant_of(leaf, root));
    assert!(scene.is_descendant_of(mid, root));
    assert!(!scene.is_descendant_of(root, root));
    assert!(!scene.is_descendant_of(root, leaf));
}

#[test]
fn scene_collect_subtree_is_depth_first() {
    let mut scene = Scene::new();
    let root = scene.create_node();
    let a = scene.add_to_parent(Node::new(), root);
    let a1 = scene.add_to_parent(Node::new(), a);
    let b = scene.add_to_parent(Node::new(), root);

    assert_eq!(scene.collect_subtree(root), vec![root, a, a1, b]);
}

#[test]
fn scene_visibility_is_inherited() {
    let mut scene = Scene::new();
    let root = scene.create_node();
    let child = scene.add_to_parent(Node::new(), root);

    assert!(scene.is_visible_in_hierarchy(child));
    scene.set_visible(root, false);
    assert!(!scene.is_visible_in_hierarchy(child));
    assert!(scene.get_node(child).unwrap().visible);
}

// ============================================================================
// Bounds
// ============================================================================

#[test]
fn world_bounds_unions_subtree_meshes() {
    let mut scene = Scene::new();
    let group = scene.create_node();
    let a = scene.add_mesh(Mesh::new("a", create_box(1.0, 1.0, 1.0)), Some(group));
    let b = scene.add_mesh(Mesh::new("b", create_box(1.0, 1.0, 1.0)), Some(group));
    scene.get_node_mut(a).unwrap().transform.position = Vec3::new(-2.0, 0.0, 0.0);
    scene.get_node_mut(b).unwrap().transform.position = Vec3::new(2.0, 1.0, 0.0);

    let bounds = scene.world_bounds(group).unwrap();
    assert!(vec3_approx(bounds.min, Vec3::new(-2.5, -0.5, -0.5)));
    assert!(vec3_approx(bounds.max, Vec3::new(2.5, 1.5, 0.5)));
}

#[test]
fn world_bounds_include_hidden_meshes() {
    let mut scene = Scene::new();
    let part = unit_box(&mut scene, "part", Vec3::ZERO);
    scene.set_visible(part, false);
    assert!(scene.world_bounds(part).is_some());
}

#[test]
fn vertex_bounds_are_tight_under_rotation() {
    let mut scene = Scene::new();
    let part = unit_box(&mut scene, "part", Vec3::ZERO);
    scene.get_node_mut(part).unwrap().transform.rotation = Quat::from_rotation_y(FRAC_PI_4);

    let loose = scene.world_bounds(part).unwrap();
    let tight = scene.world_vertex_bounds(part).unwrap();
    // Rotating about Y keeps the vertical extent exact either way
    assert!((tight.min.y + 0.5).abs() < EPSILON);
    assert!(tight.max.x <= loose.max.x + EPSILON);
}

#[test]
fn world_bounds_none_without_meshes() {
    let mut scene = Scene::new();
    let empty = scene.create_node();
    assert!(scene.world_bounds(empty).is_none());
}

// ============================================================================
// Ray Queries
// ============================================================================

#[test]
fn raycast_returns_nearest_mesh() {
    let mut scene = Scene::new();
    let near = unit_box(&mut scene, "near", Vec3::new(0.0, 0.0, -3.0));
    let _far = unit_box(&mut scene, "far", Vec3::new(0.0, 0.0, -6.0));

    let hit = scene.raycast(&Ray::new(Vec3::ZERO, Vec3::NEG_Z)).unwrap();
    assert_eq!(hit.node, near);
    assert!((hit.distance - 2.5).abs() < EPSILON);
    assert!(vec3_approx(hit.point, Vec3::new(0.0, 0.0, -2.5)));
}

#[test]
fn raycast_skips_hidden_nodes() {
    let mut scene = Scene::new();
    let near = unit_box(&mut scene, "near", Vec3::new(0.0, 0.0, -3.0));
    let far = unit_box(&mut scene, "far", Vec3::new(0.0, 0.0, -6.0));
    scene.set_visible(near, false);

    let hit = scene.raycast(&Ray::new(Vec3::ZERO, Vec3::NEG_Z)).unwrap();
    assert_eq!(hit.node, far);
}

#[test]
fn raycast_subtree_tests_geometry_not_bounds() {
    let mut scene = Scene::new();
    // An L-shaped pair: the union box covers the empty corner
    let group = scene.create_node();
    let a = scene.add_mesh(Mesh::new("a", create_box(1.0, 1.0, 1.0)), Some(group));
    let b = scene.add_mesh(Mesh::new("b", create_box(1.0, 1.0, 1.0)), Some(group));
    scene.get_node_mut(a).unwrap().transform.position = Vec3::new(0.0, 0.0, -5.0);
    scene.get_node_mut(b).unwrap().transform.position = Vec3::new(1.0, 1.0, -5.0);

    let corner = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::NEG_Z);
    assert!(scene.raycast_subtree(group, &corner).is_none());
    assert!(scene.raycast_bounds(group, &corner).is_some());
}

#[test]
fn raycast_through_scaled_parent_reports_world_distance() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    scene.get_node_mut(parent).unwrap().transform.scale = Vec3::splat(2.0);
    let child = scene.add_mesh(Mesh::new("floor", create_plane(1.0, 1.0)), Some(parent));

    let ray = Ray::new(Vec3::new(0.2, 5.0, 0.2), Vec3::NEG_Y);
    let hit = scene.raycast_subtree(parent, &ray).unwrap();
    assert_eq!(hit.node, child);
    assert!((hit.distance - 5.0).abs() < EPSILON);
}

#[test]
fn scene_unique_ids() {
    let a = Scene::new();
    let b = Scene::new();
    assert_ne!(a.id, b.id);
}
