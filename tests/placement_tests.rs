//! AR Placement Tests
//!
//! Tests for:
//! - Reference-space negotiation and hit-test source failures
//! - Reticle tracking and commit-on-surface
//! - Re-placement, yaw nudges and session teardown

use arview::config::PlacementSettings;
use arview::errors::{Result, ViewerError};
use arview::math::Pose;
use arview::placement::{
    HitTestSource, PlacementController, PlacementNodes, PlacementOverlay, PlacementState, ReferenceSpace,
    ReferenceSpaceKind, XrHitTestProvider,
};
use arview::scene::primitives::{create_box, create_plane, create_ring};
use arview::scene::{Mesh, Node, Scene};
use glam::{Quat, Vec3, Vec4};

const EPSILON: f32 = 1e-4;

// ============================================================================
// Mock host
// ============================================================================

#[derive(Default)]
struct MockProvider {
    deny_local: bool,
    deny_viewer: bool,
    deny_source: bool,
    hits: Vec<Pose>,
    requested: Vec<ReferenceSpaceKind>,
    cancelled: Vec<HitTestSource>,
}

impl XrHitTestProvider for MockProvider {
    fn request_reference_space(&mut self, kind: ReferenceSpaceKind) -> Result<ReferenceSpace> {
        self.requested.push(kind);
        let denied = match kind {
            ReferenceSpaceKind::Local => self.deny_local,
            ReferenceSpaceKind::Viewer => self.deny_viewer,
        };
        if denied {
            Err(ViewerError::ReferenceSpaceUnavailable)
        } else {
            Ok(ReferenceSpace { kind, id: 1 })
        }
    }

    fn request_hit_test_source(&mut self, _space: &ReferenceSpace) -> Result<HitTestSource> {
        if self.deny_source {
            Err(ViewerError::HitTestUnavailable("not supported".into()))
        } else {
            Ok(HitTestSource(42))
        }
    }

    fn hit_test_results(&mut self, _source: HitTestSource) -> Vec<Pose> {
        self.hits.clone()
    }

    fn cancel_hit_test_source(&mut self, source: HitTestSource) {
        self.cancelled.push(source);
    }
}

struct Fixture {
    scene: Scene,
    nodes: PlacementNodes,
    placement: PlacementController,
}

fn fixture() -> Fixture {
    let mut scene = Scene::new();
    let model_root = scene.create_node_with_name("product_root");
    let body = scene.add_mesh(Mesh::new("body", create_box(1.0, 1.0, 1.0)), Some(model_root));
    scene.get_node_mut(body).unwrap().transform.position = Vec3::new(0.0, 0.7, 0.0);

    let reticle = scene.add_mesh(Mesh::new("reticle", create_ring(0.08, 0.1, 32)), None);
    let ar_ground = scene.add_mesh(Mesh::new("ar_ground", create_plane(4.0, 4.0)), None);
    let floor = scene.add_mesh(Mesh::new("floor", create_plane(20.0, 20.0)), None);
    let _unrelated = scene.add_node(Node::with_name("lights"));

    let nodes = PlacementNodes {
        model_root,
        reticle,
        ar_ground,
        floor,
    };
    Fixture {
        scene,
        nodes,
        placement: PlacementController::new(nodes, PlacementSettings::default()),
    }
}

fn surface(position: Vec3) -> Pose {
    Pose::new(position, Quat::IDENTITY)
}

fn visible(scene: &Scene, node: arview::scene::NodeHandle) -> bool {
    scene.get_node(node).unwrap().visible
}

// ============================================================================
// Session start
// ============================================================================

#[test]
fn session_start_hides_model_and_floor() {
    let mut f = fixture();
    let mut host = MockProvider::default();

    f.placement.session_start(&mut f.scene, &mut host);

    assert!(f.placement.is_awaiting());
    assert!(!visible(&f.scene, f.nodes.model_root));
    assert!(!visible(&f.scene, f.nodes.floor));
    assert!(!visible(&f.scene, f.nodes.reticle));
    assert!(f.scene.background.is_none(), "camera feed shows through");
    assert_eq!(f.placement.reference_space(), Some(ReferenceSpaceKind::Local));
    assert!(f.placement.hit_test_available());
    assert_eq!(
        f.placement.overlay(),
        PlacementOverlay {
            prompt_visible: true,
            replace_visible: false,
            rotate_controls_enabled: false,
        }
    );
}

#[test]
fn viewer_space_is_the_fallback() {
    let mut f = fixture();
    let mut host = MockProvider {
        deny_local: true,
        ..MockProvider::default()
    };

    f.placement.session_start(&mut f.scene, &mut host);

    assert_eq!(host.requested, vec![ReferenceSpaceKind::Local, ReferenceSpaceKind::Viewer]);
    assert_eq!(f.placement.reference_space(), Some(ReferenceSpaceKind::Viewer));
    assert!(f.placement.hit_test_available());
}

#[test]
fn no_reference_space_disables_placement() {
    let mut f = fixture();
    let mut host = MockProvider {
        deny_local: true,
        deny_viewer: true,
        hits: vec![surface(Vec3::ZERO)],
        ..MockProvider::default()
    };

    f.placement.session_start(&mut f.scene, &mut host);
    f.placement.frame(&mut f.scene, &mut host);

    assert!(f.placement.is_awaiting());
    assert!(!f.placement.hit_test_available());
    assert!(!visible(&f.scene, f.nodes.reticle));
    assert!(!f.placement.commit(&mut f.scene));
}

#[test]
fn hit_test_source_failure_disables_reticle() {
    let mut f = fixture();
    let mut host = MockProvider {
        deny_source: true,
        hits: vec![surface(Vec3::ZERO)],
        ..MockProvider::default()
    };

    f.placement.session_start(&mut f.scene, &mut host);
    f.placement.frame(&mut f.scene, &mut host);

    assert_eq!(f.placement.reference_space(), Some(ReferenceSpaceKind::Local));
    assert!(!f.placement.hit_test_available());
    assert!(!visible(&f.scene, f.nodes.reticle));
}

#[test]
fn second_session_start_is_ignored() {
    let mut f = fixture();
    let mut host = MockProvider::default();
    f.placement.session_start(&mut f.scene, &mut host);
    f.placement.session_start(&mut f.scene, &mut host);
    assert_eq!(host.requested.len(), 1);
}

// ============================================================================
// Reticle and commit
// ============================================================================

#[test]
fn reticle_follows_hits_and_hides_on_miss() {
    let mut f = fixture();
    let mut host = MockProvider::default();
    f.placement.session_start(&mut f.scene, &mut host);

    host.hits = vec![surface(Vec3::new(0.5, -1.2, -2.0)), surface(Vec3::new(9.0, 9.0, 9.0))];
    f.placement.frame(&mut f.scene, &mut host);
    assert!(visible(&f.scene, f.nodes.reticle));
    let reticle = f.scene.world_position(f.nodes.reticle).unwrap();
    assert!((reticle - Vec3::new(0.5, -1.2, -2.0)).length() < EPSILON, "best hit wins");

    host.hits.clear();
    f.placement.frame(&mut f.scene, &mut host);
    assert!(!visible(&f.scene, f.nodes.reticle));
    assert_eq!(*f.placement.state(), PlacementState::AwaitingPlacement { last_hit: None });
}

#[test]
fn commit_without_hit_is_noop() {
    let mut f = fixture();
    let mut host = MockProvider::default();
    f.placement.session_start(&mut f.scene, &mut host);
    f.placement.frame(&mut f.scene, &mut host);

    assert!(!f.placement.commit(&mut f.scene));
    assert!(f.placement.is_awaiting());
    assert!(!visible(&f.scene, f.nodes.model_root));
}

#[test]
fn commit_rests_model_bottom_on_surface() {
    let mut f = fixture();
    let mut host = MockProvider {
        hits: vec![surface(Vec3::new(1.0, -1.4, -2.5))],
        ..MockProvider::default()
    };
    f.placement.session_start(&mut f.scene, &mut host);
    f.placement.frame(&mut f.scene, &mut host);

    assert!(f.placement.commit(&mut f.scene));

    let bounds = f.scene.world_vertex_bounds(f.nodes.model_root).unwrap();
    assert!((bounds.min.y - -1.4).abs() < EPSILON);
    assert!(visible(&f.scene, f.nodes.model_root));
    assert!(visible(&f.scene, f.nodes.ar_ground));
    assert!(!visible(&f.scene, f.nodes.reticle));
    let ground = f.scene.world_position(f.nodes.ar_ground).unwrap();
    assert!((ground - Vec3::new(1.0, -1.4, -2.5)).length() < EPSILON);
    assert!(matches!(f.placement.state(), PlacementState::Placed { .. }));
    assert_eq!(
        f.placement.overlay(),
        PlacementOverlay {
            prompt_visible: false,
            replace_visible: true,
            rotate_controls_enabled: true,
        }
    );
}

#[test]
fn replacing_after_rotation_and_scale_still_rests_on_surface() {
    let mut f = fixture();
    let mut host = MockProvider {
        hits: vec![surface(Vec3::new(0.0, -1.0, -2.0))],
        ..MockProvider::default()
    };
    f.placement.session_start(&mut f.scene, &mut host);
    f.placement.frame(&mut f.scene, &mut host);
    f.placement.commit(&mut f.scene);

    {
        let root = f.scene.get_node_mut(f.nodes.model_root).unwrap();
        root.transform.rotation = Quat::from_rotation_x(0.6) * Quat::from_rotation_z(-0.3);
        root.transform.scale = Vec3::splat(1.7);
    }

    assert!(f.placement.request_replace(&mut f.scene));
    assert!(!visible(&f.scene, f.nodes.model_root));
    assert!(!visible(&f.scene, f.nodes.ar_ground));

    for floor_y in [-0.5, -0.5, 0.25] {
        host.hits = vec![surface(Vec3::new(0.3, floor_y, -1.5))];
        f.placement.frame(&mut f.scene, &mut host);
        assert!(f.placement.commit(&mut f.scene));
        let bounds = f.scene.world_vertex_bounds(f.nodes.model_root).unwrap();
        assert!((bounds.min.y - floor_y).abs() < 1e-3);
        f.placement.request_replace(&mut f.scene);
    }
}

#[test]
fn replace_requires_placed_state() {
    let mut f = fixture();
    let mut host = MockProvider::default();
    assert!(!f.placement.request_replace(&mut f.scene));
    f.placement.session_start(&mut f.scene, &mut host);
    assert!(!f.placement.request_replace(&mut f.scene));
}

#[test]
fn nudge_yaw_only_when_placed() {
    let mut f = fixture();
    let mut host = MockProvider {
        hits: vec![surface(Vec3::ZERO)],
        ..MockProvider::default()
    };
    assert!(!f.placement.nudge_yaw(&mut f.scene, 1));

    f.placement.session_start(&mut f.scene, &mut host);
    assert!(!f.placement.nudge_yaw(&mut f.scene, 1));

    f.placement.frame(&mut f.scene, &mut host);
    f.placement.commit(&mut f.scene);
    assert!(f.placement.nudge_yaw(&mut f.scene, 2));
    assert!(f.placement.nudge_yaw(&mut f.scene, -1));

    let step = PlacementSettings::default().yaw_step_degrees.to_radians();
    let rotation = f.scene.get_node(f.nodes.model_root).unwrap().transform.rotation;
    assert!(rotation.angle_between(Quat::from_rotation_y(step)) < 1e-4);
}

// ============================================================================
// Session end
// ============================================================================

#[test]
fn session_end_restores_non_ar_scene() {
    let mut f = fixture();
    let background = f.scene.background;
    f.scene.get_node_mut(f.nodes.model_root).unwrap().transform.position = Vec3::new(0.0, 0.2, 0.0);
    let mut host = MockProvider {
        hits: vec![surface(Vec3::new(2.0, -1.0, -3.0))],
        ..MockProvider::default()
    };

    f.placement.session_start(&mut f.scene, &mut host);
    f.placement.frame(&mut f.scene, &mut host);
    f.placement.commit(&mut f.scene);
    f.placement.nudge_yaw(&mut f.scene, 3);
    f.placement.session_end(&mut f.scene, &mut host);

    assert_eq!(*f.placement.state(), PlacementState::Idle);
    assert_eq!(host.cancelled, vec![HitTestSource(42)]);
    assert_eq!(f.scene.background, background);
    assert!(visible(&f.scene, f.nodes.floor));
    assert!(visible(&f.scene, f.nodes.model_root));
    assert!(!visible(&f.scene, f.nodes.ar_ground));
    assert!(!visible(&f.scene, f.nodes.reticle));
    let root = &f.scene.get_node(f.nodes.model_root).unwrap().transform;
    assert_eq!(root.position, Vec3::new(0.0, 0.2, 0.0));
    assert_eq!(root.rotation, Quat::IDENTITY);
    assert_eq!(f.placement.overlay(), PlacementOverlay::default());
}

#[test]
fn session_end_from_awaiting_restores_background() {
    let mut f = fixture();
    f.scene.background = Some(Vec4::new(0.1, 0.2, 0.3, 1.0));
    let mut host = MockProvider::default();

    f.placement.session_start(&mut f.scene, &mut host);
    f.placement.session_end(&mut f.scene, &mut host);

    assert_eq!(f.scene.background, Some(Vec4::new(0.1, 0.2, 0.3, 1.0)));
    assert!(visible(&f.scene, f.nodes.model_root));
}

#[test]
fn session_end_when_idle_is_noop() {
    let mut f = fixture();
    let mut host = MockProvider::default();
    f.placement.session_end(&mut f.scene, &mut host);
    assert!(host.cancelled.is_empty());
    assert!(visible(&f.scene, f.nodes.floor));
}
