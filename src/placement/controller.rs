use glam::{Vec3, Vec4};

use crate::config::PlacementSettings;
use crate::math::Pose;
use crate::placement::provider::{HitTestSource, ReferenceSpace, ReferenceSpaceKind, XrHitTestProvider};
use crate::scene::{NodeHandle, Scene, Transform};

/// Scene nodes the placement flow shows, hides and moves.
#[derive(Debug, Clone, Copy)]
pub struct PlacementNodes {
    /// Group holding every manipulable model
    pub model_root: NodeHandle,
    /// Surface indicator that follows hit-test results
    pub reticle: NodeHandle,
    /// Ground plane shown under the placed model
    pub ar_ground: NodeHandle,
    /// Non-AR ground plane, hidden for the session
    pub floor: NodeHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PlacementState {
    /// No AR session.
    #[default]
    Idle,
    /// Model hidden, reticle tracking surfaces, waiting for a commit tap.
    AwaitingPlacement {
        /// This frame's best hit, `None` on a miss.
        last_hit: Option<Pose>,
    },
    /// Model visible at the committed pose.
    Placed { pose: Pose },
}

/// Which placement affordances the host UI should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlacementOverlay {
    pub prompt_visible: bool,
    pub replace_visible: bool,
    pub rotate_controls_enabled: bool,
}

pub struct PlacementController {
    nodes: PlacementNodes,
    settings: PlacementSettings,
    state: PlacementState,

    space: Option<ReferenceSpace>,
    source: Option<HitTestSource>,

    // Restored on session end
    saved_background: Option<Vec4>,
    saved_model: Option<(Transform, bool)>,
}

impl PlacementController {
    #[must_use]
    pub fn new(nodes: PlacementNodes, settings: PlacementSettings) -> Self {
        Self {
            nodes,
            settings,
            state: PlacementState::Idle,
            space: None,
            source: None,
            saved_background: None,
            saved_model: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &PlacementState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &PlacementNodes {
        &self.nodes
    }

    #[must_use]
    pub fn is_awaiting(&self) -> bool {
        matches!(self.state, PlacementState::AwaitingPlacement { .. })
    }

    #[must_use]
    pub fn is_placed(&self) -> bool {
        matches!(self.state, PlacementState::Placed { .. })
    }

    /// Kind of reference space negotiated for this session.
    #[must_use]
    pub fn reference_space(&self) -> Option<ReferenceSpaceKind> {
        self.space.map(|space| space.kind)
    }

    /// Whether a hit-test feed is running. `false` means the reticle never
    /// appears and commit taps do nothing.
    #[must_use]
    pub fn hit_test_available(&self) -> bool {
        self.source.is_some()
    }

    #[must_use]
    pub fn overlay(&self) -> PlacementOverlay {
        PlacementOverlay {
            prompt_visible: self.is_awaiting(),
            replace_visible: self.is_placed(),
            rotate_controls_enabled: self.is_placed(),
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Enters `AwaitingPlacement`: hides the model and the non-AR floor,
    /// clears the background and negotiates a hit-test feed.
    ///
    /// The local space is preferred and the viewer space is the fallback. If
    /// neither space nor a hit-test source can be obtained the session still
    /// starts, without a reticle.
    pub fn session_start(&mut self, scene: &mut Scene, provider: &mut dyn XrHitTestProvider) {
        if !matches!(self.state, PlacementState::Idle) {
            log::debug!("Placement session already running");
            return;
        }

        let model_root = self.nodes.model_root;
        self.saved_model = scene
            .get_node(model_root)
            .map(|node| (node.transform.clone(), node.visible));
        self.saved_background = scene.background.take();

        scene.set_visible(model_root, false);
        scene.set_visible(self.nodes.floor, false);
        scene.set_visible(self.nodes.reticle, false);
        scene.set_visible(self.nodes.ar_ground, false);

        self.space = negotiate_space(provider);
        self.source = self.space.and_then(|space| match provider.request_hit_test_source(&space) {
            Ok(source) => Some(source),
            Err(err) => {
                log::error!("Hit-test source unavailable, placement disabled: {err}");
                None
            }
        });

        self.state = PlacementState::AwaitingPlacement { last_hit: None };
        log::debug!("Placement: awaiting commit tap");
    }

    /// Per-frame reticle refresh. Advisory only; never changes state.
    pub fn frame(&mut self, scene: &mut Scene, provider: &mut dyn XrHitTestProvider) {
        let PlacementState::AwaitingPlacement { last_hit } = &mut self.state else {
            return;
        };
        let Some(source) = self.source else {
            return;
        };

        let hit = provider.hit_test_results(source).into_iter().next();
        *last_hit = hit;

        let reticle = self.nodes.reticle;
        match hit {
            Some(pose) => {
                scene.set_world_position(reticle, pose.position);
                scene.set_world_rotation(reticle, pose.orientation);
                scene.set_visible(reticle, true);
            }
            None => scene.set_visible(reticle, false),
        }
    }

    /// Commit tap. Places the model so its lowest point rests on the hit
    /// surface and moves the AR ground under it.
    ///
    /// Without a current hit the tap is a no-op and `false` is returned.
    pub fn commit(&mut self, scene: &mut Scene) -> bool {
        let PlacementState::AwaitingPlacement { last_hit: Some(hit) } = self.state else {
            return false;
        };

        let model_root = self.nodes.model_root;
        let origin = scene.world_position(model_root).unwrap_or(Vec3::ZERO);
        let bottom_offset = scene
            .world_vertex_bounds(model_root)
            .map_or(0.0, |bounds| origin.y - bounds.min.y);

        scene.set_world_position(model_root, hit.position + Vec3::Y * bottom_offset);
        scene.set_visible(model_root, true);

        scene.set_world_position(self.nodes.ar_ground, hit.position);
        scene.set_visible(self.nodes.ar_ground, true);
        scene.set_visible(self.nodes.reticle, false);

        self.state = PlacementState::Placed { pose: hit };
        log::info!(
            "Model placed at ({:.3}, {:.3}, {:.3})",
            hit.position.x,
            hit.position.y,
            hit.position.z
        );
        true
    }

    /// Re-place affordance: hides the model and waits for a new commit tap.
    pub fn request_replace(&mut self, scene: &mut Scene) -> bool {
        if !self.is_placed() {
            return false;
        }
        scene.set_visible(self.nodes.model_root, false);
        scene.set_visible(self.nodes.ar_ground, false);
        self.state = PlacementState::AwaitingPlacement { last_hit: None };
        log::debug!("Placement: re-place requested");
        true
    }

    /// Leaves AR from any state: tears down the feed and restores the
    /// non-AR floor, background and model transform.
    pub fn session_end(&mut self, scene: &mut Scene, provider: &mut dyn XrHitTestProvider) {
        if matches!(self.state, PlacementState::Idle) {
            return;
        }

        if let Some(source) = self.source.take() {
            provider.cancel_hit_test_source(source);
        }
        self.space = None;

        scene.set_visible(self.nodes.reticle, false);
        scene.set_visible(self.nodes.ar_ground, false);
        scene.set_visible(self.nodes.floor, true);
        scene.background = self.saved_background.take();

        if let Some((transform, visible)) = self.saved_model.take() {
            if let Some(node) = scene.get_node_mut(self.nodes.model_root) {
                node.transform = transform;
            }
            scene.set_visible(self.nodes.model_root, visible);
        }

        self.state = PlacementState::Idle;
        log::debug!("Placement: session ended");
    }

    /// Discrete yaw step of the placed model; only enabled once placed.
    ///
    /// `steps` is signed: positive turns counter-clockwise seen from above.
    pub fn nudge_yaw(&mut self, scene: &mut Scene, steps: i32) -> bool {
        if !self.is_placed() {
            return false;
        }
        let angle = self.settings.yaw_step_degrees.to_radians() * steps as f32;
        if let Some(node) = scene.get_node_mut(self.nodes.model_root) {
            node.transform.rotate_yaw(angle);
        }
        true
    }
}

fn negotiate_space(provider: &mut dyn XrHitTestProvider) -> Option<ReferenceSpace> {
    match provider.request_reference_space(ReferenceSpaceKind::Local) {
        Ok(space) => return Some(space),
        Err(err) => log::warn!("Local reference space unavailable ({err}); falling back to viewer space"),
    }
    match provider.request_reference_space(ReferenceSpaceKind::Viewer) {
        Ok(space) => Some(space),
        Err(err) => {
            log::error!("No reference space available, placement disabled: {err}");
            None
        }
    }
}
