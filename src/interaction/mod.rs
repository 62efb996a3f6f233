//! Unified Interaction Core
//!
//! Turns mouse, touch and XR controller input into manipulation of one
//! registered object at a time:
//!
//! - [`pointer`]: mouse / single-touch drag on a camera-facing plane
//! - [`touch`]: touch routing and two-finger model yaw
//! - [`xr`]: controller select (translate) and squeeze (rotate)
//!
//! The core owns the [`OrbitCoordinator`] and suspends it for the whole
//! lifetime of any session, so the camera and the object are never driven by
//! the same gesture. Only one input path is live at a time: the XR path while
//! an immersive session runs, the pointer/touch path otherwise.

mod picking;
mod pointer;
mod session;
mod touch;
mod xr;

pub use session::{Manipulation, PointerSource};

use glam::{Affine3A, Vec2};
use rustc_hash::FxHashMap;

use crate::collab::{CollaborationChannel, TransformUpdate};
use crate::config::InteractionSettings;
use crate::controls::OrbitCoordinator;
use crate::input::{Input, MouseButton, XrFrameInput};
use crate::registry::DraggableObject;
use crate::scene::{Camera, NodeHandle, Scene, Transform};

/// Camera state needed to turn screen positions into rays.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    pub camera: &'a Camera,
    /// World transform of the camera node
    pub camera_world: Affine3A,
    /// Viewport size in pixels
    pub viewport: Vec2,
}

impl<'a> ViewContext<'a> {
    /// Reads the camera node's world transform from the scene.
    #[must_use]
    pub fn from_scene(scene: &Scene, camera: &'a Camera, camera_node: NodeHandle, viewport: Vec2) -> Self {
        Self {
            camera,
            camera_world: scene.world_matrix(camera_node).unwrap_or(Affine3A::IDENTITY),
            viewport,
        }
    }
}

/// Everything [`InteractionCore::update`] reads for one render frame.
pub struct FrameContext<'a> {
    pub input: &'a Input,
    /// Controller poses, present only while an immersive session runs.
    pub xr: Option<&'a XrFrameInput>,
    pub camera_node: NodeHandle,
    pub fov_degrees: f32,
    pub dt: f32,
}

pub struct InteractionCore {
    orbit: OrbitCoordinator,
    channel: Option<Box<dyn CollaborationChannel>>,
    settings: InteractionSettings,

    draggables: Vec<DraggableObject>,
    index: FxHashMap<NodeHandle, usize>,
    model_root: Option<NodeHandle>,

    state: Manipulation,
    xr_active: bool,
}

impl InteractionCore {
    #[must_use]
    pub fn new(orbit: OrbitCoordinator, settings: InteractionSettings) -> Self {
        Self {
            orbit,
            channel: None,
            settings,
            draggables: Vec::new(),
            index: FxHashMap::default(),
            model_root: None,
            state: Manipulation::Idle,
            xr_active: false,
        }
    }

    /// Attaches the outbound collaboration channel.
    #[must_use]
    pub fn with_channel(mut self, channel: Box<dyn CollaborationChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn set_channel(&mut self, channel: Option<Box<dyn CollaborationChannel>>) {
        self.channel = channel;
    }

    #[must_use]
    pub fn settings(&self) -> &InteractionSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut InteractionSettings {
        &mut self.settings
    }

    #[must_use]
    pub fn orbit(&self) -> &OrbitCoordinator {
        &self.orbit
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitCoordinator {
        &mut self.orbit
    }

    // ========================================================================
    // Collaborator wiring
    // ========================================================================

    /// Replaces the set of manipulable objects.
    ///
    /// A running session whose target is no longer in the set is ended.
    pub fn set_draggable_objects(&mut self, objects: &[DraggableObject]) {
        self.draggables = objects.to_vec();
        self.index = self
            .draggables
            .iter()
            .enumerate()
            .map(|(slot, object)| (object.node, slot))
            .collect();

        if let Some(target) = self.state.target()
            && !self.index.contains_key(&target)
        {
            log::debug!("Selected object left the draggable set; ending session");
            self.end_session();
        }
    }

    #[must_use]
    pub fn draggable_objects(&self) -> &[DraggableObject] {
        &self.draggables
    }

    /// Node rotated by the two-finger gesture.
    pub fn set_model_root(&mut self, root: Option<NodeHandle>) {
        self.model_root = root;
    }

    // ========================================================================
    // Session state
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn state(&self) -> &Manipulation {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    #[inline]
    #[must_use]
    pub fn is_xr_active(&self) -> bool {
        self.xr_active
    }

    /// The currently manipulated object.
    #[must_use]
    pub fn selected(&self) -> Option<&DraggableObject> {
        let target = self.state.target()?;
        self.index.get(&target).map(|&slot| &self.draggables[slot])
    }

    /// Immersive session began: the XR path becomes live.
    pub fn session_start(&mut self) {
        self.xr_active = true;
        if self.state.is_active() && !self.state.is_xr() {
            log::debug!("Immersive session started; dropping pointer session");
            self.end_session();
        }
    }

    /// Immersive session ended: the pointer/touch path becomes live.
    pub fn session_end(&mut self) {
        self.xr_active = false;
        if self.state.is_xr() {
            log::debug!("Immersive session ended; dropping controller session");
            self.end_session();
        }
    }

    /// Ends any session and writes the given local transforms back.
    ///
    /// Nodes outside the draggable set are skipped. Scale is taken from each
    /// object's registration snapshot.
    pub fn reset_objects<'t>(&mut self, scene: &mut Scene, snapshots: impl IntoIterator<Item = (NodeHandle, &'t Transform)>) {
        self.end_session();
        for (handle, snapshot) in snapshots {
            let Some(&slot) = self.index.get(&handle) else {
                continue;
            };
            let original_scale = self.draggables[slot].original_scale;
            if let Some(node) = scene.get_node_mut(handle) {
                node.transform.position = snapshot.position;
                node.transform.rotation = snapshot.rotation;
                node.transform.scale = original_scale;
            }
        }
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    /// Advances one frame; call exactly once per render frame.
    ///
    /// Order: liveness check, XR integration, then the orbit camera. The orbit
    /// only runs when no session is active and no immersive session is live.
    pub fn update(&mut self, scene: &mut Scene, frame: &FrameContext<'_>) {
        if self.settings.liveness_check {
            self.check_liveness(frame);
        }

        if self.xr_active
            && let Some(xr) = frame.xr
        {
            self.xr_frame(scene, xr);
        }

        if !self.state.is_active()
            && !self.xr_active
            && let Some(camera) = scene.get_node_mut(frame.camera_node)
        {
            self.orbit
                .update(&mut camera.transform, frame.input, frame.fov_degrees, frame.dt);
        }
    }

    /// Releases a session whose input source is gone.
    fn check_liveness(&mut self, frame: &FrameContext<'_>) {
        let alive = match self.state {
            Manipulation::Idle => return,
            Manipulation::PointerDrag {
                source: PointerSource::Mouse,
                ..
            } => frame.input.get_mouse_button(MouseButton::Left),
            Manipulation::PointerDrag {
                source: PointerSource::Touch(id),
                ..
            } => frame.input.has_touch(id),
            Manipulation::TwoFingerRotate { ids, .. } => ids.iter().all(|&id| frame.input.has_touch(id)),
            Manipulation::XrTranslate { controller, .. } | Manipulation::XrRotate { controller, .. } => {
                frame.xr.is_none_or(|xr| xr.pose_of(controller).is_some())
            }
        };

        if !alive {
            log::warn!("Input source vanished without a release; ending {:?}", self.state);
            self.end_session();
        }
    }

    // ========================================================================
    // Shared helpers
    // ========================================================================

    /// Claims exclusive manipulation and suspends the orbit camera.
    fn begin_session(&mut self, state: Manipulation) {
        self.state = state;
        self.orbit.suspend();
        log::debug!("Manipulation started: {:?}", self.state);
    }

    /// Clears the session and resumes the orbit camera. No-op when idle.
    fn end_session(&mut self) {
        if !self.state.is_active() {
            return;
        }
        log::debug!("Manipulation ended: {:?}", self.state);
        self.state = Manipulation::Idle;
        self.orbit.resume();
    }

    /// Re-applies the registration scale after a translation step.
    fn restore_scale(&self, scene: &mut Scene, target: NodeHandle) {
        if let Some(&slot) = self.index.get(&target)
            && let Some(node) = scene.get_node_mut(target)
        {
            node.transform.scale = self.draggables[slot].original_scale;
        }
    }

    /// Emits the object's transform when acting as session host.
    fn broadcast(&self, scene: &Scene, target: NodeHandle) {
        if !self.settings.role.broadcasts() {
            return;
        }
        let Some(channel) = &self.channel else {
            return;
        };
        let Some(&slot) = self.index.get(&target) else {
            return;
        };
        let object = &self.draggables[slot];
        let (Some(position), Some(rotation), Some(node)) =
            (scene.world_position(target), scene.world_rotation(target), scene.get_node(target))
        else {
            return;
        };

        channel.send_transform(&TransformUpdate {
            name: object.name.clone(),
            id: object.id,
            position,
            rotation,
            scale: node.transform.scale,
        });
    }
}
