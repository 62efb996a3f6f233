//! Top-level viewer controller.
//!
//! [`Viewer`] owns the scene, the camera, the registry and both state
//! machines, and routes host events to them:
//!
//! ```rust,ignore
//! let mut viewer = Viewer::new(ViewerConfig::default())?;
//! pollster::block_on(viewer.load_model("blade", AssetSource::Path("blade.json".into()), &JsonModelLoader))?;
//!
//! // per host event
//! viewer.pointer_moved(x, y);
//! viewer.pointer_button(MouseButton::Left, ButtonState::Pressed);
//!
//! // per render frame
//! viewer.frame(dt, None, None);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Quat, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;

use crate::assets::{AssetLoader, AssetSource, PersistenceStore};
use crate::collab::{CollaborationChannel, SessionRole};
use crate::config::ViewerConfig;
use crate::controls::{OrbitControls, OrbitCoordinator, SharedOrbit, frame_bounds};
use crate::errors::{Result, ViewerError};
use crate::input::{ButtonState, ControllerId, Input, InputResponse, MouseButton, Touch, XrFrameInput};
use crate::interaction::{FrameContext, InteractionCore, ViewContext};
use crate::math::Pose;
use crate::placement::{PlacementController, PlacementNodes, PlacementOverlay, XrHitTestProvider};
use crate::registry::{HitTestMode, SceneRegistry};
use crate::scene::primitives::{create_plane, create_ring};
use crate::scene::{Camera, Mesh, Node, NodeHandle, Scene, Transform};

const FLOOR_SIZE: f32 = 10.0;
const AR_GROUND_SIZE: f32 = 1.5;
const RETICLE_INNER: f32 = 0.08;
const RETICLE_OUTER: f32 = 0.1;

pub struct Viewer {
    scene: Scene,
    camera: Camera,
    camera_node: NodeHandle,
    product_root: NodeHandle,

    config: ViewerConfig,
    input: Input,
    viewport: Vec2,

    registry: SceneRegistry,
    interaction: InteractionCore,
    placement: PlacementController,
    app_orbit: SharedOrbit,

    store: Option<Box<dyn PersistenceStore>>,
    /// Local transforms captured at load time, restored by `reset_transforms`
    load_snapshots: FxHashMap<String, Transform>,
    /// Touch currently emulating a left-button orbit drag
    emulated_touch: Option<u64>,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Result<Self> {
        config.validate()?;

        let mut scene = Scene::new();
        let camera = Camera::new_perspective(config.camera.fov_degrees, 1.0, config.camera.near, config.camera.far);

        let target = config.camera.target;
        let camera_node = scene.create_node_with_name("camera");
        if let Some(node) = scene.get_node_mut(camera_node) {
            node.transform.position = target + Vec3::Z * config.camera.distance;
            node.transform.look_at(target, Vec3::Y);
        }

        let product_root = scene.create_node_with_name("product_root");

        let floor = scene.add_mesh(
            Mesh::new("floor", create_plane(FLOOR_SIZE, FLOOR_SIZE)).with_color(Vec4::new(0.8, 0.8, 0.8, 1.0)),
            None,
        );
        let ar_ground = scene.add_mesh(
            Mesh::new("ar_ground", create_plane(AR_GROUND_SIZE, AR_GROUND_SIZE)).with_color(Vec4::new(0.0, 0.0, 0.0, 0.3)),
            None,
        );
        let reticle = scene.add_mesh(Mesh::new("reticle", create_ring(RETICLE_INNER, RETICLE_OUTER, 32)), None);
        scene.set_visible(ar_ground, false);
        scene.set_visible(reticle, false);

        // Two orbit instances share the camera: the app's and the core's.
        let app_orbit: SharedOrbit = Rc::new(RefCell::new(OrbitControls::from_settings(
            &config.orbit,
            target,
            config.camera.distance,
        )));
        let core_orbit: SharedOrbit = Rc::new(RefCell::new(OrbitControls::from_settings(
            &config.orbit,
            target,
            config.camera.distance,
        )));
        let mut coordinator = OrbitCoordinator::new(Rc::clone(&app_orbit));
        coordinator.link(core_orbit);

        let mut interaction = InteractionCore::new(coordinator, config.interaction.clone());
        interaction.set_model_root(Some(product_root));

        let placement = PlacementController::new(
            PlacementNodes {
                model_root: product_root,
                reticle,
                ar_ground,
                floor,
            },
            config.placement.clone(),
        );

        scene.update_matrix_world();
        log::info!("Viewer initialised (form factor: {:?})", config.interaction.form_factor);

        Ok(Self {
            scene,
            camera,
            camera_node,
            product_root,
            config,
            input: Input::new(),
            viewport: Vec2::ONE,
            registry: SceneRegistry::new(product_root),
            interaction,
            placement,
            app_orbit,
            store: None,
            load_snapshots: FxHashMap::default(),
            emulated_touch: None,
        })
    }

    /// Persists blob-sourced assets into `store`.
    #[must_use]
    pub fn with_store(mut self, store: Box<dyn PersistenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn set_store(&mut self, store: Option<Box<dyn PersistenceStore>>) {
        self.store = store;
    }

    /// Connects the outbound collaboration hook with the given role.
    pub fn set_collaboration(&mut self, channel: Box<dyn CollaborationChannel>, role: SessionRole) {
        self.interaction.set_channel(Some(channel));
        self.interaction.settings_mut().role = role;
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[must_use]
    pub fn camera_node(&self) -> NodeHandle {
        self.camera_node
    }

    #[must_use]
    pub fn product_root(&self) -> NodeHandle {
        self.product_root
    }

    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    #[must_use]
    pub fn input(&self) -> &Input {
        &self.input
    }

    #[must_use]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    #[must_use]
    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    #[must_use]
    pub fn interaction(&self) -> &InteractionCore {
        &self.interaction
    }

    #[must_use]
    pub fn placement(&self) -> &PlacementController {
        &self.placement
    }

    #[must_use]
    pub fn overlay(&self) -> PlacementOverlay {
        self.placement.overlay()
    }

    /// The app-owned orbit instance (primary of the coordinator).
    #[must_use]
    pub fn orbit(&self) -> &SharedOrbit {
        &self.app_orbit
    }

    /// Camera view used for screen-space picking.
    #[must_use]
    pub fn view(&self) -> ViewContext<'_> {
        ViewContext::from_scene(&self.scene, &self.camera, self.camera_node, self.viewport)
    }

    // ========================================================================
    // Models
    // ========================================================================

    /// Loads an asset, wraps it in a container named `name` under the
    /// product root and registers it.
    ///
    /// A model already registered under `name` is replaced. On failure
    /// nothing is added to the scene. Blob sources are copied into the
    /// persistence store; a store failure is only logged.
    pub async fn load_model<L: AssetLoader>(&mut self, name: &str, source: AssetSource, loader: &L) -> Result<NodeHandle> {
        let template = loader.load(&source).await.inspect_err(|err| {
            log::error!("Failed to load '{name}' from {}: {err}", source.describe());
        })?;

        if self.registry.remove(&mut self.scene, name).is_some() {
            log::info!("Replacing model '{name}'");
        }

        let container = self
            .scene
            .add_to_parent(Node::with_name(name.to_owned()), self.product_root);
        template.instantiate(&mut self.scene, container);

        if let Err(err) = self.registry.register(&self.scene, name, container, HitTestMode::Subtree) {
            self.scene.remove_node(container);
            return Err(err);
        }
        if let Some(node) = self.scene.get_node(container) {
            self.load_snapshots.insert(name.to_owned(), node.transform.clone());
        }
        self.sync_interaction();
        log::info!("Loaded model '{name}' ({} nodes)", template.node_count());

        if source.is_ephemeral()
            && let (Some(store), Some(bytes)) = (&self.store, source.bytes())
            && let Err(err) = store.put(name, bytes)
        {
            log::warn!("Could not persist '{name}': {err}");
        }

        if self.config.framing.frame_on_load {
            self.frame_models();
        }
        self.scene.update_matrix_world();
        Ok(container)
    }

    /// Reloads every asset held in the persistence store.
    ///
    /// Entries that fail to load are logged and skipped. Returns the names
    /// that were restored.
    pub async fn restore_persisted<L: AssetLoader>(&mut self, loader: &L) -> Result<Vec<String>> {
        let Some(store) = &self.store else {
            return Ok(Vec::new());
        };
        let mut pending = Vec::new();
        for name in store.keys()? {
            match store.get(&name) {
                Ok(Some(bytes)) => pending.push((name, bytes)),
                Ok(None) => {}
                Err(err) => log::warn!("Skipping stored asset '{name}': {err}"),
            }
        }

        let mut restored = Vec::with_capacity(pending.len());
        for (name, bytes) in pending {
            match self.load_model(&name, AssetSource::Stored(bytes), loader).await {
                Ok(_) => restored.push(name),
                Err(err) => log::warn!("Stored asset '{name}' failed to load: {err}"),
            }
        }
        Ok(restored)
    }

    /// Removes every model from the scene and the registry.
    pub fn clear_models(&mut self) {
        self.registry.clear(&mut self.scene);
        self.load_snapshots.clear();
        self.sync_interaction();
        log::info!("Cleared all models");
    }

    /// Restores every model's load-time transform and the model group's yaw.
    pub fn reset_transforms(&mut self) {
        let snapshots: Vec<(NodeHandle, &Transform)> = self
            .load_snapshots
            .iter()
            .filter_map(|(name, transform)| self.registry.get(name).map(|object| (object.node, transform)))
            .collect();
        self.interaction.reset_objects(&mut self.scene, snapshots);

        if !self.placement.is_placed()
            && let Some(node) = self.scene.get_node_mut(self.product_root)
        {
            node.transform.rotation = Quat::IDENTITY;
        }
    }

    /// Recolours a registered model, or a named part inside one.
    pub fn set_part_color(&mut self, name: &str, color: Vec4) -> Result<()> {
        let root = match self.registry.get(name) {
            Some(object) => object.node,
            None => self
                .scene
                .find_by_name(name)
                .filter(|&node| self.scene.is_descendant_of(node, self.product_root))
                .ok_or_else(|| ViewerError::AssetNotFound(name.to_owned()))?,
        };

        for key in self.scene.meshes_in_subtree(root) {
            if let Some(mesh) = self.scene.meshes.get_mut(key) {
                mesh.color = color;
            }
        }
        Ok(())
    }

    /// Points the camera at the bounds of every loaded model.
    pub fn frame_models(&mut self) {
        let Some(bounds) = self.scene.world_bounds(self.product_root) else {
            return;
        };
        let view_dir = self
            .scene
            .world_matrix(self.camera_node)
            .map_or(Vec3::NEG_Z, |world| Camera::forward(&world));
        let framing = &self.config.framing;
        let frame = frame_bounds(
            &bounds,
            self.camera.fov,
            self.camera.aspect,
            framing.margin,
            framing.min_radius,
            view_dir,
        );

        self.app_orbit.borrow_mut().apply_frame(&frame);
        if let Some(node) = self.scene.get_node_mut(self.camera_node) {
            node.transform.position = frame.position;
            node.transform.look_at(frame.center, Vec3::Y);
        }
    }

    fn sync_interaction(&mut self) {
        self.interaction
            .set_draggable_objects(self.registry.draggable_list());
    }

    // ========================================================================
    // Pointer and touch routing
    // ========================================================================

    pub fn pointer_moved(&mut self, x: f32, y: f32) -> InputResponse {
        self.input.inject_mouse_position(x, y);
        let view = ViewContext::from_scene(&self.scene, &self.camera, self.camera_node, self.viewport);
        self.interaction
            .pointer_move(&mut self.scene, &view, Vec2::new(x, y))
    }

    /// Mouse button edge. The left button is offered to the interaction core
    /// first; the orbit only sees it when no object was picked.
    pub fn pointer_button(&mut self, button: MouseButton, state: ButtonState) -> InputResponse {
        self.input.inject_mouse_button(button, state);
        if button != MouseButton::Left {
            return InputResponse::Ignored;
        }
        match state {
            ButtonState::Pressed => {
                let view = ViewContext::from_scene(&self.scene, &self.camera, self.camera_node, self.viewport);
                self.interaction
                    .pointer_down(&self.scene, &view, self.input.mouse_position())
            }
            ButtonState::Released => self.interaction.pointer_up(),
        }
    }

    pub fn scroll(&mut self, delta_x: f32, delta_y: f32) {
        if !self.interaction.is_active() {
            self.input.inject_scroll(delta_x, delta_y);
        }
    }

    /// A finger landed. Unclaimed single touches drive the orbit like a
    /// left-button drag.
    pub fn touch_started(&mut self, id: u64, x: f32, y: f32) -> InputResponse {
        let touch = Touch::new(id, x, y);
        self.input.inject_touch(touch);

        let view = ViewContext::from_scene(&self.scene, &self.camera, self.camera_node, self.viewport);
        let response = self
            .interaction
            .touch_start(&self.scene, &view, touch, self.input.touches());

        if self.input.touches().len() == 1 && !response.is_consumed() {
            self.input.warp_mouse_position(x, y);
            self.input
                .inject_mouse_button(MouseButton::Left, ButtonState::Pressed);
            self.emulated_touch = Some(id);
        } else {
            self.stop_touch_emulation();
        }
        response
    }

    pub fn touch_moved(&mut self, id: u64, x: f32, y: f32) -> InputResponse {
        let touch = Touch::new(id, x, y);
        self.input.inject_touch(touch);
        if self.emulated_touch == Some(id) {
            self.input.inject_mouse_position(x, y);
        }

        let view = ViewContext::from_scene(&self.scene, &self.camera, self.camera_node, self.viewport);
        self.interaction
            .touch_move(&mut self.scene, &view, touch, self.input.touches())
    }

    pub fn touch_ended(&mut self, id: u64) -> InputResponse {
        self.input.remove_touch(id);
        if self.emulated_touch == Some(id) {
            self.stop_touch_emulation();
        }
        self.interaction.touch_end(id)
    }

    pub fn touch_cancelled(&mut self, id: u64) {
        self.input.remove_touch(id);
        if self.emulated_touch == Some(id) {
            self.stop_touch_emulation();
        }
        self.interaction.touch_cancel(id);
    }

    fn stop_touch_emulation(&mut self) {
        if self.emulated_touch.take().is_some() {
            self.input
                .inject_mouse_button(MouseButton::Left, ButtonState::Released);
        }
    }

    /// The window lost focus; pending release events will never arrive.
    pub fn focus_lost(&mut self) {
        self.input.release_all();
        self.emulated_touch = None;
        self.interaction.pointer_cancel();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.input.inject_resize(width, height);
        self.viewport = Vec2::new(width as f32, height as f32).max(Vec2::ONE);
        self.camera.set_viewport(self.viewport);
    }

    // ========================================================================
    // XR routing
    // ========================================================================

    /// Select press. While waiting for placement it is the commit tap;
    /// otherwise it grabs the object under the controller ray.
    pub fn xr_select_start(&mut self, controller: ControllerId, pose: Pose) -> InputResponse {
        if self.placement.is_awaiting() {
            return if self.placement.commit(&mut self.scene) {
                InputResponse::Consumed
            } else {
                InputResponse::Ignored
            };
        }
        self.interaction.select_start(&self.scene, controller, pose)
    }

    pub fn xr_select_end(&mut self, controller: ControllerId) -> InputResponse {
        self.interaction.select_end(controller)
    }

    pub fn xr_squeeze_start(&mut self, controller: ControllerId, pose: Pose) -> InputResponse {
        self.interaction
            .squeeze_start(&self.scene, controller, pose)
    }

    pub fn xr_squeeze_end(&mut self, controller: ControllerId) -> InputResponse {
        self.interaction.squeeze_end(controller)
    }

    // ========================================================================
    // AR session lifecycle
    // ========================================================================

    pub fn start_ar_session(&mut self, provider: &mut dyn XrHitTestProvider) {
        self.focus_lost();
        self.interaction.session_start();
        self.placement.session_start(&mut self.scene, provider);
        log::info!("AR session started");
    }

    pub fn end_ar_session(&mut self, provider: &mut dyn XrHitTestProvider) {
        self.placement.session_end(&mut self.scene, provider);
        self.interaction.session_end();
        self.scene.update_matrix_world();
        log::info!("AR session ended");
    }

    pub fn request_replace(&mut self) -> bool {
        self.placement.request_replace(&mut self.scene)
    }

    /// Discrete yaw step of the placed model.
    pub fn nudge_yaw(&mut self, steps: i32) -> bool {
        self.placement.nudge_yaw(&mut self.scene, steps)
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Advances one render frame: reticle, interaction or orbit, world
    /// matrices, then clears per-frame input.
    pub fn frame(&mut self, dt: f32, xr: Option<&XrFrameInput>, provider: Option<&mut dyn XrHitTestProvider>) {
        if let Some(provider) = provider {
            self.placement.frame(&mut self.scene, provider);
        }

        let frame = FrameContext {
            input: &self.input,
            xr,
            camera_node: self.camera_node,
            fov_degrees: self.camera.fov_degrees(),
            dt,
        };
        self.interaction.update(&mut self.scene, &frame);

        self.scene.update_matrix_world();
        self.input.end_frame();
    }
}
