#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! # arview
//!
//! Interaction core of an interactive 3D/AR model viewer.
//!
//! The crate owns a small scene graph, a registry of manipulable parts, and
//! the state machines that turn mouse, touch and XR controller input into
//! object translation and rotation. AR sessions additionally run a
//! tap-to-place flow driven by environment hit-testing.
//!
//! Rendering, asset decoding and the XR runtime itself are host concerns and
//! reach the core through the traits in [`assets`], [`placement`] and
//! [`collab`].

pub mod app;
pub mod assets;
pub mod collab;
pub mod config;
pub mod controls;
pub mod errors;
pub mod input;
pub mod interaction;
pub mod math;
pub mod placement;
pub mod registry;
pub mod scene;

pub use app::Viewer;
pub use assets::{AssetLoader, AssetSource, DirectoryStore, JsonModelLoader, MemoryStore, ModelTemplate, PersistenceStore};
pub use collab::{CollaborationChannel, SessionRole, TransformUpdate};
pub use config::ViewerConfig;
pub use controls::{OrbitControls, OrbitCoordinator, OrbitFeatures};
pub use errors::{Result, ViewerError};
pub use input::{ButtonState, ControllerId, ControllerPose, Input, InputResponse, MouseButton, Touch, XrFrameInput};
pub use interaction::{FrameContext, InteractionCore, Manipulation, PointerSource, ViewContext};
pub use math::{Plane, Pose, Ray};
pub use placement::{
    HitTestSource, PlacementController, PlacementNodes, PlacementOverlay, PlacementState, ReferenceSpace, ReferenceSpaceKind,
    XrHitTestProvider,
};
pub use registry::{DraggableObject, HitTestMode, SceneRegistry};
pub use scene::{Camera, Node, NodeHandle, Scene, Transform};
