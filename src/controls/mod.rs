//! Camera Controls
//!
//! - [`OrbitControls`]: spherical orbit camera with damping, zoom and pan
//! - [`OrbitCoordinator`]: suspends / resumes every orbit instance bound to
//!   the camera while a manipulation session owns the pointer
//! - [`framing`]: fits the camera to a bounding box

pub mod coordinator;
pub mod framing;
pub mod orbit;

pub use coordinator::{OrbitCoordinator, SharedOrbit};
pub use framing::{CameraFrame, frame_bounds};
pub use orbit::{OrbitControls, OrbitFeatures};
