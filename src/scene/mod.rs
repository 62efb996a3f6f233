//! Scene Graph Module
//!
//! Manages the scene hierarchy and the data the interaction core reads:
//! - [`Node`]: scene node (parent/child links, transform, visibility, mesh)
//! - [`Transform`]: TRS component with dirty-checked matrices
//! - [`Scene`]: node store, hierarchy edits, bounds and ray queries
//! - [`Mesh`] / [`Geometry`]: triangle data used for exact hit tests
//! - [`Camera`]: perspective projection and screen-to-ray conversion
//! - [`transform_system`]: decoupled world-matrix propagation

pub mod camera;
pub mod mesh;
pub mod node;
pub mod primitives;
pub mod scene;
pub mod transform;
pub mod transform_system;

pub use camera::Camera;
pub use mesh::{BoundingBox, Geometry, Mesh};
pub use node::Node;
pub use scene::{RayHit, Scene};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
}
