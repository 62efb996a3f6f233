//! Geometric primitives used by picking, dragging and placement.
//!
//! - [`Ray`]: origin + direction, built from camera or controller poses
//! - [`Plane`]: point + normal, the implicit drag plane
//! - [`Pose`]: position + orientation, as reported by XR hosts
//! - [`ray_triangle`] / [`ray_aabb`]: intersection tests returning the ray parameter

pub mod pose;
pub mod ray;

pub use pose::Pose;
pub use ray::{Plane, Ray, ray_aabb, ray_triangle};
