//! Application Layer
//!
//! [`Viewer`] ties the scene, registry, interaction core and placement flow
//! together. With the `winit` feature, [`winit_adapter`] feeds window events
//! into it.

pub mod viewer;

#[cfg(feature = "winit")]
pub mod winit_adapter;

pub use viewer::Viewer;
