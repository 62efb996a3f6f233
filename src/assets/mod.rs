//! Assets and Persistence
//!
//! Decoding real interchange formats is a host concern: the viewer only sees
//! an [`AssetLoader`] that turns an [`AssetSource`] into a [`ModelTemplate`]
//! tree. [`JsonModelLoader`] reads templates serialized with `serde_json`
//! and serves as the built-in loader.
//!
//! Assets that arrive as ephemeral blobs are copied into a
//! [`PersistenceStore`] so they survive a reload.

pub mod loader;
pub mod source;
pub mod store;
pub mod template;

pub use loader::{AssetLoader, JsonModelLoader};
pub use source::AssetSource;
pub use store::{DirectoryStore, MemoryStore, PersistenceStore};
pub use template::{MeshData, ModelTemplate};
