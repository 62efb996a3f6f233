use std::borrow::Cow;

use glam::Affine3A;

use crate::scene::transform::Transform;
use crate::scene::{MeshKey, NodeHandle};

/// One entry of the scene tree: a product part, a group, the camera or a marker.
///
/// Links are only edited through [`Scene`](crate::scene::Scene), which keeps
/// `parent` and `children` consistent with each other.
#[derive(Debug, Clone)]
pub struct Node {
    /// Lookup name; several nodes may share one.
    pub name: Cow<'static, str>,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub transform: Transform,

    /// Hidden nodes and everything below them are invisible to picking.
    pub visible: bool,

    pub mesh: Option<MeshKey>,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Node")
    }

    #[must_use]
    pub fn with_name(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            visible: true,
            mesh: None,
        }
    }

    /// Builder-style mesh attachment.
    #[must_use]
    pub fn with_mesh(mut self, mesh: MeshKey) -> Self {
        self.mesh = Some(mesh);
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// World matrix as of the last propagation pass.
    ///
    /// Interaction code reads [`Scene::world_matrix`](crate::scene::Scene::world_matrix)
    /// instead, which is always current.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
