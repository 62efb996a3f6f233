use std::borrow::Cow;

use glam::{Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::scene::{Geometry, Mesh, Node, NodeHandle, Scene, Transform};

/// Triangle mesh payload of a template node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub indices: Vec<[u32; 3]>,
    #[serde(default = "default_color")]
    pub color: Vec4,
}

fn default_color() -> Vec4 {
    Vec4::ONE
}

/// Decoded, scene-independent model tree.
///
/// A loader produces one template per asset; [`instantiate`](Self::instantiate)
/// turns it into scene nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelTemplate {
    pub name: String,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub mesh: Option<MeshData>,
    pub children: Vec<ModelTemplate>,
}

impl Default for ModelTemplate {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            mesh: None,
            children: Vec::new(),
        }
    }
}

impl ModelTemplate {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_geometry(mut self, geometry: &Geometry, color: Vec4) -> Self {
        self.mesh = Some(MeshData {
            positions: geometry.positions().to_vec(),
            indices: geometry.indices().to_vec(),
            color,
        });
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: ModelTemplate) -> Self {
        self.children.push(child);
        self
    }

    /// Total number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ModelTemplate::node_count).sum::<usize>()
    }

    /// Builds the tree under `parent` and returns its root node.
    pub fn instantiate(&self, scene: &mut Scene, parent: NodeHandle) -> NodeHandle {
        let mut node = Node::with_name(Cow::Owned(self.name.clone()));
        node.transform = Transform::from_trs(self.position, self.rotation, self.scale);
        if let Some(data) = &self.mesh {
            let geometry = Geometry::new(data.positions.clone(), data.indices.clone());
            let mesh = Mesh::new(Cow::Owned(self.name.clone()), geometry).with_color(data.color);
            node.mesh = Some(scene.meshes.insert(mesh));
        }

        let handle = scene.add_to_parent(node, parent);
        for child in &self.children {
            child.instantiate(scene, handle);
        }
        handle
    }
}
