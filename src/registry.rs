//! Scene Registry
//!
//! Owns the set of loaded, manipulable parts. Every entry is a named node
//! parented (directly or transitively) under the product root. The registry
//! keeps a node-to-name membership index so the interaction core can resolve
//! a hit node to its registered ancestor without scanning the list.

use glam::Vec3;
use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::errors::{Result, ViewerError};
use crate::scene::{NodeHandle, Scene};

/// How a registered object is hit-tested by pointer picking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitTestMode {
    /// Test the triangles of every visible mesh in the object's subtree.
    #[default]
    Subtree,
    /// Test the object's world-space bounding box only.
    Bounds,
}

/// A registered, named scene node eligible for manipulation.
#[derive(Debug, Clone)]
pub struct DraggableObject {
    pub id: Uuid,
    pub name: String,
    pub node: NodeHandle,
    /// Local scale captured at registration, re-applied after every drag step.
    pub original_scale: Vec3,
    pub hit_test: HitTestMode,
}

pub struct SceneRegistry {
    product_root: NodeHandle,
    entries: FxHashMap<String, DraggableObject>,
    membership: FxHashMap<NodeHandle, String>,
    draggables: Vec<DraggableObject>,
}

impl SceneRegistry {
    #[must_use]
    pub fn new(product_root: NodeHandle) -> Self {
        Self {
            product_root,
            entries: FxHashMap::default(),
            membership: FxHashMap::default(),
            draggables: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn product_root(&self) -> NodeHandle {
        self.product_root
    }

    /// Inserts or replaces the entry named `name`.
    ///
    /// The node must already live under the product root. Registering a name
    /// twice keeps only the latest node; the earlier node stays in the scene.
    pub fn register(&mut self, scene: &Scene, name: impl Into<String>, node: NodeHandle, hit_test: HitTestMode) -> Result<()> {
        let name = name.into();
        let Some(scene_node) = scene.get_node(node) else {
            return Err(ViewerError::InvalidNode);
        };
        if !scene.is_descendant_of(node, self.product_root) {
            return Err(ViewerError::NotUnderProductRoot(name));
        }

        let object = DraggableObject {
            id: Uuid::new_v4(),
            name: name.clone(),
            node,
            original_scale: scene_node.transform.scale,
            hit_test,
        };

        if let Some(previous) = self.entries.insert(name.clone(), object) {
            self.membership.remove(&previous.node);
            log::debug!("Registry entry '{name}' replaced");
        }
        // A node registered under another name moves to the new one.
        if let Some(old_name) = self.membership.insert(node, name.clone())
            && old_name != name
        {
            self.entries.remove(&old_name);
        }

        self.rebuild();
        Ok(())
    }

    /// Drops an entry without touching the scene.
    pub fn unregister(&mut self, name: &str) -> Option<DraggableObject> {
        let removed = self.entries.remove(name)?;
        self.membership.remove(&removed.node);
        self.rebuild();
        Some(removed)
    }

    /// Drops an entry and removes its subtree from the scene.
    pub fn remove(&mut self, scene: &mut Scene, name: &str) -> Option<DraggableObject> {
        let removed = self.unregister(name)?;
        scene.remove_node(removed.node);
        Some(removed)
    }

    /// Detaches every registered object from the scene and empties the registry.
    pub fn clear(&mut self, scene: &mut Scene) {
        for object in self.entries.values() {
            scene.remove_node(object.node);
        }
        self.entries.clear();
        self.membership.clear();
        self.draggables.clear();
    }

    /// Current flat list; always exactly the registry's values.
    #[inline]
    #[must_use]
    pub fn draggable_list(&self) -> &[DraggableObject] {
        &self.draggables
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DraggableObject> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains_node(&self, node: NodeHandle) -> bool {
        self.membership.contains_key(&node)
    }

    /// Walks parent links from `node` to the first registered ancestor
    /// (inclusive), stopping at the scene root.
    #[must_use]
    pub fn resolve_root(&self, scene: &Scene, node: NodeHandle) -> Option<&DraggableObject> {
        let mut current = Some(node);
        while let Some(handle) = current {
            if let Some(name) = self.membership.get(&handle) {
                return self.entries.get(name);
            }
            current = scene.parent_of(handle);
        }
        None
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn rebuild(&mut self) {
        self.draggables = self.entries.values().cloned().collect();
        self.draggables.sort_by(|a, b| a.name.cmp(&b.name));
    }
}
