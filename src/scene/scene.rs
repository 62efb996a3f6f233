use std::borrow::Cow;
use std::sync::atomic::{AtomicU32, Ordering};

use glam::{Affine3A, Quat, Vec3, Vec4};
use slotmap::SlotMap;

use crate::math::{Ray, ray_aabb};
use crate::scene::mesh::{BoundingBox, Mesh};
use crate::scene::node::Node;
use crate::scene::transform_system;
use crate::scene::{MeshKey, NodeHandle};

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Result of a ray query against scene geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Node whose mesh was hit
    pub node: NodeHandle,
    /// Ray parameter (world distance for normalized rays)
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
}

/// Scene graph container.
///
/// Pure data: nodes, hierarchy links, meshes and the background colour.
/// World-space queries ([`world_matrix`](Self::world_matrix),
/// [`world_bounds`](Self::world_bounds), [`raycast`](Self::raycast)) compose
/// local transforms on the fly, so they are correct immediately after a
/// transform edit without waiting for [`update_matrix_world`](Self::update_matrix_world).
pub struct Scene {
    pub id: u32,

    nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    pub meshes: SlotMap<MeshKey, Mesh>,

    /// Clear colour; `None` renders transparent (AR passthrough).
    pub background: Option<Vec4>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            meshes: SlotMap::with_key(),
            background: Some(Vec4::new(0.93, 0.93, 0.93, 1.0)),
        }
    }

    // ========================================================================
    // Node creation & removal
    // ========================================================================

    /// Creates an unnamed root node.
    pub fn create_node(&mut self) -> NodeHandle {
        self.add_node(Node::new())
    }

    /// Creates a named root node.
    pub fn create_node_with_name(&mut self, name: impl Into<Cow<'static, str>>) -> NodeHandle {
        self.add_node(Node::with_name(name))
    }

    /// Adds a node at the root level.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        if let Some(n) = self.nodes.get_mut(handle) {
            n.parent = None;
            n.children.clear();
        }
        self.root_nodes.push(handle);
        handle
    }

    /// Adds a node as the last child of `parent`.
    ///
    /// Falls back to the root level when `parent` is stale.
    pub fn add_to_parent(&mut self, child: Node, parent: NodeHandle) -> NodeHandle {
        let handle = self.add_node(child);
        self.attach(handle, parent);
        handle
    }

    /// Adds a mesh on a new node, optionally under `parent`.
    pub fn add_mesh(&mut self, mesh: Mesh, parent: Option<NodeHandle>) -> NodeHandle {
        let name = mesh.name.clone();
        let node = Node::with_name(name).with_mesh(self.meshes.insert(mesh));
        match parent {
            Some(parent) => self.add_to_parent(node, parent),
            None => self.add_node(node),
        }
    }

    /// Removes a node and its whole subtree, including attached meshes.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        if !self.nodes.contains_key(handle) {
            return;
        }
        self.unlink(handle);

        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                if let Some(mesh) = node.mesh {
                    self.meshes.remove(mesh);
                }
                stack.extend(node.children);
            }
        }
    }

    /// Detaches `child` from its current parent (or the root list).
    fn unlink(&mut self, child: NodeHandle) {
        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(parent) = self.nodes.get_mut(p)
                && let Some(i) = parent.children.iter().position(|&x| x == child)
            {
                parent.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child) {
            self.root_nodes.remove(i);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = None;
        }
    }

    /// Re-parents `child` under `parent`, keeping its local transform.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        if !self.nodes.contains_key(child) {
            return;
        }
        if self.is_descendant_of(parent, child) {
            log::warn!("Refusing to attach a node beneath its own descendant");
            return;
        }

        self.unlink(child);

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        } else {
            log::error!("Parent node not found during attach!");
            self.root_nodes.push(child);
            return;
        }

        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
    }

    /// Moves `child` back to the root level.
    pub fn detach(&mut self, child: NodeHandle) {
        if !self.nodes.contains_key(child) {
            return;
        }
        self.unlink(child);
        self.root_nodes.push(child);
        if let Some(c) = self.nodes.get_mut(child) {
            c.transform.mark_dirty();
        }
    }

    // ========================================================================
    // Access
    // ========================================================================

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn get_name(&self, handle: NodeHandle) -> Option<&str> {
        self.nodes.get(handle).map(|n| n.name.as_ref())
    }

    pub fn set_name(&mut self, handle: NodeHandle, name: impl Into<Cow<'static, str>>) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.name = name.into();
        }
    }

    /// First node with the given name, in root-first depth order.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.root_nodes
            .iter()
            .flat_map(|&root| self.collect_subtree(root))
            .find(|&h| self.get_name(h) == Some(name))
    }

    #[must_use]
    pub fn parent_of(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle).and_then(|n| n.parent)
    }

    /// True when `ancestor` lies on the parent chain of `node` (a node is not
    /// its own descendant).
    #[must_use]
    pub fn is_descendant_of(&self, node: NodeHandle, ancestor: NodeHandle) -> bool {
        let mut current = self.parent_of(node);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.parent_of(handle);
        }
        false
    }

    /// Handles of `root` and all its descendants, depth-first.
    #[must_use]
    pub fn collect_subtree(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            if let Some(node) = self.nodes.get(handle) {
                out.push(handle);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Visible flag of the node and every ancestor.
    #[must_use]
    pub fn is_visible_in_hierarchy(&self, handle: NodeHandle) -> bool {
        let mut current = Some(handle);
        while let Some(h) = current {
            match self.nodes.get(h) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    pub fn set_visible(&mut self, handle: NodeHandle, visible: bool) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.visible = visible;
        }
    }

    /// Mesh keys attached anywhere in the subtree.
    #[must_use]
    pub fn meshes_in_subtree(&self, root: NodeHandle) -> Vec<MeshKey> {
        self.collect_subtree(root)
            .into_iter()
            .filter_map(|h| self.nodes.get(h).and_then(|n| n.mesh))
            .collect()
    }

    // ========================================================================
    // World-space queries
    // ========================================================================

    /// World matrix composed fresh from the parent chain.
    #[must_use]
    pub fn world_matrix(&self, handle: NodeHandle) -> Option<Affine3A> {
        let mut node = self.nodes.get(handle)?;
        let mut matrix = node.transform.compose();
        while let Some(parent) = node.parent {
            node = self.nodes.get(parent)?;
            matrix = node.transform.compose() * matrix;
        }
        Some(matrix)
    }

    fn parent_world_matrix(&self, handle: NodeHandle) -> Affine3A {
        self.parent_of(handle)
            .and_then(|p| self.world_matrix(p))
            .unwrap_or(Affine3A::IDENTITY)
    }

    #[must_use]
    pub fn world_position(&self, handle: NodeHandle) -> Option<Vec3> {
        self.world_matrix(handle).map(|m| m.translation.into())
    }

    #[must_use]
    pub fn world_rotation(&self, handle: NodeHandle) -> Option<Quat> {
        self.world_matrix(handle)
            .map(|m| m.to_scale_rotation_translation().1)
    }

    /// Moves a node by a world-space offset, expressed in its parent's frame.
    pub fn translate_world(&mut self, handle: NodeHandle, delta: Vec3) {
        let local_delta = self.parent_world_matrix(handle).inverse().transform_vector3(delta);
        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.position += local_delta;
        }
    }

    /// Places a node's origin at a world-space position.
    pub fn set_world_position(&mut self, handle: NodeHandle, position: Vec3) {
        let local = self.parent_world_matrix(handle).inverse().transform_point3(position);
        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.position = local;
        }
    }

    /// Sets a node's world orientation, compensating for the parent's rotation.
    pub fn set_world_rotation(&mut self, handle: NodeHandle, rotation: Quat) {
        let (_, parent_rotation, _) = self.parent_world_matrix(handle).to_scale_rotation_translation();
        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.rotation = (parent_rotation.inverse() * rotation).normalize();
        }
    }

    /// World-space bounds of every mesh in the subtree, hidden ones included.
    #[must_use]
    pub fn world_bounds(&self, root: NodeHandle) -> Option<BoundingBox> {
        let mut combined: Option<BoundingBox> = None;
        self.walk(root, false, |_, node, world| {
            let local = node
                .mesh
                .and_then(|key| self.meshes.get(key))
                .and_then(|mesh| mesh.geometry.bounding_box());
            if let Some(bbox) = local {
                let world_bbox = bbox.transform(world);
                combined = Some(match combined {
                    Some(existing) => existing.union(&world_bbox),
                    None => world_bbox,
                });
            }
        });
        combined
    }

    /// Tight world-space bounds built from transformed vertices.
    ///
    /// Unlike [`world_bounds`](Self::world_bounds) this stays exact under
    /// rotation, at the cost of visiting every vertex.
    #[must_use]
    pub fn world_vertex_bounds(&self, root: NodeHandle) -> Option<BoundingBox> {
        let mut points = Vec::new();
        self.walk(root, false, |_, node, world| {
            if let Some(mesh) = node.mesh.and_then(|key| self.meshes.get(key)) {
                points.extend(mesh.geometry.positions().iter().map(|&p| world.transform_point3(p)));
            }
        });
        BoundingBox::from_points(points)
    }

    /// Nearest mesh hit across every visible root.
    #[must_use]
    pub fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        self.root_nodes
            .iter()
            .filter_map(|&root| self.raycast_subtree(root, ray))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Nearest mesh hit within one subtree, testing actual triangles.
    ///
    /// Hidden nodes prune their whole subtree. Ancestors of `root` are not
    /// checked for visibility.
    #[must_use]
    pub fn raycast_subtree(&self, root: NodeHandle, ray: &Ray) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        self.walk(root, true, |handle, node, world| {
            let Some(mesh) = node.mesh.and_then(|key| self.meshes.get(key)) else {
                return;
            };
            let local_ray = ray.transformed(&world.inverse());
            if let Some(t) = mesh.geometry.raycast(&local_ray)
                && best.is_none_or(|b| t < b.distance)
            {
                best = Some(RayHit {
                    node: handle,
                    distance: t,
                    point: ray.at(t),
                });
            }
        });
        best
    }

    /// Ray against the world-space box of a subtree (generic bounds test).
    #[must_use]
    pub fn raycast_bounds(&self, root: NodeHandle, ray: &Ray) -> Option<RayHit> {
        if !self.is_visible_in_hierarchy(root) {
            return None;
        }
        let bounds = self.world_bounds(root)?;
        let t = ray_aabb(ray, bounds.min, bounds.max)?;
        Some(RayHit {
            node: root,
            distance: t,
            point: ray.at(t),
        })
    }

    /// Depth-first walk composing world matrices on the fly.
    fn walk(&self, root: NodeHandle, visible_only: bool, mut visit: impl FnMut(NodeHandle, &Node, &Affine3A)) {
        let parent_world = self.parent_world_matrix(root);
        let mut stack = vec![(root, parent_world)];
        while let Some((handle, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            if visible_only && !node.visible {
                continue;
            }
            let world = parent_world * node.transform.compose();
            visit(handle, node, &world);
            for &child in &node.children {
                stack.push((child, world));
            }
        }
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    /// Refreshes every cached world matrix (render-side consumers).
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy_iterative(&mut self.nodes, &self.root_nodes);
    }

    /// Refreshes cached world matrices of one subtree.
    pub fn update_subtree(&mut self, root: NodeHandle) {
        transform_system::update_subtree(&mut self.nodes, root);
    }
}
