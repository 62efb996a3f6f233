//! Transform System
//!
//! Propagates world matrices down the hierarchy. Kept apart from [`Scene`]
//! so it only borrows the node store and the root list.
//!
//! [`Scene`]: crate::scene::Scene

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

/// Updates cached world matrices for every node reachable from `roots`.
///
/// Uses an explicit stack instead of recursion so deep hierarchies cannot
/// overflow. A node is recomputed when its own TRS changed or any ancestor's
/// world matrix changed this pass.
pub fn update_hierarchy_iterative(nodes: &mut SlotMap<NodeHandle, Node>, roots: &[NodeHandle]) {
    // (node, parent world matrix, parent changed)
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);

    for &root in roots.iter().rev() {
        stack.push((root, Affine3A::IDENTITY, false));
    }

    while let Some((handle, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let changed = local_changed || parent_changed;
        if changed {
            let world = parent_world * *node.transform.local_matrix();
            node.transform.set_world_matrix(world);
        }

        let world = node.transform.world_matrix;
        for &child in node.children.iter().rev() {
            stack.push((child, world, changed));
        }
    }
}

/// Updates one subtree, starting from the cached world matrix of its parent.
pub fn update_subtree(nodes: &mut SlotMap<NodeHandle, Node>, root: NodeHandle) {
    let parent_world = nodes
        .get(root)
        .and_then(|n| n.parent)
        .and_then(|p| nodes.get(p))
        .map_or(Affine3A::IDENTITY, |p| p.transform.world_matrix);

    let mut stack = vec![(root, parent_world)];
    while let Some((handle, parent_world)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };
        node.transform.update_local_matrix();
        let world = parent_world * *node.transform.local_matrix();
        node.transform.set_world_matrix(world);
        for &child in &node.children {
            stack.push((child, world));
        }
    }
}
