//! Pointer and controller picking against the draggable set.

use rustc_hash::FxHashMap;

use crate::math::Ray;
use crate::registry::{DraggableObject, HitTestMode};
use crate::scene::{NodeHandle, RayHit, Scene};

/// Nearest draggable under `ray`, using each object's own hit-test mode.
///
/// Returns the hit resolved to its nearest registered ancestor, so a hit on a
/// nested draggable selects the nested one.
pub(crate) fn pick_draggable(
    scene: &Scene,
    draggables: &[DraggableObject],
    index: &FxHashMap<NodeHandle, usize>,
    ray: &Ray,
) -> Option<(usize, RayHit)> {
    let hit = draggables
        .iter()
        .filter(|object| scene.is_visible_in_hierarchy(object.node))
        .filter_map(|object| match object.hit_test {
            HitTestMode::Subtree => scene.raycast_subtree(object.node, ray),
            HitTestMode::Bounds => scene.raycast_bounds(object.node, ray),
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))?;

    resolve_draggable(scene, index, hit.node).map(|slot| (slot, hit))
}

/// Nearest registered ancestor of a full-scene hit.
pub(crate) fn pick_scene(scene: &Scene, index: &FxHashMap<NodeHandle, usize>, ray: &Ray) -> Option<(usize, RayHit)> {
    let hit = scene.raycast(ray)?;
    resolve_draggable(scene, index, hit.node).map(|slot| (slot, hit))
}

/// Walks parent links until a node in the draggable index is found.
pub(crate) fn resolve_draggable(scene: &Scene, index: &FxHashMap<NodeHandle, usize>, node: NodeHandle) -> Option<usize> {
    let mut current = Some(node);
    while let Some(handle) = current {
        if let Some(&slot) = index.get(&handle) {
            return Some(slot);
        }
        current = scene.parent_of(handle);
    }
    None
}
