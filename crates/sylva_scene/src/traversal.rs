//! Hierarchy traversal routines.
//!
//! The routines here borrow only the node registry and the transform store,
//! never the whole [`SceneGraph`](crate::SceneGraph), so the graph can call them
//! while it holds the store borrowed. Every walk uses an explicit stack; none
//! recurse, so hierarchy depth never touches the call stack.
//!
//! Nodes without a store slot are transparent: they are skipped, and their
//! children see the nearest indexed ancestor as their parent.

use glam::Mat4;
use smallvec::SmallVec;
use sylva_core::{EntityId, TransformStore};

use crate::registry::SceneNodeRegistry;

/// Pending work of the per-frame update: the node, the world matrix of its
/// nearest resolved ancestor, and whether that ancestor was recomputed in this
/// pass.
#[derive(Debug, Clone, Copy)]
pub struct TraversalItem {
    pub entity: EntityId,
    pub parent_world: Option<Mat4>,
    pub parent_dirty: bool,
}

/// Ancestor chains up to this depth are collected without allocating.
const INLINE_CHAIN: usize = 16;

#[inline]
fn slot_of<S: TransformStore + ?Sized>(
    registry: &SceneNodeRegistry,
    store: &S,
    id: EntityId,
) -> Option<usize> {
    registry.index(id).filter(|&index| store.has_slot(index))
}

/// Flags `id` and every descendant dirty. Returns the number of flags set.
pub fn mark_subtree_dirty<S: TransformStore + ?Sized>(
    registry: &SceneNodeRegistry,
    store: &mut S,
    id: EntityId,
    stack: &mut Vec<EntityId>,
) -> usize {
    stack.clear();
    stack.push(id);

    let mut marked = 0;
    while let Some(current) = stack.pop() {
        if let Some(index) = slot_of(registry, store, current) {
            store.set_dirty(index, true);
            marked += 1;
        }
        stack.extend_from_slice(registry.children(current));
    }
    marked
}

/// Resolves the world matrix of `id` by walking its ancestor chain.
///
/// The chain is evaluated root to leaf. A link is recomputed when its own flag
/// is set or when a link above it was recomputed; clean links are trusted.
/// Returns `None` when `id` is unknown or has no slot.
pub fn resolve_world_matrix<S: TransformStore + ?Sized>(
    registry: &SceneNodeRegistry,
    store: &mut S,
    id: EntityId,
) -> Option<Mat4> {
    let leaf = slot_of(registry, store, id)?;

    let mut chain: SmallVec<[usize; INLINE_CHAIN]> = SmallVec::new();
    chain.push(leaf);
    for ancestor in registry.ancestors(id) {
        if let Some(index) = slot_of(registry, store, ancestor) {
            chain.push(index);
        }
    }

    let mut parent_world: Option<Mat4> = None;
    let mut inherited = false;
    for &index in chain.iter().rev() {
        if inherited || store.is_dirty(index) {
            store.recompute_world(index, parent_world.as_ref());
            inherited = true;
        }
        parent_world = Some(store.world_matrix(index));
    }

    parent_world
}

/// Resolves the world matrix of the nearest ancestor of `id` that has a slot.
pub fn resolve_parent_world<S: TransformStore + ?Sized>(
    registry: &SceneNodeRegistry,
    store: &mut S,
    id: EntityId,
) -> Option<Mat4> {
    let ancestor = registry
        .ancestors(id)
        .find(|&a| slot_of(registry, &*store, a).is_some())?;
    resolve_world_matrix(registry, store, ancestor)
}

/// Resolves every reachable world matrix once, root to leaf, starting from the
/// given items. Returns the number of matrices recomputed.
///
/// Children are pushed in reverse so they pop in insertion order.
pub fn update_hierarchy<S: TransformStore + ?Sized>(
    registry: &SceneNodeRegistry,
    store: &mut S,
    stack: &mut Vec<TraversalItem>,
) -> usize {
    let mut recomputed = 0;

    while let Some(item) = stack.pop() {
        let (world, dirty) = match slot_of(registry, store, item.entity) {
            Some(index) => {
                let dirty = item.parent_dirty || store.is_dirty(index);
                if dirty {
                    store.recompute_world(index, item.parent_world.as_ref());
                    recomputed += 1;
                }
                (Some(store.world_matrix(index)), dirty)
            }
            None => (item.parent_world, item.parent_dirty),
        };

        for &child in registry.children(item.entity).iter().rev() {
            stack.push(TraversalItem {
                entity: child,
                parent_world: world,
                parent_dirty: dirty,
            });
        }
    }

    recomputed
}

/// Seeds `stack` with every root, in reverse so roots pop in order.
pub fn seed_roots(registry: &SceneNodeRegistry, stack: &mut Vec<TraversalItem>) {
    stack.clear();
    stack.extend(registry.roots().iter().rev().map(|&entity| TraversalItem {
        entity,
        parent_world: None,
        parent_dirty: false,
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use sylva_core::SoaTransformStore;

    /// a -> b -> c, each translated by +1 on x.
    fn chain() -> (SceneNodeRegistry, SoaTransformStore, [EntityId; 3]) {
        let mut store = SoaTransformStore::new();
        let a = store.spawn_with(Vec3::X, Vec3::ZERO, Vec3::ONE);
        let b = store.spawn_with(Vec3::X, Vec3::ZERO, Vec3::ONE);
        let c = store.spawn_with(Vec3::X, Vec3::ZERO, Vec3::ONE);

        let mut registry = SceneNodeRegistry::new();
        for id in [a, b, c] {
            registry.register(id, store.index_of(id));
        }
        registry.unlink(b);
        registry.link(b, Some(a));
        registry.unlink(c);
        registry.link(c, Some(b));

        (registry, store, [a, b, c])
    }

    #[test]
    fn dirty_marking_reaches_every_descendant() {
        let (registry, mut store, [a, b, c]) = chain();
        let mut stack = Vec::new();
        let mut items = Vec::new();
        seed_roots(&registry, &mut items);
        update_hierarchy(&registry, &mut store, &mut items);
        assert!(store.dirty_flags().iter().all(|&f| f == 0));

        assert_eq!(mark_subtree_dirty(&registry, &mut store, a, &mut stack), 3);
        for id in [a, b, c] {
            let index = store.index_of(id).expect("slot");
            assert!(store.is_dirty(index));
        }
    }

    #[test]
    fn lazy_resolution_only_touches_the_chain() {
        let (mut registry, mut store, [a, b, c]) = chain();
        let side = store.spawn();
        registry.register(side, store.index_of(side));

        let world = resolve_world_matrix(&registry, &mut store, c).expect("resolvable");
        assert_eq!(world.w_axis.truncate(), Vec3::new(3.0, 0.0, 0.0));

        for id in [a, b, c] {
            assert!(!store.is_dirty(store.index_of(id).expect("slot")));
        }
        assert!(store.is_dirty(store.index_of(side).expect("slot")));
    }

    #[test]
    fn update_recomputes_each_node_once() {
        let (registry, mut store, [_, _, c]) = chain();
        let mut items = Vec::new();

        seed_roots(&registry, &mut items);
        assert_eq!(update_hierarchy(&registry, &mut store, &mut items), 3);

        seed_roots(&registry, &mut items);
        assert_eq!(update_hierarchy(&registry, &mut store, &mut items), 0);

        let index = store.index_of(c).expect("slot");
        assert_eq!(store.world_position(index), Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn nodes_without_slot_are_transparent() {
        let (mut registry, mut store, [a, _, _]) = chain();
        let ghost = store.spawn();
        let leaf = store.spawn_with(Vec3::Y, Vec3::ZERO, Vec3::ONE);

        registry.register(ghost, None);
        registry.register(leaf, store.index_of(leaf));
        registry.unlink(ghost);
        registry.link(ghost, Some(a));
        registry.unlink(leaf);
        registry.link(leaf, Some(ghost));

        let mut items = Vec::new();
        seed_roots(&registry, &mut items);
        update_hierarchy(&registry, &mut store, &mut items);

        let index = store.index_of(leaf).expect("slot");
        assert_eq!(store.world_position(index), Vec3::new(1.0, 1.0, 0.0));
        assert!(resolve_world_matrix(&registry, &mut store, ghost).is_none());
    }
}
