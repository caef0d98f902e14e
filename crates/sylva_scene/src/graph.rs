//! Scene Graph
//!
//! Maintains the parent/child topology of registered entities and resolves
//! their world matrices against a bound [`TransformStore`].
//!
//! # Binding
//!
//! The graph holds only a weak reference to its store. Every store-dependent
//! operation is a no-op (or returns `None`) while no store is bound or after
//! the bound store has been dropped.
//!
//! # Resolution
//!
//! - [`SceneGraph::get_world_matrix`] resolves lazily, walking only the ancestor
//!   chain of the queried entity.
//! - [`SceneGraph::update`] resolves the whole hierarchy once per frame.
//!
//! Both paths produce the same matrices for the same topology and local
//! transforms.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::{Mat4, Quat, Vec3};
use sylva_core::math::{decompose_to_euler, try_inverse};
use sylva_core::{EntityId, Result, SoaTransformStore, SylvaError, TransformStore};

use crate::registry::{Ancestors, Descendants, SceneNodeRegistry};
use crate::settings::SceneGraphSettings;
use crate::traversal::{self, TraversalItem};

/// Hierarchical transform graph over a structure-of-arrays store.
///
/// Single-threaded: the pooled traversal stacks make `update` non-reentrant,
/// and all calls must be serialized by the owner. While the bound store is
/// borrowed elsewhere, store-dependent calls behave as if it were unbound
/// and the `try_*` forms report [`SylvaError::StoreBusy`].
pub struct SceneGraph<S: TransformStore = SoaTransformStore> {
    registry: SceneNodeRegistry,
    context: Option<Weak<RefCell<S>>>,
    settings: SceneGraphSettings,

    // Pooled traversal buffers, reused across calls.
    update_stack: Vec<TraversalItem>,
    dirty_stack: Vec<EntityId>,
}

impl<S: TransformStore> SceneGraph<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(SceneGraphSettings::default())
    }

    #[must_use]
    pub fn with_settings(settings: SceneGraphSettings) -> Self {
        Self {
            registry: SceneNodeRegistry::new(),
            context: None,
            settings,
            update_stack: Vec::with_capacity(settings.traversal_capacity),
            dirty_stack: Vec::with_capacity(settings.traversal_capacity),
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &SceneGraphSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &SceneNodeRegistry {
        &self.registry
    }

    #[inline]
    fn store(&self) -> Option<Rc<RefCell<S>>> {
        self.context.as_ref().and_then(Weak::upgrade)
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Registers `id` as a root. Re-registering a known id is a no-op.
    pub fn register_entity(&mut self, id: EntityId) {
        if self.registry.contains(id) {
            return;
        }
        let index = self.store().and_then(|store| {
            let store = store.try_borrow().ok()?;
            store.index_of(id)
        });
        self.registry.register(id, index);
        log::trace!("Registered {id:?} (slot {index:?})");
    }

    /// Removes `id`; its children become roots.
    ///
    /// The promoted children keep their local transforms but are not flagged
    /// dirty. Callers that care about the changed world transforms should call
    /// [`set_dirty`](Self::set_dirty) on them.
    pub fn unregister_entity(&mut self, id: EntityId) {
        if let Some(node) = self.registry.unregister(id) {
            log::trace!(
                "Unregistered {id:?}, promoted {} children to roots",
                node.children().len()
            );
        }
    }

    /// Binds `store` and refreshes every cached slot index from it.
    pub fn set_context(&mut self, store: &Rc<RefCell<S>>) {
        self.context = Some(Rc::downgrade(store));
        self.refresh_indices();
    }

    /// Unbinds the current store, if any.
    pub fn clear_context(&mut self) {
        self.context = None;
    }

    /// Returns `true` while a live store is bound.
    #[must_use]
    pub fn has_context(&self) -> bool {
        self.store().is_some()
    }

    /// Re-reads cached slot indices from the bound store, e.g. after the store
    /// moved slots around.
    pub fn refresh_indices(&mut self) {
        let Some(store) = self.store() else {
            return;
        };
        match store.try_borrow() {
            Ok(store) => self.registry.refresh_indices(&*store),
            Err(_) => log::debug!("refresh_indices skipped: {}", SylvaError::StoreBusy),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.registry.contains(id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get_root_ids(&self) -> &[EntityId] {
        self.registry.roots()
    }

    #[inline]
    #[must_use]
    pub fn get_children(&self, id: EntityId) -> &[EntityId] {
        self.registry.children(id)
    }

    #[inline]
    #[must_use]
    pub fn get_parent_id(&self, id: EntityId) -> Option<EntityId> {
        self.registry.parent(id)
    }

    /// Cached store slot of `id`.
    #[inline]
    #[must_use]
    pub fn get_index(&self, id: EntityId) -> Option<usize> {
        self.registry.index(id)
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self, id: EntityId) -> bool {
        self.registry.is_root(id)
    }

    #[inline]
    #[must_use]
    pub fn is_leaf(&self, id: EntityId) -> bool {
        self.registry.is_leaf(id)
    }

    #[inline]
    #[must_use]
    pub fn ancestors(&self, id: EntityId) -> Ancestors<'_> {
        self.registry.ancestors(id)
    }

    #[inline]
    #[must_use]
    pub fn descendants(&self, id: EntityId) -> Descendants<'_> {
        self.registry.descendants(id)
    }

    /// Returns `true` if `candidate` is a (transitive) ancestor of `id`.
    #[inline]
    #[must_use]
    pub fn is_ancestor(&self, id: EntityId, candidate: EntityId) -> bool {
        self.registry.is_ancestor(id, candidate)
    }

    // ========================================================================
    // Hierarchy mutation
    // ========================================================================

    /// Reparents `child` under `parent` (or to the root when `None` or unknown)
    /// while keeping its world position, rotation and scale.
    ///
    /// Does nothing when `child` is unknown, no store is bound, or the move
    /// would create a cycle.
    pub fn attach(&mut self, child: EntityId, parent: impl Into<Option<EntityId>>) {
        if let Err(err) = self.try_attach(child, parent) {
            match err {
                SylvaError::CyclicAttach { .. } => log::warn!("attach rejected: {err}"),
                _ => log::debug!("attach skipped: {err}"),
            }
        }
    }

    /// Makes `child` a root, keeping its world transform.
    #[inline]
    pub fn detach(&mut self, child: EntityId) {
        self.attach(child, None);
    }

    /// Fallible form of [`attach`](Self::attach).
    pub fn try_attach(
        &mut self,
        child: EntityId,
        parent: impl Into<Option<EntityId>>,
    ) -> Result<()> {
        let parent = parent.into();
        if !self.registry.contains(child) {
            return Err(SylvaError::UnknownEntity(child));
        }
        let store = self.store().ok_or(SylvaError::NoContext)?;

        if self.settings.reject_cycles
            && let Some(p) = parent
            && (p == child || self.registry.is_ancestor(p, child))
        {
            return Err(SylvaError::CyclicAttach { child, parent: p });
        }

        let mut store = store.try_borrow_mut().map_err(|_| SylvaError::StoreBusy)?;
        let world = traversal::resolve_world_matrix(&self.registry, &mut *store, child)
            .unwrap_or(Mat4::IDENTITY);

        self.registry.unlink(child);
        if let Some(p) = parent
            && !self.registry.contains(p)
        {
            log::debug!("attach: parent {p:?} is not registered, {child:?} becomes a root");
        }
        let parent = self.registry.link(child, parent);

        let local = match parent {
            None => world,
            Some(p) => {
                let parent_world =
                    traversal::resolve_parent_world(&self.registry, &mut *store, child);
                match parent_world {
                    Some(parent_world) => {
                        match try_inverse(&parent_world, self.settings.singular_epsilon) {
                            Some(inverse) => inverse * world,
                            None => {
                                log::warn!(
                                    "attach: world matrix of parent {p:?} is not invertible, \
                                     using the world transform of {child:?} as its local transform"
                                );
                                world
                            }
                        }
                    }
                    None => world,
                }
            }
        };

        if let Some(index) = self.registry.index(child).filter(|&i| store.has_slot(i)) {
            let (position, rotation, scale) = decompose_to_euler(&local, store.rotation_order());
            store.set_position(index, position);
            store.set_rotation(index, rotation);
            store.set_scale(index, scale);
        }

        traversal::mark_subtree_dirty(&self.registry, &mut *store, child, &mut self.dirty_stack);
        Ok(())
    }

    // ========================================================================
    // Dirty propagation
    // ========================================================================

    /// Flags `id` and all of its descendants dirty.
    pub fn set_dirty(&mut self, id: EntityId) {
        if let Err(err) = self.try_set_dirty(id) {
            log::debug!("set_dirty skipped: {err}");
        }
    }

    /// Fallible form of [`set_dirty`](Self::set_dirty). Returns the number of
    /// dirty flags set.
    pub fn try_set_dirty(&mut self, id: EntityId) -> Result<usize> {
        let store = self.store().ok_or(SylvaError::NoContext)?;
        if !self.registry.contains(id) {
            return Err(SylvaError::UnknownEntity(id));
        }
        let mut store = store.try_borrow_mut().map_err(|_| SylvaError::StoreBusy)?;
        Ok(traversal::mark_subtree_dirty(
            &self.registry,
            &mut *store,
            id,
            &mut self.dirty_stack,
        ))
    }

    // ========================================================================
    // World matrix resolution
    // ========================================================================

    /// Resolves the world matrix of `id` through its ancestor chain.
    ///
    /// Returns `None` when `id` is unknown, has no store slot, or no store is
    /// bound.
    #[must_use]
    pub fn get_world_matrix(&self, id: EntityId) -> Option<Mat4> {
        self.try_world_matrix(id).ok()
    }

    /// Fallible form of [`get_world_matrix`](Self::get_world_matrix).
    pub fn try_world_matrix(&self, id: EntityId) -> Result<Mat4> {
        let store = self.store().ok_or(SylvaError::NoContext)?;
        if !self.registry.contains(id) {
            return Err(SylvaError::UnknownEntity(id));
        }
        let mut store = store.try_borrow_mut().map_err(|_| SylvaError::StoreBusy)?;
        traversal::resolve_world_matrix(&self.registry, &mut *store, id)
            .ok_or(SylvaError::MissingIndex(id))
    }

    /// World-space position of `id`, or the origin when unresolvable.
    #[must_use]
    pub fn get_world_position(&self, id: EntityId) -> Vec3 {
        self.get_world_matrix(id)
            .map_or(Vec3::ZERO, |m| m.w_axis.truncate())
    }

    /// World-space `(scale, rotation, translation)` of `id`.
    #[must_use]
    pub fn get_world_transform(&self, id: EntityId) -> Option<(Vec3, Quat, Vec3)> {
        self.get_world_matrix(id)
            .map(|m| m.to_scale_rotation_translation())
    }

    /// Resolves every reachable world matrix once, root to leaf.
    ///
    /// Call once per frame. Returns the number of matrices recomputed.
    pub fn update(&mut self) -> usize {
        let Some(store) = self.store() else {
            return 0;
        };
        let Ok(mut store) = store.try_borrow_mut() else {
            log::debug!("update skipped: {}", SylvaError::StoreBusy);
            return 0;
        };

        traversal::seed_roots(&self.registry, &mut self.update_stack);
        let recomputed =
            traversal::update_hierarchy(&self.registry, &mut *store, &mut self.update_stack);
        log::trace!("Scene graph update recomputed {recomputed} world matrices");
        recomputed
    }

    /// Recomputes `id` and its whole subtree against the lazily resolved world
    /// matrix of its parent. Returns the number of matrices recomputed.
    pub fn update_subtree(&mut self, id: EntityId) -> usize {
        let Some(store) = self.store() else {
            return 0;
        };
        if !self.registry.contains(id) {
            return 0;
        }
        let Ok(mut store) = store.try_borrow_mut() else {
            log::debug!("update_subtree skipped: {}", SylvaError::StoreBusy);
            return 0;
        };

        let parent_world = traversal::resolve_parent_world(&self.registry, &mut *store, id);

        self.update_stack.clear();
        self.update_stack.push(TraversalItem {
            entity: id,
            parent_world,
            parent_dirty: true,
        });
        traversal::update_hierarchy(&self.registry, &mut *store, &mut self.update_stack)
    }
}

impl<S: TransformStore> Default for SceneGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}
