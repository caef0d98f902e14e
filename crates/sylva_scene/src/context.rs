//! Scene Context
//!
//! One owner for a transform store and the scene graph bound to it.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use glam::{Mat4, Vec3};
use sylva_core::{EntityId, SoaTransformStore, StoreSettings, SylvaError, TransformStore};

use crate::graph::SceneGraph;
use crate::settings::SceneGraphSettings;

/// Owns one transform store and the scene graph bound to it.
///
/// Create one at application start and hand `&mut SceneContext` to the
/// subsystems that need scene access; dropping it tears both down. Spawning,
/// despawning and local-transform edits go through the context so that slot
/// indices and dirty flags stay consistent.
pub struct SceneContext {
    store: Rc<RefCell<SoaTransformStore>>,
    graph: SceneGraph<SoaTransformStore>,
}

impl SceneContext {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(StoreSettings::default(), SceneGraphSettings::default())
    }

    #[must_use]
    pub fn with_settings(store: StoreSettings, graph: SceneGraphSettings) -> Self {
        let store = Rc::new(RefCell::new(SoaTransformStore::with_settings(store)));
        let mut graph = SceneGraph::with_settings(graph);
        graph.set_context(&store);
        Self { store, graph }
    }

    #[inline]
    #[must_use]
    pub fn graph(&self) -> &SceneGraph<SoaTransformStore> {
        &self.graph
    }

    #[inline]
    pub fn graph_mut(&mut self) -> &mut SceneGraph<SoaTransformStore> {
        &mut self.graph
    }

    /// Shared handle to the store, e.g. to bind a second graph.
    #[inline]
    #[must_use]
    pub fn store(&self) -> Rc<RefCell<SoaTransformStore>> {
        Rc::clone(&self.store)
    }

    /// Read access to the store.
    ///
    /// Graph queries made while the guard is alive find the store busy and
    /// return `None` (or the origin) instead of resolving.
    #[inline]
    #[must_use]
    pub fn store_ref(&self) -> Ref<'_, SoaTransformStore> {
        self.store.borrow()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Spawns an entity with an identity local transform as a new root.
    pub fn spawn(&mut self) -> EntityId {
        self.spawn_at(Vec3::ZERO)
    }

    /// Spawns an entity at `position` (local, which equals world for a root).
    ///
    /// # Panics
    ///
    /// Panics if a handle from [`store`](Self::store) is mutably borrowed.
    pub fn spawn_at(&mut self, position: Vec3) -> EntityId {
        let id = self
            .store
            .borrow_mut()
            .spawn_with(position, Vec3::ZERO, Vec3::ONE);
        self.graph.register_entity(id);
        id
    }

    /// Removes `id` from the graph and frees its store slot.
    ///
    /// Former children become roots and are flagged dirty so their new world
    /// transforms get resolved. Returns `false` if `id` was not alive.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        if self.store.try_borrow_mut().is_err() {
            log::debug!("despawn of {id:?} skipped: {}", SylvaError::StoreBusy);
            return false;
        }

        let orphans = self.graph.get_children(id).to_vec();
        self.graph.unregister_entity(id);
        for orphan in orphans {
            self.graph.set_dirty(orphan);
        }

        let freed = self
            .store
            .try_borrow_mut()
            .is_ok_and(|mut store| store.despawn(id));
        if freed {
            // The store moved its last slot into the hole.
            self.graph.refresh_indices();
        }
        freed
    }

    // ========================================================================
    // Local transforms
    // ========================================================================

    #[must_use]
    pub fn local_position(&self, id: EntityId) -> Option<Vec3> {
        let store = self.store.try_borrow().ok()?;
        store.index_of(id).map(|i| store.position(i))
    }

    #[must_use]
    pub fn local_rotation(&self, id: EntityId) -> Option<Vec3> {
        let store = self.store.try_borrow().ok()?;
        store.index_of(id).map(|i| store.rotation(i))
    }

    #[must_use]
    pub fn local_scale(&self, id: EntityId) -> Option<Vec3> {
        let store = self.store.try_borrow().ok()?;
        store.index_of(id).map(|i| store.scale(i))
    }

    pub fn set_local_position(&mut self, id: EntityId, position: Vec3) {
        self.edit(id, |store, i| store.set_position(i, position));
    }

    /// Sets the local rotation as Euler angles in the store's rotation order.
    pub fn set_local_rotation(&mut self, id: EntityId, rotation: Vec3) {
        self.edit(id, |store, i| store.set_rotation(i, rotation));
    }

    pub fn set_local_scale(&mut self, id: EntityId, scale: Vec3) {
        self.edit(id, |store, i| store.set_scale(i, scale));
    }

    fn edit(&mut self, id: EntityId, apply: impl FnOnce(&mut SoaTransformStore, usize)) {
        {
            let Ok(mut store) = self.store.try_borrow_mut() else {
                log::debug!("Ignoring transform edit of {id:?}: {}", SylvaError::StoreBusy);
                return;
            };
            let Some(index) = store.index_of(id) else {
                log::debug!("Ignoring transform edit of unknown entity {id:?}");
                return;
            };
            apply(&mut *store, index);
        }
        self.graph.set_dirty(id);
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    #[inline]
    pub fn attach(&mut self, child: EntityId, parent: impl Into<Option<EntityId>>) {
        self.graph.attach(child, parent);
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self, id: EntityId) -> Option<Mat4> {
        self.graph.get_world_matrix(id)
    }

    #[inline]
    #[must_use]
    pub fn world_position(&self, id: EntityId) -> Vec3 {
        self.graph.get_world_position(id)
    }

    /// Per-frame resolution of every world matrix.
    #[inline]
    pub fn update(&mut self) -> usize {
        self.graph.update()
    }
}

impl Default for SceneContext {
    fn default() -> Self {
        Self::new()
    }
}
