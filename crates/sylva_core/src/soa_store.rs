//! Structure-of-arrays transform store.
//!
//! Each transform attribute lives in its own contiguous array indexed by a
//! dense slot. Despawning swap-removes the slot, which moves the last entity
//! into the freed index; anything caching indices must refresh afterwards.

use glam::{EulerRot, Mat4, Vec3};
use slotmap::SlotMap;

use crate::EntityId;
use crate::errors::{Result, SylvaError};
use crate::math::{IDENTITY_SLOT, Mat4Slot, compose_local};
use crate::settings::StoreSettings;
use crate::store::TransformStore;

/// The default [`TransformStore`] implementation.
///
/// The id allocator doubles as the identity-to-index map: every live
/// [`EntityId`] maps to the slot holding its data.
#[derive(Debug, Clone)]
pub struct SoaTransformStore {
    slots: SlotMap<EntityId, usize>,
    owners: Vec<EntityId>,

    position_x: Vec<f32>,
    position_y: Vec<f32>,
    position_z: Vec<f32>,

    rotation_x: Vec<f32>,
    rotation_y: Vec<f32>,
    rotation_z: Vec<f32>,

    scale_x: Vec<f32>,
    scale_y: Vec<f32>,
    scale_z: Vec<f32>,

    dirty: Vec<u8>,
    world: Vec<Mat4Slot>,

    rotation_order: EulerRot,
}

impl SoaTransformStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(StoreSettings::default())
    }

    #[must_use]
    pub fn with_settings(settings: StoreSettings) -> Self {
        let cap = settings.initial_capacity;
        Self {
            slots: SlotMap::with_capacity_and_key(cap),
            owners: Vec::with_capacity(cap),
            position_x: Vec::with_capacity(cap),
            position_y: Vec::with_capacity(cap),
            position_z: Vec::with_capacity(cap),
            rotation_x: Vec::with_capacity(cap),
            rotation_y: Vec::with_capacity(cap),
            rotation_z: Vec::with_capacity(cap),
            scale_x: Vec::with_capacity(cap),
            scale_y: Vec::with_capacity(cap),
            scale_z: Vec::with_capacity(cap),
            dirty: Vec::with_capacity(cap),
            world: Vec::with_capacity(cap),
            rotation_order: settings.rotation_order.into(),
        }
    }

    /// Allocates an entity with an identity local transform.
    pub fn spawn(&mut self) -> EntityId {
        self.spawn_with(Vec3::ZERO, Vec3::ZERO, Vec3::ONE)
    }

    /// Allocates an entity with the given local position, Euler rotation and
    /// scale. The new slot starts dirty with an identity world matrix.
    pub fn spawn_with(&mut self, position: Vec3, rotation: Vec3, scale: Vec3) -> EntityId {
        let index = self.owners.len();
        let id = self.slots.insert(index);
        self.owners.push(id);

        self.position_x.push(position.x);
        self.position_y.push(position.y);
        self.position_z.push(position.z);
        self.rotation_x.push(rotation.x);
        self.rotation_y.push(rotation.y);
        self.rotation_z.push(rotation.z);
        self.scale_x.push(scale.x);
        self.scale_y.push(scale.y);
        self.scale_z.push(scale.z);

        self.dirty.push(1);
        self.world.push(IDENTITY_SLOT);

        id
    }

    /// Frees the slot of `id`. Returns `false` if the id is not alive.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        self.try_despawn(id).is_ok()
    }

    /// Frees the slot of `id` and returns the freed index.
    ///
    /// The last slot is moved into the freed index, so the index of one other
    /// entity may change.
    pub fn try_despawn(&mut self, id: EntityId) -> Result<usize> {
        let index = self.slots.remove(id).ok_or(SylvaError::StaleEntity(id))?;

        self.owners.swap_remove(index);
        self.position_x.swap_remove(index);
        self.position_y.swap_remove(index);
        self.position_z.swap_remove(index);
        self.rotation_x.swap_remove(index);
        self.rotation_y.swap_remove(index);
        self.rotation_z.swap_remove(index);
        self.scale_x.swap_remove(index);
        self.scale_y.swap_remove(index);
        self.scale_z.swap_remove(index);
        self.dirty.swap_remove(index);
        self.world.swap_remove(index);

        if let Some(&moved) = self.owners.get(index)
            && let Some(slot) = self.slots.get_mut(moved)
        {
            *slot = index;
        }

        log::trace!("Despawned {id:?}, freed slot {index}");
        Ok(index)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.slots.contains_key(id)
    }

    /// Live ids in slot order.
    #[inline]
    #[must_use]
    pub fn ids(&self) -> &[EntityId] {
        &self.owners
    }

    /// The contiguous world-matrix buffer, 16 floats per slot.
    #[inline]
    #[must_use]
    pub fn world_buffer(&self) -> &[f32] {
        self.world.as_flattened()
    }

    /// Dirty flags in slot order (`0` clean, `1` dirty).
    #[inline]
    #[must_use]
    pub fn dirty_flags(&self) -> &[u8] {
        &self.dirty
    }
}

impl Default for SoaTransformStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformStore for SoaTransformStore {
    #[inline]
    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.slots.get(id).copied()
    }

    #[inline]
    fn slot_count(&self) -> usize {
        self.owners.len()
    }

    #[inline]
    fn position(&self, index: usize) -> Vec3 {
        Vec3::new(self.position_x[index], self.position_y[index], self.position_z[index])
    }

    #[inline]
    fn set_position(&mut self, index: usize, position: Vec3) {
        self.position_x[index] = position.x;
        self.position_y[index] = position.y;
        self.position_z[index] = position.z;
    }

    #[inline]
    fn rotation(&self, index: usize) -> Vec3 {
        Vec3::new(self.rotation_x[index], self.rotation_y[index], self.rotation_z[index])
    }

    #[inline]
    fn set_rotation(&mut self, index: usize, rotation: Vec3) {
        self.rotation_x[index] = rotation.x;
        self.rotation_y[index] = rotation.y;
        self.rotation_z[index] = rotation.z;
    }

    #[inline]
    fn scale(&self, index: usize) -> Vec3 {
        Vec3::new(self.scale_x[index], self.scale_y[index], self.scale_z[index])
    }

    #[inline]
    fn set_scale(&mut self, index: usize, scale: Vec3) {
        self.scale_x[index] = scale.x;
        self.scale_y[index] = scale.y;
        self.scale_z[index] = scale.z;
    }

    #[inline]
    fn rotation_order(&self) -> EulerRot {
        self.rotation_order
    }

    #[inline]
    fn is_dirty(&self, index: usize) -> bool {
        self.dirty[index] != 0
    }

    #[inline]
    fn set_dirty(&mut self, index: usize, dirty: bool) {
        self.dirty[index] = u8::from(dirty);
    }

    #[inline]
    fn world_slot(&self, index: usize) -> &Mat4Slot {
        &self.world[index]
    }

    fn recompute_world(&mut self, index: usize, parent_world: Option<&Mat4>) {
        let local = compose_local(
            self.position(index),
            self.rotation(index),
            self.scale(index),
            self.rotation_order,
        );
        let world = match parent_world {
            Some(parent) => *parent * local,
            None => local,
        };
        self.world[index] = world.to_cols_array();
        self.dirty[index] = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_starts_dirty_with_identity_world() {
        let mut store = SoaTransformStore::new();
        let id = store.spawn();
        let index = store.index_of(id).expect("spawned id has a slot");

        assert!(store.is_dirty(index));
        assert_eq!(store.world_matrix(index), Mat4::IDENTITY);
        assert_eq!(store.scale(index), Vec3::ONE);
    }

    #[test]
    fn recompute_composes_parent_and_clears_dirty() {
        let mut store = SoaTransformStore::new();
        let id = store.spawn_with(Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO, Vec3::ONE);
        let index = store.index_of(id).expect("slot");

        let parent = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        store.recompute_world(index, Some(&parent));

        assert!(!store.is_dirty(index));
        assert_eq!(store.world_position(index), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(&store.world_buffer()[12..15], &[1.0, 1.0, 0.0]);
    }

    #[test]
    fn despawn_moves_last_slot_into_hole() {
        let mut store = SoaTransformStore::new();
        let a = store.spawn_with(Vec3::X, Vec3::ZERO, Vec3::ONE);
        let b = store.spawn_with(Vec3::Y, Vec3::ZERO, Vec3::ONE);
        let c = store.spawn_with(Vec3::Z, Vec3::ZERO, Vec3::ONE);

        assert_eq!(store.try_despawn(a), Ok(0));
        assert!(!store.contains(a));
        assert_eq!(store.len(), 2);

        let moved = store.index_of(c).expect("c is alive");
        assert_eq!(moved, 0);
        assert_eq!(store.position(moved), Vec3::Z);
        assert_eq!(store.index_of(b), Some(1));
        assert_eq!(store.world_buffer().len(), 2 * 16);
    }

    #[test]
    fn despawn_twice_reports_stale_entity() {
        let mut store = SoaTransformStore::new();
        let id = store.spawn();
        assert!(store.despawn(id));
        assert_eq!(store.try_despawn(id), Err(SylvaError::StaleEntity(id)));
    }
}
