//! The transform store contract.
//!
//! A transform store owns the numeric transform data of every entity as a
//! structure of arrays, addressed by a dense slot index. The scene graph never
//! owns these values; it reads and writes them exclusively through this trait.

use glam::{EulerRot, Mat4, Vec3};

use crate::EntityId;
use crate::math::{Mat4Slot, slot_translation};

/// Structure-of-arrays storage for local transforms, dirty flags and world
/// matrices.
///
/// Every `index` passed to the per-slot methods must be below
/// [`slot_count`](Self::slot_count); implementations are free to panic
/// otherwise.
pub trait TransformStore {
    /// Maps an entity to its current slot, if the store knows it.
    fn index_of(&self, id: EntityId) -> Option<usize>;

    /// Number of occupied slots.
    fn slot_count(&self) -> usize;

    /// Returns `true` if `index` addresses an occupied slot.
    #[inline]
    fn has_slot(&self, index: usize) -> bool {
        index < self.slot_count()
    }

    fn position(&self, index: usize) -> Vec3;
    fn set_position(&mut self, index: usize, position: Vec3);

    /// Local rotation as Euler angles in [`rotation_order`](Self::rotation_order).
    fn rotation(&self, index: usize) -> Vec3;
    fn set_rotation(&mut self, index: usize, rotation: Vec3);

    fn scale(&self, index: usize) -> Vec3;
    fn set_scale(&mut self, index: usize, scale: Vec3);

    /// Euler order the stored rotations are expressed in.
    fn rotation_order(&self) -> EulerRot;

    fn is_dirty(&self, index: usize) -> bool;
    fn set_dirty(&mut self, index: usize, dirty: bool);

    /// The 16-float world-matrix slot of `index`.
    fn world_slot(&self, index: usize) -> &Mat4Slot;

    /// The world matrix of `index` as a [`Mat4`].
    #[inline]
    fn world_matrix(&self, index: usize) -> Mat4 {
        Mat4::from_cols_array(self.world_slot(index))
    }

    /// The translation part of the world matrix of `index`.
    #[inline]
    fn world_position(&self, index: usize) -> Vec3 {
        slot_translation(self.world_slot(index))
    }

    /// Rebuilds the world matrix of `index` from its local position, rotation
    /// and scale composed with `parent_world` (identity when `None`), and
    /// clears the slot's dirty flag.
    fn recompute_world(&mut self, index: usize, parent_world: Option<&Mat4>);
}
