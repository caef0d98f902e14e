//! Matrix helpers.
//!
//! World matrices are stored as 16 contiguous floats per entity, in the
//! column order of [`glam::Mat4::to_cols_array`]. Translation therefore sits
//! at slots 12, 13 and 14.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Number of floats in one world-matrix slot.
pub const MAT4_SLOT_LEN: usize = 16;

/// One entity's world-matrix slot.
pub type Mat4Slot = [f32; MAT4_SLOT_LEN];

/// Identity slot, used to initialise freshly spawned entities.
pub const IDENTITY_SLOT: Mat4Slot = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Reads the translation part of a slot.
#[inline]
#[must_use]
pub fn slot_translation(slot: &Mat4Slot) -> Vec3 {
    Vec3::new(slot[12], slot[13], slot[14])
}

/// Builds a local matrix from position, Euler rotation and scale.
#[inline]
#[must_use]
pub fn compose_local(position: Vec3, rotation: Vec3, scale: Vec3, order: EulerRot) -> Mat4 {
    let rotation = Quat::from_euler(order, rotation.x, rotation.y, rotation.z);
    Mat4::from_scale_rotation_translation(scale, rotation, position)
}

/// Decomposes a matrix into `(position, euler_rotation, scale)`.
///
/// Shear is lost in the decomposition.
#[must_use]
pub fn decompose_to_euler(matrix: &Mat4, order: EulerRot) -> (Vec3, Vec3, Vec3) {
    let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
    let (a, b, c) = rotation.to_euler(order);
    (translation, Vec3::new(a, b, c), scale)
}

/// Inverts `matrix` unless it is (numerically) singular.
///
/// `epsilon` is relative: the determinant is compared against the product of
/// the basis column lengths, so uniformly tiny but well-formed matrices still
/// invert. Degenerate bases (a zero axis, collapsed or non-finite columns) do
/// not.
#[must_use]
pub fn try_inverse(matrix: &Mat4, epsilon: f32) -> Option<Mat4> {
    let det = matrix.determinant();
    let extent = matrix.x_axis.truncate().length()
        * matrix.y_axis.truncate().length()
        * matrix.z_axis.truncate().length();
    if !det.is_finite() || det.abs() <= epsilon * extent {
        return None;
    }
    let inverse = matrix.inverse();
    inverse.is_finite().then_some(inverse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;
    use std::f32::consts::FRAC_PI_4;

    fn vec3_approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn identity_slot_matches_glam() {
        assert_eq!(IDENTITY_SLOT, Mat4::IDENTITY.to_cols_array());
    }

    #[test]
    fn translation_lives_in_slots_12_to_14() {
        let m = Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(slot_translation(&m.to_cols_array()), Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn decompose_recovers_trs() {
        let position = Vec3::new(1.0, -2.0, 3.0);
        let rotation = Vec3::new(0.2, FRAC_PI_4, -0.4);
        let scale = Vec3::new(2.0, 0.5, 1.5);
        let m = compose_local(position, rotation, scale, EulerRot::XYZ);

        let (p, r, s) = decompose_to_euler(&m, EulerRot::XYZ);
        assert!(vec3_approx(p, position));
        assert!(vec3_approx(r, rotation));
        assert!(vec3_approx(s, scale));
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let flat = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));
        assert!(try_inverse(&flat, 1e-6).is_none());
        assert!(try_inverse(&Mat4::IDENTITY, 1e-6).is_some());
        assert!(try_inverse(&Mat4::ZERO, 1e-6).is_none());
    }

    #[test]
    fn tiny_uniform_scale_still_inverts() {
        let tiny = Mat4::from_scale_rotation_translation(
            Vec3::splat(1e-4),
            Quat::from_rotation_z(0.5),
            Vec3::new(1.0, 0.0, 0.0),
        );
        assert!(tiny.determinant().abs() < 1e-11);

        let inverse = try_inverse(&tiny, 1e-6).expect("well-formed basis");
        let round_trip = tiny * inverse;
        assert!(round_trip.abs_diff_eq(Mat4::IDENTITY, 1e-3));
    }

    #[test]
    fn collapsed_basis_is_singular_at_any_scale() {
        let sheared = Mat4::from_cols(
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(1.0, 1e-9, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0, 0.0),
            Vec4::W,
        );
        assert!(try_inverse(&sheared, 1e-6).is_none());
    }
}
