//! Transform Store Settings
//!
//! ```rust,ignore
//! use sylva_core::{RotationOrder, SoaTransformStore, StoreSettings};
//!
//! let store = SoaTransformStore::with_settings(StoreSettings {
//!     initial_capacity: 4096,
//!     rotation_order: RotationOrder::YXZ,
//! });
//! ```

use glam::EulerRot;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RotationOrder
// ---------------------------------------------------------------------------

/// Order in which the per-entity Euler angles are applied.
///
/// Mirrors the intrinsic orders of [`glam::EulerRot`] so it can be written in
/// configuration files.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RotationOrder {
    #[default]
    XYZ,
    XZY,
    YXZ,
    YZX,
    ZXY,
    ZYX,
}

impl From<RotationOrder> for EulerRot {
    #[inline]
    fn from(order: RotationOrder) -> Self {
        match order {
            RotationOrder::XYZ => EulerRot::XYZ,
            RotationOrder::XZY => EulerRot::XZY,
            RotationOrder::YXZ => EulerRot::YXZ,
            RotationOrder::YZX => EulerRot::YZX,
            RotationOrder::ZXY => EulerRot::ZXY,
            RotationOrder::ZYX => EulerRot::ZYX,
        }
    }
}

// ---------------------------------------------------------------------------
// StoreSettings
// ---------------------------------------------------------------------------

/// Configuration of a [`SoaTransformStore`](crate::SoaTransformStore).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Number of entity slots reserved up front in every array.
    pub initial_capacity: usize,
    /// Euler order used to turn stored rotations into matrices and back.
    pub rotation_order: RotationOrder,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            initial_capacity: 256,
            rotation_order: RotationOrder::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let settings: StoreSettings = serde_json::from_str(r#"{ "rotation_order": "ZYX" }"#)
            .expect("valid settings document");
        assert_eq!(settings.rotation_order, RotationOrder::ZYX);
        assert_eq!(settings.initial_capacity, StoreSettings::default().initial_capacity);
    }

    #[test]
    fn rotation_order_maps_to_glam() {
        assert_eq!(EulerRot::from(RotationOrder::default()), EulerRot::XYZ);
        assert_eq!(EulerRot::from(RotationOrder::YXZ), EulerRot::YXZ);
    }
}
