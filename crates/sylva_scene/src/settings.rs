//! Scene Graph Settings
//!
//! ```rust,ignore
//! let graph = SceneGraph::with_settings(SceneGraphSettings {
//!     traversal_capacity: 1024,
//!     ..Default::default()
//! });
//! ```

use serde::{Deserialize, Serialize};

/// Configuration of a [`SceneGraph`](crate::SceneGraph).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneGraphSettings {
    /// Initial capacity of the pooled traversal stacks.
    pub traversal_capacity: usize,
    /// Relative singularity threshold for parent world matrices during
    /// reparenting: a matrix whose determinant is at or below this fraction
    /// of the product of its basis column lengths is treated as
    /// non-invertible.
    pub singular_epsilon: f32,
    /// Refuse to attach an entity under itself or one of its descendants.
    pub reject_cycles: bool,
}

impl Default for SceneGraphSettings {
    fn default() -> Self {
        Self {
            traversal_capacity: 64,
            singular_epsilon: 1e-6,
            reject_cycles: true,
        }
    }
}
