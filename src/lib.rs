//! # Sylva
//!
//! A hierarchical transform graph for interactive 3D applications.
//!
//! Entities keep their local position, rotation and scale in a
//! structure-of-arrays [`TransformStore`]. The [`SceneGraph`] layers a
//! parent/child hierarchy on top, preserves world placement when reparenting,
//! propagates dirty flags down subtrees and resolves world matrices either
//! lazily per query or eagerly once per frame.
//!
//! ```rust,ignore
//! use sylva::prelude::*;
//!
//! let mut ctx = SceneContext::new();
//! let arm = ctx.spawn_at(Vec3::new(1.0, 0.0, 0.0));
//! let hand = ctx.spawn_at(Vec3::new(0.0, 1.0, 0.0));
//!
//! ctx.attach(hand, arm);            // world position of `hand` is kept
//! ctx.update();                     // resolve every world matrix
//! assert!(ctx.world_position(hand).abs_diff_eq(Vec3::Y, 1e-5));
//! ```

pub use sylva_core;
pub use sylva_scene;

pub use sylva_core::{
    EntityId, Result, RotationOrder, SoaTransformStore, StoreSettings, SylvaError, TransformStore,
};
pub use sylva_scene::{SceneContext, SceneGraph, SceneGraphSettings, SceneNode};

pub use glam;

pub mod prelude {
    pub use glam::{Mat4, Quat, Vec3};
    pub use sylva_core::{EntityId, SoaTransformStore, TransformStore};
    pub use sylva_scene::{SceneContext, SceneGraph, SceneGraphSettings};
}
