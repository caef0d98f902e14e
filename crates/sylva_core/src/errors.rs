//! Error Types
//!
//! The scene graph follows a silent no-op policy on its infallible API, but
//! every mutator has a `try_*` twin that reports why nothing happened.
//! [`SylvaError`] enumerates those reasons.
//!
//! ```rust,ignore
//! use sylva_core::{Result, SylvaError};
//!
//! fn reparent(graph: &mut SceneGraph, child: EntityId, parent: EntityId) -> Result<()> {
//!     graph.try_attach(child, Some(parent))
//! }
//! ```

use thiserror::Error;

use crate::EntityId;

/// The error type shared by the Sylva crates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SylvaError {
    /// The entity is not registered with the graph (or unknown to the store).
    #[error("Unknown entity: {0:?}")]
    UnknownEntity(EntityId),

    /// The operation needs a bound transform store, but none is bound or the
    /// bound store has been dropped.
    #[error("No transform store is bound to the scene graph")]
    NoContext,

    /// The entity is registered but has no slot in the bound store.
    #[error("Entity {0:?} has no slot in the bound transform store")]
    MissingIndex(EntityId),

    /// Reparenting would make an entity its own ancestor.
    #[error("Attaching {child:?} under {parent:?} would create a cycle")]
    CyclicAttach {
        /// The entity being reparented
        child: EntityId,
        /// The requested parent, which is the child itself or one of its descendants
        parent: EntityId,
    },

    /// The bound store is already borrowed elsewhere, e.g. by a caller still
    /// holding a read guard on it.
    #[error("The bound transform store is already borrowed")]
    StoreBusy,

    /// The id was despawned (or never allocated) by the store.
    #[error("Entity {0:?} is not alive in the transform store")]
    StaleEntity(EntityId),
}

/// Alias for `Result<T, SylvaError>`.
pub type Result<T> = std::result::Result<T, SylvaError>;
