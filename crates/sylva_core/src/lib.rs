//! Sylva Core
//!
//! Foundational types shared by the Sylva crates:
//!
//! - [`EntityId`]: stable handle naming an entity
//! - [`TransformStore`]: the contract a structure-of-arrays transform store fulfils
//! - [`SoaTransformStore`]: the default in-memory implementation of that contract
//! - [`StoreSettings`] / [`RotationOrder`]: store configuration
//! - [`SylvaError`] / [`Result`]: the shared error type

pub mod entity;
pub mod errors;
pub mod math;
pub mod settings;
pub mod soa_store;
pub mod store;

pub use entity::EntityId;
pub use errors::{Result, SylvaError};
pub use math::{MAT4_SLOT_LEN, Mat4Slot};
pub use settings::{RotationOrder, StoreSettings};
pub use soa_store::SoaTransformStore;
pub use store::TransformStore;
