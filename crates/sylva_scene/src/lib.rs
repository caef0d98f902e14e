//! Sylva Scene
//!
//! Hierarchical transform graph over a structure-of-arrays transform store:
//! - [`SceneNode`]: per-entity topology (parent, ordered children, cached slot)
//! - [`SceneNodeRegistry`]: the node arena and root list
//! - [`SceneGraph`]: reparenting with world-pose preservation, dirty
//!   propagation, lazy and per-frame world matrix resolution
//! - [`SceneContext`]: an explicit owner of one store and the graph bound to it

pub mod context;
pub mod graph;
pub mod node;
pub mod registry;
pub mod settings;
pub mod traversal;

pub use context::SceneContext;
pub use graph::SceneGraph;
pub use node::SceneNode;
pub use registry::{Ancestors, Descendants, SceneNodeRegistry};
pub use settings::SceneGraphSettings;
