//! Domain layer: project records, hierarchy nodes and the hierarchy builder
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod entities;
pub mod error;
pub mod tree;

pub use builder::{build_forest, HierarchyBuilder, OrphanPolicy};
pub use entities::*;
pub use error::DomainError;
pub use tree::{find, forest_size, to_tree, walk, Walk};
