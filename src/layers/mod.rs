//! Layer tree: leaves, groups and tile layers.

pub mod group;
pub mod layer;
pub mod node;
pub mod tile;
