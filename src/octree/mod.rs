//! Loose octree spatial partition

pub mod octant;
pub mod tree;

pub use octant::{Octant, OctantId};
pub use tree::Octree;
