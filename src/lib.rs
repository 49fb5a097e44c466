//! Octoscene - loose-octree scene partitioning and visibility culling
//!
//! Organizes movable scene objects into a loose octree and answers the
//! per-frame question "which objects can this camera see?" without testing
//! every object against the frustum. Render-queue sorting, materials, and
//! GPU submission are external concerns; the output here is an ordered list
//! of visible object ids.

pub mod core;
pub mod math;
pub mod octree;
pub mod scene;
