//! Scene manager configuration

use glam::Vec3;

use crate::math::Aabb;

/// Configuration for a scene manager.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneConfig {
    /// Initial world bounds of the octree root. The tree grows past these
    /// automatically when objects escape them.
    pub world_bounds: Aabb,
    /// How many subdivision levels may be created below the initial root.
    pub max_depth: u8,
    /// Loose-octree slack factor: each octant's cull bounds are its strict
    /// bounds padded per side by `half_extent * looseness`. 1.0 doubles the
    /// box (classic loose octree); 0.0 disables slack. The slack is fixed
    /// per octant at creation and never re-tightened.
    pub looseness: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            world_bounds: Aabb::from_center_half_extent(Vec3::ZERO, Vec3::splat(512.0)),
            max_depth: 8,
            looseness: 1.0,
        }
    }
}
