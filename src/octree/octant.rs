//! A single node of the loose octree

use crate::core::types::Vec3;
use crate::math::Aabb;
use crate::scene::object::ObjectId;

/// Arena index of an octant within its [`Octree`](super::Octree).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OctantId(pub u32);

/// One node of the loose octree.
///
/// Owns up to 8 children (arena indices, keyed by low/high half per axis)
/// and the list of objects classified at exactly this subdivision level.
/// Objects live at the shallowest octant whose box fully contains them;
/// anything that fits here but not entirely inside a single child stays in
/// `objects` instead of being pushed deeper.
#[derive(Clone, Debug)]
pub struct Octant {
    /// Strict subdivision bounds.
    pub bounds: Aabb,
    /// Loose slack vector; cull tests use `bounds` padded by this amount.
    pub half_size: Vec3,
    /// Non-owning back-reference for upward walks. `None` only for the root.
    pub parent: Option<OctantId>,
    /// Child octants indexed by child code (bit 0=x, bit 1=y, bit 2=z,
    /// set = high half).
    pub children: [Option<OctantId>; 8],
    /// Objects classified at exactly this level, in insertion order.
    pub objects: Vec<ObjectId>,
    /// Objects here plus in all descendants; zero means the subtree is
    /// prunable.
    pub subtree_object_count: u32,
}

impl Octant {
    /// Create an octant covering `bounds` with the given loose slack.
    pub fn new(bounds: Aabb, half_size: Vec3, parent: Option<OctantId>) -> Self {
        Self {
            bounds,
            half_size,
            parent,
            children: [None; 8],
            objects: Vec::new(),
            subtree_object_count: 0,
        }
    }

    /// True iff `b` is small enough to live in a child octant: every axis
    /// extent of `b` must be at most half this octant's extent. Equality
    /// passes, so exactly-half-sized boxes are eligible to descend.
    pub fn fits_in_child(&self, b: &Aabb) -> bool {
        if b.is_null() {
            return false;
        }
        b.size().cmple(self.bounds.half_extent()).all()
    }

    /// Which of the 8 children `b` belongs to, assuming [`fits_in_child`]
    /// already passed. Per axis, a box center at or above this octant's
    /// center maps to the high half.
    ///
    /// [`fits_in_child`]: Octant::fits_in_child
    pub fn child_code(&self, b: &Aabb) -> usize {
        let center = self.bounds.center();
        let c = b.center();
        usize::from(c.x >= center.x)
            | (usize::from(c.y >= center.y) << 1)
            | (usize::from(c.z >= center.z) << 2)
    }

    /// Loose bounds used for frustum tests: the strict box grown by
    /// `half_size` in both directions, absorbing objects that straddle the
    /// strict boundary without forcing them to re-home.
    pub fn cull_bounds(&self) -> Aabb {
        self.bounds.grown(self.half_size)
    }
}
