//! Axis-aligned bounding box with an explicit null (empty) state

use crate::core::types::Vec3;

/// Axis-aligned bounding box defined by min and max corners.
///
/// A box is either well-formed (`min <= max` componentwise) or null.
/// Null boxes contain nothing, intersect nothing, and are skipped by the
/// octree for homing and visibility emission.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::NULL
    }
}

impl Aabb {
    /// The null (empty) box.
    pub const NULL: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Create AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create AABB from center and half-extents
    pub fn from_center_half_extent(center: Vec3, half_extent: Vec3) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// True for null boxes and boxes with NaN corners.
    pub fn is_null(&self) -> bool {
        !(self.min.cmple(self.max).all())
    }

    /// True iff both corners are finite and the box is not null.
    pub fn is_finite(&self) -> bool {
        !self.is_null() && self.min.is_finite() && self.max.is_finite()
    }

    /// Get center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Get half-extents
    pub fn half_extent(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Check if point is inside AABB
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Check if `other` lies entirely inside this box. Null boxes contain
    /// nothing and are contained by nothing.
    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// Check if two AABBs intersect. Null boxes intersect nothing.
    pub fn intersects(&self, other: &Aabb) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    /// Return merged AABB containing both
    pub fn merged(&self, other: &Aabb) -> Aabb {
        if self.is_null() {
            return *other;
        }
        if other.is_null() {
            return *self;
        }
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Return this box expanded by `pad` in both directions per axis.
    pub fn grown(&self, pad: Vec3) -> Aabb {
        if self.is_null() {
            return *self;
        }
        Aabb {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// Get child octant AABB for octree subdivision
    /// index: 0-7 representing xyz octant (bit 0=x, bit 1=y, bit 2=z)
    pub fn child_octant(&self, index: usize) -> Aabb {
        let center = self.center();
        let half = self.half_extent() * 0.5;

        let offset = Vec3::new(
            if index & 1 != 0 { half.x } else { -half.x },
            if index & 2 != 0 { half.y } else { -half.y },
            if index & 4 != 0 { half.z } else { -half.z },
        );

        Aabb::from_center_half_extent(center + offset, half)
    }
}
