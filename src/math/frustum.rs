//! View frustum with boolean and three-way AABB tests

use crate::core::types::{Mat4, Vec3, Vec4};

use super::aabb::Aabb;

/// A plane defined by normal and distance from origin
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    pub fn new(normal: Vec3, d: f32) -> Self {
        Self { normal, d }
    }

    /// Signed distance from point to plane (positive = in front)
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }
}

/// Three-way classification of a bounding volume against the frustum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Wholly outside: the volume and everything inside it is invisible.
    #[default]
    None,
    /// Straddling at least one plane: contents need individual tests.
    Partial,
    /// Wholly inside: contents are trivially visible, no further tests.
    Full,
}

/// 6-plane frustum extracted from a view-projection matrix
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6], // left, right, bottom, top, near, far
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    /// Uses the Gribb/Hartmann method.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        // Extract rows from the VP matrix (column-major storage)
        let rows = [
            Vec4::new(vp.col(0).x, vp.col(1).x, vp.col(2).x, vp.col(3).x),
            Vec4::new(vp.col(0).y, vp.col(1).y, vp.col(2).y, vp.col(3).y),
            Vec4::new(vp.col(0).z, vp.col(1).z, vp.col(2).z, vp.col(3).z),
            Vec4::new(vp.col(0).w, vp.col(1).w, vp.col(2).w, vp.col(3).w),
        ];

        let mut planes = [Plane { normal: Vec3::ZERO, d: 0.0 }; 6];

        let raw = [
            rows[3] + rows[0], // left
            rows[3] - rows[0], // right
            rows[3] + rows[1], // bottom
            rows[3] - rows[1], // top
            rows[3] + rows[2], // near
            rows[3] - rows[2], // far
        ];

        for (i, r) in raw.iter().enumerate() {
            let len = Vec3::new(r.x, r.y, r.z).length();
            if len > 0.0 {
                planes[i] = Plane {
                    normal: Vec3::new(r.x, r.y, r.z) / len,
                    d: r.w / len,
                };
            }
        }

        Self { planes }
    }

    /// Check if point is inside frustum
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(point) >= 0.0)
    }

    /// Test if an AABB is at least partially inside the frustum.
    ///
    /// Conservative p-vertex test: for each plane, checks the corner most
    /// aligned with the plane normal; if that corner is behind the plane the
    /// box is fully outside.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        if aabb.is_null() {
            return false;
        }
        for plane in &self.planes {
            let p = Self::positive_vertex(plane, aabb);
            if plane.distance_to_point(p) < 0.0 {
                return false;
            }
        }
        true
    }

    /// Classify an AABB against the frustum as fully outside, straddling,
    /// or fully inside.
    ///
    /// Uses the p-vertex for the outside test and the opposite n-vertex to
    /// detect straddling: a box is fully inside only when the n-vertex of
    /// every plane is in front of it. Null boxes classify as `None`.
    pub fn classify_aabb(&self, aabb: &Aabb) -> Visibility {
        if aabb.is_null() {
            return Visibility::None;
        }
        let mut all_inside = true;
        for plane in &self.planes {
            let p = Self::positive_vertex(plane, aabb);
            if plane.distance_to_point(p) < 0.0 {
                return Visibility::None;
            }
            let n = Self::negative_vertex(plane, aabb);
            if plane.distance_to_point(n) < 0.0 {
                all_inside = false;
            }
        }
        if all_inside {
            Visibility::Full
        } else {
            Visibility::Partial
        }
    }

    /// Corner of `aabb` most in the direction of the plane normal.
    fn positive_vertex(plane: &Plane, aabb: &Aabb) -> Vec3 {
        Vec3::new(
            if plane.normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
            if plane.normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
            if plane.normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
        )
    }

    /// Corner of `aabb` most against the direction of the plane normal.
    fn negative_vertex(plane: &Plane, aabb: &Aabb) -> Vec3 {
        Vec3::new(
            if plane.normal.x >= 0.0 { aabb.min.x } else { aabb.max.x },
            if plane.normal.y >= 0.0 { aabb.min.y } else { aabb.max.y },
            if plane.normal.z >= 0.0 { aabb.min.z } else { aabb.max.z },
        )
    }
}
