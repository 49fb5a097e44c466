//! Movable scene objects held by the octree

use crate::math::Aabb;
use crate::octree::OctantId;

/// Unique identifier for a scene object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u64);

/// What kind of payload an object carries.
///
/// The set of things the tree can hold is closed; the external render queue
/// switches on the kind instead of dispatching through a renderable trait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    /// Renderable geometry; the render queue groups these by material.
    Geometry { material: u32 },
    /// Light source influencing shading but not drawn itself.
    Light,
    /// Invisible spatial anchor (trigger volumes, probes).
    Marker,
}

/// A movable object bridging a renderable entity to its owning octant.
///
/// The object only records *which* octant currently holds it; deciding
/// which octant it *should* be in belongs to the scene manager, so leaf
/// objects never need a reference back to the tree.
#[derive(Clone, Debug)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub kind: ObjectKind,
    /// World-space bounds. May be null, in which case the object is never
    /// emitted by visibility walks and is not re-homed.
    pub bounds: Aabb,
    /// Per-object visibility toggle; hidden objects stay homed but are
    /// skipped during walks.
    pub visible: bool,
    octant: Option<OctantId>,
}

impl SceneObject {
    /// Create a new, not-yet-homed object.
    pub fn new(id: ObjectId, name: impl Into<String>, kind: ObjectKind, bounds: Aabb) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            bounds,
            visible: true,
            octant: None,
        }
    }

    /// The octant currently holding this object, if homed.
    pub fn octant(&self) -> Option<OctantId> {
        self.octant
    }

    /// Record the owning octant. Pure bookkeeping, called only by the scene
    /// manager; single writer keeps the tree and the back-reference in sync.
    pub(crate) fn set_octant(&mut self, octant: Option<OctantId>) {
        self.octant = octant;
    }
}
