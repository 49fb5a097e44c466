//! Octree scene manager: object lifecycle and per-frame visibility walks

use std::collections::HashMap;

use rayon::prelude::*;

use crate::core::camera::Camera;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::math::{Aabb, Frustum, Visibility};
use crate::octree::{Octant, OctantId, Octree};

use super::config::SceneConfig;
use super::object::{ObjectId, ObjectKind, SceneObject};

/// Instrumentation counters for one visibility walk.
#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct CullStats {
    /// Octant-level frustum classifications performed. Fully-inside subtrees
    /// inherit their parent's result and do not count.
    pub octants_tested: u32,
    /// Per-object frustum tests performed (only in partially visible
    /// octants).
    pub objects_tested: u32,
    /// Objects emitted to the output list.
    pub objects_emitted: u32,
}

/// Owns the octree and the objects inside it.
///
/// All structural mutation (insert, remove, update) goes through `&mut self`
/// and is therefore serialized; visibility walks take `&self` and may run
/// in parallel over sibling subtrees.
pub struct SceneManager {
    config: SceneConfig,
    tree: Octree,
    objects: HashMap<ObjectId, SceneObject>,
    next_id: u64,
}

impl SceneManager {
    /// Create a scene manager from configuration.
    pub fn new(config: SceneConfig) -> Result<Self> {
        if !config.world_bounds.is_finite() {
            return Err(Error::InvalidWorldBounds(format!("{:?}", config.world_bounds)));
        }
        if config.max_depth == 0 {
            return Err(Error::InvalidDepth(config.max_depth));
        }
        if !config.looseness.is_finite() || config.looseness < 0.0 {
            return Err(Error::InvalidLooseness(config.looseness));
        }

        let tree = Octree::new(config.world_bounds, config.max_depth, config.looseness);
        log::debug!(
            "scene manager created: world={:?}, max_depth={}, looseness={}",
            config.world_bounds,
            config.max_depth,
            config.looseness
        );

        Ok(Self {
            config,
            tree,
            objects: HashMap::new(),
            next_id: 0,
        })
    }

    /// Add an object to the scene. Objects with null bounds stay unhomed
    /// until their first real bounding-box update.
    pub fn insert(&mut self, name: impl Into<String>, kind: ObjectKind, bounds: Aabb) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        let mut obj = SceneObject::new(id, name, kind, bounds);
        if !bounds.is_null() {
            let home = self.tree.insert(id, &bounds);
            obj.set_octant(Some(home));
        }
        self.objects.insert(id, obj);
        id
    }

    /// Remove an object. Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: ObjectId) {
        let Some(obj) = self.objects.remove(&id) else {
            return;
        };
        if let Some(home) = obj.octant() {
            self.tree.remove(id, home);
        }
    }

    /// Update an object's world bounds, re-homing it if it no longer fits
    /// its current octant or now fits deeper.
    ///
    /// An unchanged box never restructures the tree. Null bounds are stored
    /// (the object stops being emitted) but do not disturb its homing.
    pub fn update(&mut self, id: ObjectId, bounds: Aabb) {
        let Some(obj) = self.objects.get_mut(&id) else {
            return;
        };
        if obj.bounds == bounds {
            return;
        }
        obj.bounds = bounds;
        if bounds.is_null() {
            return;
        }

        let new_home = match obj.octant() {
            Some(home) => self.tree.relocate(id, home, &bounds),
            None => self.tree.insert(id, &bounds),
        };
        obj.set_octant(Some(new_home));
    }

    /// Toggle an object's visibility. Hidden objects keep their octant but
    /// are skipped by visibility walks.
    pub fn set_visible(&mut self, id: ObjectId, visible: bool) {
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.visible = visible;
        }
    }

    /// Collect ids of all objects visible to the camera, in tree order
    /// (insertion order within each octant). Sorting by material or depth
    /// is the render queue's job.
    pub fn find_visible_objects(&self, camera: &Camera) -> Vec<ObjectId> {
        self.find_visible_objects_with_stats(&camera.frustum()).0
    }

    /// Visibility walk against an explicit frustum, returning instrumentation
    /// counters alongside the visible ids.
    pub fn find_visible_objects_with_stats(&self, frustum: &Frustum) -> (Vec<ObjectId>, CullStats) {
        let mut out = Vec::new();
        let mut stats = CullStats::default();
        self.walk(self.tree.root(), frustum, Visibility::Partial, &mut out, &mut stats);
        (out, stats)
    }

    /// Parallel variant of [`find_visible_objects`]: the root's child
    /// subtrees are walked on the rayon pool. Safe because the walk is
    /// read-only and sibling subtrees share no state; output order matches
    /// the sequential walk.
    ///
    /// [`find_visible_objects`]: SceneManager::find_visible_objects
    pub fn par_find_visible_objects(&self, camera: &Camera) -> Vec<ObjectId> {
        let frustum = camera.frustum();
        let root = self.tree.octant(self.tree.root());

        let vis = frustum.classify_aabb(&root.cull_bounds());
        if vis == Visibility::None {
            return Vec::new();
        }

        let mut out = Vec::new();
        let mut stats = CullStats::default();
        self.emit_octant_objects(root, vis, &frustum, &mut out, &mut stats);

        let per_child: Vec<Vec<ObjectId>> = root
            .children
            .par_iter()
            .map(|child| {
                let mut local = Vec::new();
                let mut local_stats = CullStats::default();
                if let Some(child) = child {
                    self.walk(*child, &frustum, vis, &mut local, &mut local_stats);
                }
                local
            })
            .collect();

        for mut ids in per_child {
            out.append(&mut ids);
        }
        out
    }

    /// Recursive three-way walk. A subtree classified fully inside inherits
    /// that state downward and skips all further plane tests; a fully
    /// outside subtree is pruned whole.
    fn walk(
        &self,
        id: OctantId,
        frustum: &Frustum,
        inherited: Visibility,
        out: &mut Vec<ObjectId>,
        stats: &mut CullStats,
    ) {
        let oct = self.tree.octant(id);
        let vis = if inherited == Visibility::Full {
            Visibility::Full
        } else {
            stats.octants_tested += 1;
            frustum.classify_aabb(&oct.cull_bounds())
        };
        if vis == Visibility::None {
            return;
        }

        self.emit_octant_objects(oct, vis, frustum, out, stats);

        for child in oct.children.iter().flatten() {
            self.walk(*child, frustum, vis, out, stats);
        }
    }

    /// Emit the objects held at one octant. Fully visible octants emit
    /// without per-object tests; partially visible ones test each object's
    /// own bounds.
    fn emit_octant_objects(
        &self,
        oct: &Octant,
        vis: Visibility,
        frustum: &Frustum,
        out: &mut Vec<ObjectId>,
        stats: &mut CullStats,
    ) {
        for &id in &oct.objects {
            let Some(obj) = self.objects.get(&id) else {
                debug_assert!(false, "octree holds unknown {id:?}");
                continue;
            };
            if !obj.visible || obj.bounds.is_null() {
                continue;
            }
            match vis {
                Visibility::Full => {
                    out.push(id);
                    stats.objects_emitted += 1;
                }
                _ => {
                    stats.objects_tested += 1;
                    if frustum.intersects_aabb(&obj.bounds) {
                        out.push(id);
                        stats.objects_emitted += 1;
                    }
                }
            }
        }
    }

    /// Look up an object by id.
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Number of objects in the scene.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// The underlying spatial partition.
    pub fn octree(&self) -> &Octree {
        &self.tree
    }

    /// The configuration this manager was built with.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }
}
