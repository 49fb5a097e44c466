//! Octree arena: owns all octants and implements structural mutation

use crate::core::types::Vec3;
use crate::math::Aabb;
use crate::scene::object::ObjectId;

use super::octant::{Octant, OctantId};

/// Loose octree over an arena of octants.
///
/// Octants are stored in a flat `Vec` and addressed by [`OctantId`]; freed
/// slots go to a free list and are reused. Parent links are plain indices,
/// never ownership edges, so teardown is a single arena drop and upward
/// walks cannot form cycles.
///
/// The tree holds object ids only. Object bounds live with the caller
/// (the scene manager), which passes them into every structural operation.
pub struct Octree {
    octants: Vec<Octant>,
    free: Vec<OctantId>,
    root: OctantId,
    /// Loose slack factor: an octant's cull bounds are its strict bounds
    /// padded by `half_extent * looseness` per side.
    looseness: f32,
    /// Smallest allowed child half-extent, captured from the initial world
    /// bounds and max depth. Root growth does not change it, so the deepest
    /// subdivision level keeps its original resolution.
    min_child_extent: Vec3,
}

impl Octree {
    /// Create a tree with a single root octant covering `world`.
    ///
    /// `max_depth` limits how many subdivision levels are created below the
    /// initial root; objects needing deeper placement stay at the deepest
    /// existing level.
    pub fn new(world: Aabb, max_depth: u8, looseness: f32) -> Self {
        // Depths past 31 would shift out; the extent floor hits far earlier.
        let min_child_extent = world.half_extent() / (1u64 << max_depth.min(31)) as f32;
        let root_octant = Octant::new(world, world.half_extent() * looseness, None);
        Self {
            octants: vec![root_octant],
            free: Vec::new(),
            root: OctantId(0),
            looseness,
            min_child_extent,
        }
    }

    /// Root octant id. Changes when the tree grows upward.
    pub fn root(&self) -> OctantId {
        self.root
    }

    /// Get an octant by id.
    pub fn octant(&self, id: OctantId) -> &Octant {
        &self.octants[id.0 as usize]
    }

    /// Number of live octants.
    pub fn octant_count(&self) -> usize {
        self.octants.len() - self.free.len()
    }

    /// Insert an object, growing the root if its box escapes the current
    /// world bounds. Returns the octant the object now lives in.
    pub fn insert(&mut self, object: ObjectId, bounds: &Aabb) -> OctantId {
        self.grow_to_fit(bounds);
        let target = self.place(bounds);
        self.attach(object, target);
        log::trace!("homed {:?} at {:?}", object, target);
        target
    }

    /// Remove an object from the octant it lives in. Decrements ancestor
    /// counts and prunes emptied octants.
    pub fn remove(&mut self, object: ObjectId, home: OctantId) {
        self.detach(object, home);
        self.prune(home);
    }

    /// Re-home an object whose bounds changed. Returns the new owning
    /// octant; when the correct octant is unchanged this is a structural
    /// no-op.
    pub fn relocate(&mut self, object: ObjectId, home: OctantId, bounds: &Aabb) -> OctantId {
        self.grow_to_fit(bounds);
        let target = self.place(bounds);
        if target == home {
            return home;
        }
        self.attach(object, target);
        self.detach(object, home);
        self.prune(home);
        log::trace!("re-homed {:?} from {:?} to {:?}", object, home, target);
        target
    }

    /// Walk down from the root to the octant where `bounds` belongs,
    /// creating octants lazily along the way.
    ///
    /// Descends while the box fits in a child (extent at most half the
    /// current octant's) and the child would not be below the minimum
    /// extent; otherwise the box stays at the current level. Boxes bigger
    /// than the root simply fail the first fit test and stay at the root.
    fn place(&mut self, bounds: &Aabb) -> OctantId {
        let mut cur = self.root;
        loop {
            let (child_half, code, existing, parent_bounds) = {
                let oct = &self.octants[cur.0 as usize];
                if !oct.fits_in_child(bounds) {
                    return cur;
                }
                let code = oct.child_code(bounds);
                (
                    oct.bounds.half_extent() * 0.5,
                    code,
                    oct.children[code],
                    oct.bounds,
                )
            };
            if child_half.cmplt(self.min_child_extent).any() {
                return cur;
            }
            cur = match existing {
                Some(child) => child,
                None => {
                    let child_bounds = parent_bounds.child_octant(code);
                    let half_size = child_bounds.half_extent() * self.looseness;
                    let child = self.alloc(Octant::new(child_bounds, half_size, Some(cur)));
                    self.octants[cur.0 as usize].children[code] = Some(child);
                    child
                }
            };
        }
    }

    /// Double the root extents until `bounds` is contained, keeping the old
    /// root as the child octant nearest the escaping box.
    fn grow_to_fit(&mut self, bounds: &Aabb) {
        if bounds.is_null() || !bounds.is_finite() {
            return;
        }
        while !self.octant(self.root).bounds.contains_aabb(bounds) {
            let old_root = self.root;
            let old_bounds = self.octant(old_root).bounds;
            let size = old_bounds.size();
            let center = old_bounds.center();
            let c = bounds.center();

            // The old root occupies the low half on every axis the box
            // extends toward, so the new root grows in that direction.
            let code = usize::from(c.x < center.x)
                | (usize::from(c.y < center.y) << 1)
                | (usize::from(c.z < center.z) << 2);

            let min = Vec3::new(
                if code & 1 != 0 { old_bounds.min.x - size.x } else { old_bounds.min.x },
                if code & 2 != 0 { old_bounds.min.y - size.y } else { old_bounds.min.y },
                if code & 4 != 0 { old_bounds.min.z - size.z } else { old_bounds.min.z },
            );
            let new_bounds = Aabb::new(min, min + size * 2.0);
            if !new_bounds.is_finite() {
                log::warn!("octree root cannot grow further; keeping {:?}", old_bounds);
                break;
            }

            let mut new_root = Octant::new(new_bounds, new_bounds.half_extent() * self.looseness, None);
            new_root.children[code] = Some(old_root);
            new_root.subtree_object_count = self.octant(old_root).subtree_object_count;

            let new_id = self.alloc(new_root);
            self.octants[old_root.0 as usize].parent = Some(new_id);
            self.root = new_id;

            log::info!(
                "octree root grew to {:?} (old root now child {})",
                new_bounds,
                code
            );
        }
    }

    /// Append the object to the octant's list and bump ancestor counts.
    fn attach(&mut self, object: ObjectId, target: OctantId) {
        let oct = &mut self.octants[target.0 as usize];
        debug_assert!(
            !oct.objects.contains(&object),
            "{object:?} already present in {target:?}"
        );
        oct.objects.push(object);
        self.adjust_counts(target, 1);
    }

    /// Erase the object from the octant's list and drop ancestor counts.
    /// Insertion order of the remaining objects is preserved.
    fn detach(&mut self, object: ObjectId, home: OctantId) {
        let oct = &mut self.octants[home.0 as usize];
        let Some(pos) = oct.objects.iter().position(|o| *o == object) else {
            debug_assert!(false, "{object:?} not found in {home:?}");
            return;
        };
        oct.objects.remove(pos);
        self.adjust_counts(home, -1);
    }

    fn adjust_counts(&mut self, from: OctantId, delta: i32) {
        let mut cur = Some(from);
        while let Some(id) = cur {
            let oct = &mut self.octants[id.0 as usize];
            oct.subtree_object_count = oct.subtree_object_count.wrapping_add_signed(delta);
            cur = oct.parent;
        }
    }

    /// Walk up from `from`, freeing every non-root octant whose subtree no
    /// longer holds any object.
    fn prune(&mut self, from: OctantId) {
        let mut cur = from;
        while cur != self.root {
            if self.octant(cur).subtree_object_count > 0 {
                break;
            }
            let Some(parent) = self.octant(cur).parent else {
                break;
            };
            for child in self.octants[parent.0 as usize].children.iter_mut() {
                if *child == Some(cur) {
                    *child = None;
                }
            }
            self.free_subtree(cur);
            log::trace!("pruned empty octant {:?}", cur);
            cur = parent;
        }
    }

    /// Free an (empty) subtree to the free list with an explicit stack;
    /// depth never touches the call stack.
    fn free_subtree(&mut self, id: OctantId) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let oct = &mut self.octants[cur.0 as usize];
            debug_assert!(oct.objects.is_empty(), "freeing octant with objects");
            for child in oct.children.iter_mut() {
                if let Some(c) = child.take() {
                    stack.push(c);
                }
            }
            oct.objects.clear();
            oct.parent = None;
            oct.subtree_object_count = 0;
            self.free.push(cur);
        }
    }

    fn alloc(&mut self, octant: Octant) -> OctantId {
        match self.free.pop() {
            Some(id) => {
                self.octants[id.0 as usize] = octant;
                id
            }
            None => {
                let id = OctantId(self.octants.len() as u32);
                self.octants.push(octant);
                id
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_100() -> Aabb {
        Aabb::from_center_half_extent(Vec3::ZERO, Vec3::splat(100.0))
    }

    fn unit_box_at(center: Vec3) -> Aabb {
        Aabb::from_center_half_extent(center, Vec3::splat(0.5))
    }

    /// Collect every octant reachable from the root.
    fn reachable(tree: &Octree) -> Vec<OctantId> {
        let mut out = Vec::new();
        let mut stack = vec![tree.root()];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(tree.octant(id).children.iter().flatten().copied());
        }
        out
    }

    #[test]
    fn test_insert_descends_to_max_depth() {
        // Root side 200, max_depth 4: halving 200 -> 100 -> 50 -> 25 -> 12.5
        let mut tree = Octree::new(world_100(), 4, 1.0);
        let home = tree.insert(ObjectId(1), &unit_box_at(Vec3::ZERO));

        let side = tree.octant(home).bounds.size();
        assert!((side - Vec3::splat(12.5)).length() < 1e-4);
        assert_eq!(tree.octant_count(), 5); // root + one chain of 4
    }

    #[test]
    fn test_object_in_exactly_one_octant() {
        let mut tree = Octree::new(world_100(), 4, 1.0);
        let id = ObjectId(7);
        tree.insert(id, &unit_box_at(Vec3::new(30.0, -20.0, 55.0)));

        let holders: usize = reachable(&tree)
            .iter()
            .filter(|o| tree.octant(**o).objects.contains(&id))
            .count();
        assert_eq!(holders, 1);
    }

    #[test]
    fn test_oversized_object_stays_at_root() {
        let mut tree = Octree::new(world_100(), 4, 1.0);
        let big = Aabb::from_center_half_extent(Vec3::ZERO, Vec3::splat(80.0));
        let home = tree.insert(ObjectId(1), &big);

        assert_eq!(home, tree.root());
        assert_eq!(tree.octant_count(), 1);
    }

    #[test]
    fn test_insert_remove_round_trip_restores_shape() {
        let mut tree = Octree::new(world_100(), 4, 1.0);
        let before = tree.octant_count();

        let home = tree.insert(ObjectId(3), &unit_box_at(Vec3::splat(40.0)));
        assert!(tree.octant_count() > before);

        tree.remove(ObjectId(3), home);
        assert_eq!(tree.octant_count(), before);
        assert_eq!(tree.octant(tree.root()).subtree_object_count, 0);
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut tree = Octree::new(world_100(), 4, 1.0);
        let home = tree.insert(ObjectId(1), &unit_box_at(Vec3::splat(40.0)));
        tree.remove(ObjectId(1), home);
        let slots_after_prune = tree.octants.len();

        tree.insert(ObjectId(2), &unit_box_at(Vec3::splat(40.0)));
        assert_eq!(tree.octants.len(), slots_after_prune);
        assert!(tree.free.is_empty());
    }

    #[test]
    fn test_root_grows_to_contain_outside_object() {
        let mut tree = Octree::new(world_100(), 4, 1.0);
        let far = unit_box_at(Vec3::new(500.0, 0.0, 0.0));
        let home = tree.insert(ObjectId(1), &far);

        let root_bounds = tree.octant(tree.root()).bounds;
        assert!(root_bounds.contains_aabb(&far));
        // Grew toward +x only as far as needed
        assert!(root_bounds.max.x >= 500.5);
        assert!(root_bounds.min.x >= -200.0);
        // Object is actually homed somewhere under the new root
        assert!(reachable(&tree).contains(&home));
        assert_eq!(tree.octant(tree.root()).subtree_object_count, 1);
    }

    #[test]
    fn test_growth_preserves_existing_objects() {
        let mut tree = Octree::new(world_100(), 4, 1.0);
        let inner_home = tree.insert(ObjectId(1), &unit_box_at(Vec3::ZERO));
        tree.insert(ObjectId(2), &unit_box_at(Vec3::new(0.0, 900.0, 0.0)));

        assert!(reachable(&tree).contains(&inner_home));
        assert!(tree.octant(inner_home).objects.contains(&ObjectId(1)));
        assert_eq!(tree.octant(tree.root()).subtree_object_count, 2);
    }

    #[test]
    fn test_relocate_between_siblings() {
        let mut tree = Octree::new(world_100(), 3, 1.0);
        let a = tree.insert(ObjectId(1), &unit_box_at(Vec3::splat(-60.0)));
        let b = tree.relocate(ObjectId(1), a, &unit_box_at(Vec3::splat(60.0)));

        assert_ne!(a, b);
        assert!(tree.octant(b).objects.contains(&ObjectId(1)));
        // Old path was pruned; only the new chain remains
        let live = reachable(&tree);
        assert!(!live.contains(&a) || !tree.octant(a).objects.contains(&ObjectId(1)));
        assert_eq!(tree.octant(tree.root()).subtree_object_count, 1);
    }

    #[test]
    fn test_relocate_same_box_is_structural_noop() {
        let mut tree = Octree::new(world_100(), 4, 1.0);
        let bounds = unit_box_at(Vec3::splat(40.0));
        let home = tree.insert(ObjectId(1), &bounds);
        let count = tree.octant_count();

        let new_home = tree.relocate(ObjectId(1), home, &bounds);
        assert_eq!(new_home, home);
        assert_eq!(tree.octant_count(), count);
    }

    #[test]
    fn test_remove_keeps_sibling_objects() {
        let mut tree = Octree::new(world_100(), 4, 1.0);
        let home_a = tree.insert(ObjectId(1), &unit_box_at(Vec3::new(40.0, 40.0, 40.0)));
        let home_b = tree.insert(ObjectId(2), &unit_box_at(Vec3::new(41.0, 40.0, 40.0)));

        tree.remove(ObjectId(1), home_a);
        assert!(tree.octant(home_b).objects.contains(&ObjectId(2)));
        assert_eq!(tree.octant(tree.root()).subtree_object_count, 1);
    }

    #[test]
    fn test_insertion_order_preserved_within_octant() {
        let mut tree = Octree::new(world_100(), 1, 1.0);
        // All land at the root: too big for children
        let big = Aabb::from_center_half_extent(Vec3::ZERO, Vec3::splat(60.0));
        for i in 0..4 {
            tree.insert(ObjectId(i), &big);
        }
        tree.remove(ObjectId(1), tree.root());

        let objects = &tree.octant(tree.root()).objects;
        assert_eq!(objects, &vec![ObjectId(0), ObjectId(2), ObjectId(3)]);
    }
}
