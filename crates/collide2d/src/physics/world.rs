//! Body arena and pairwise collision resolution
//!
//! [`CollisionWorld`] owns every [`Body`] in a slotmap arena and
//! resolves contacts between them on request. Each request names a
//! caller, a target or a group of targets, and a policy saying how
//! much response to apply, from merely reporting the overlap up to a
//! two-body momentum exchange.
//!
//! Detection replays the step between each body's previous and current
//! position in sub-steps, so a fast mover cannot pass through a thin
//! obstacle (see [`super::collision`]). Group queries go through the
//! quadtree when the configuration enables it and fall back to testing
//! every member otherwise.

use std::collections::HashSet;

use slotmap::SlotMap;

use super::body::{Body, BodyKey, TouchFlags};
use super::collision::swept::{motion_box, substep_count};
use super::collision::BoundingBox;
use super::response::apply_velocity_response;
use crate::config::CollisionConfig;
use crate::foundation::math::Vec2;
use crate::spatial::QuadTree;

/// Callback invoked for each resolved pair, caller first.
pub type ContactHandler<'a> = &'a mut dyn FnMut(&mut Body, &mut Body);

/// How much response a resolved contact applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponsePolicy {
    /// Report the contact and set touch flags; no separation and no
    /// velocity change
    Overlap,
    /// Push the target out of the caller
    Displace,
    /// Push the caller out and cancel its approach speed, as against
    /// level geometry
    Collide,
    /// Push the caller out and exchange momentum with the target
    Bounce,
    /// Push the caller out and reflect it off a target that keeps its
    /// own motion
    BounceOff,
}

/// Arena of collision bodies plus the optional spatial index over them.
pub struct CollisionWorld {
    bodies: SlotMap<BodyKey, Body>,
    index: Option<QuadTree>,
    config: CollisionConfig,
    index_dirty: bool,
}

impl CollisionWorld {
    /// Create an empty world.
    ///
    /// The quadtree is only built when the configuration asks for it;
    /// without one, group queries test every member.
    pub fn new(config: CollisionConfig) -> Self {
        let index = config.use_spatial_index.then(|| {
            QuadTree::new(
                BoundingBox::from_min_max(Vec2::zeros(), Vec2::zeros()),
                config.index,
            )
        });
        Self {
            bodies: SlotMap::with_key(),
            index,
            config,
            index_dirty: true,
        }
    }

    /// Add a body and return its key.
    pub fn insert_body(&mut self, body: Body) -> BodyKey {
        self.index_dirty = true;
        self.bodies.insert(body)
    }

    /// Remove a body, returning it if it was present.
    pub fn remove_body(&mut self, key: BodyKey) -> Option<Body> {
        let body = self.bodies.remove(key)?;
        if let Some(tree) = self.index.as_mut() {
            // Removal routes by the current bounds; a body that moved
            // since the last rebuild may be filed elsewhere
            let removed = body
                .bounding_box()
                .is_some_and(|bounds| tree.remove(key, &bounds));
            if !removed {
                self.index_dirty = true;
            }
        }
        Some(body)
    }

    /// Shared access to a body.
    pub fn body(&self, key: BodyKey) -> Option<&Body> {
        self.bodies.get(key)
    }

    /// Mutable access to a body.
    ///
    /// Any mutation may move the body, so the spatial index is rebuilt
    /// before the next group query.
    pub fn body_mut(&mut self, key: BodyKey) -> Option<&mut Body> {
        self.index_dirty = true;
        self.bodies.get_mut(key)
    }

    /// Whether `key` refers to a live slot.
    pub fn contains(&self, key: BodyKey) -> bool {
        self.bodies.contains_key(key)
    }

    /// Number of bodies, destroyed but not yet swept ones included.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the world holds no bodies.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Iterate over the keys of all bodies.
    pub fn keys(&self) -> impl Iterator<Item = BodyKey> + '_ {
        self.bodies.keys()
    }

    /// Iterate over all bodies with their keys.
    pub fn iter(&self) -> impl Iterator<Item = (BodyKey, &Body)> {
        self.bodies.iter()
    }

    /// The configuration the world was built with.
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// The spatial index, when one is configured.
    pub fn index(&self) -> Option<&QuadTree> {
        self.index.as_ref()
    }

    /// Start a new step: sweep out destroyed bodies, then snapshot
    /// every survivor's position and clear its touch flags.
    ///
    /// The snapshot is what swept detection replays, so call this
    /// first, then integrate positions, then resolve.
    pub fn begin_step(&mut self) {
        let destroyed: Vec<BodyKey> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.is_destroyed())
            .map(|(key, _)| key)
            .collect();
        for key in destroyed {
            self.remove_body(key);
        }
        for body in self.bodies.values_mut() {
            body.previous_position = body.position;
            body.touching = TouchFlags::empty();
        }
        self.index_dirty = true;
    }

    /// Rebuild the spatial index from current body positions.
    ///
    /// Group queries trigger this on demand after anything moved, but
    /// it is public so callers can pick the rebuild point themselves.
    pub fn update_index(&mut self) {
        for body in self.bodies.values_mut() {
            body.refresh_shape();
        }
        self.index_dirty = false;
        let Some(tree) = self.index.as_mut() else {
            return;
        };
        tree.update_bounds(self.bodies.values().map(|body| body.position));
        tree.clear();
        let mut indexed = 0;
        for (key, body) in &self.bodies {
            if let Some(bounds) = body.bounding_box() {
                tree.insert(key, bounds);
                indexed += 1;
            }
        }
        log::debug!(
            "Spatial index rebuilt with {} of {} bodies",
            indexed,
            self.bodies.len()
        );
    }

    /// Test a pair and report the contact without any response.
    pub fn overlaps(&mut self, caller: BodyKey, target: BodyKey) -> bool {
        self.resolve_pair(caller, target, ResponsePolicy::Overlap)
            .is_some()
    }

    /// Push `target` out of `caller` on contact.
    pub fn displace(
        &mut self,
        caller: BodyKey,
        target: BodyKey,
        handler: Option<ContactHandler<'_>>,
    ) -> bool {
        self.resolve_with(caller, target, ResponsePolicy::Displace, handler)
    }

    /// Push `caller` out of `target` and stop its approach.
    pub fn collide(
        &mut self,
        caller: BodyKey,
        target: BodyKey,
        handler: Option<ContactHandler<'_>>,
    ) -> bool {
        self.resolve_with(caller, target, ResponsePolicy::Collide, handler)
    }

    /// Push `caller` out of `target` and exchange momentum.
    pub fn bounce(
        &mut self,
        caller: BodyKey,
        target: BodyKey,
        handler: Option<ContactHandler<'_>>,
    ) -> bool {
        self.resolve_with(caller, target, ResponsePolicy::Bounce, handler)
    }

    /// Push `caller` out of `target` and reflect it while the target
    /// keeps its own motion.
    pub fn bounce_off(
        &mut self,
        caller: BodyKey,
        target: BodyKey,
        handler: Option<ContactHandler<'_>>,
    ) -> bool {
        self.resolve_with(caller, target, ResponsePolicy::BounceOff, handler)
    }

    /// Test `caller` against every member of `group`, reporting only.
    pub fn overlaps_group(&mut self, caller: BodyKey, group: &[BodyKey]) -> bool {
        self.resolve_group(caller, group, ResponsePolicy::Overlap, None)
    }

    /// Push each colliding group member out of `caller`.
    pub fn displace_group(
        &mut self,
        caller: BodyKey,
        group: &[BodyKey],
        handler: Option<ContactHandler<'_>>,
    ) -> bool {
        self.resolve_group(caller, group, ResponsePolicy::Displace, handler)
    }

    /// Resolve `caller` against the group as against level geometry.
    pub fn collide_group(
        &mut self,
        caller: BodyKey,
        group: &[BodyKey],
        handler: Option<ContactHandler<'_>>,
    ) -> bool {
        self.resolve_group(caller, group, ResponsePolicy::Collide, handler)
    }

    /// Bounce `caller` off each colliding group member with a full
    /// momentum exchange.
    pub fn bounce_group(
        &mut self,
        caller: BodyKey,
        group: &[BodyKey],
        handler: Option<ContactHandler<'_>>,
    ) -> bool {
        self.resolve_group(caller, group, ResponsePolicy::Bounce, handler)
    }

    /// Bounce `caller` off each colliding group member while they keep
    /// their own motion.
    pub fn bounce_off_group(
        &mut self,
        caller: BodyKey,
        group: &[BodyKey],
        handler: Option<ContactHandler<'_>>,
    ) -> bool {
        self.resolve_group(caller, group, ResponsePolicy::BounceOff, handler)
    }

    fn resolve_with(
        &mut self,
        caller: BodyKey,
        target: BodyKey,
        policy: ResponsePolicy,
        mut handler: Option<ContactHandler<'_>>,
    ) -> bool {
        if self.resolve_pair(caller, target, policy).is_none() {
            return false;
        }
        self.notify(caller, target, &mut handler);
        true
    }

    fn resolve_group(
        &mut self,
        caller: BodyKey,
        group: &[BodyKey],
        policy: ResponsePolicy,
        mut handler: Option<ContactHandler<'_>>,
    ) -> bool {
        let candidates = self.group_candidates(caller, group);
        let mut any = false;
        for target in candidates {
            if self.resolve_pair(caller, target, policy).is_some() {
                any = true;
                self.notify(caller, target, &mut handler);
            }
        }
        any
    }

    /// Candidate group members for `caller`, narrowed by the spatial
    /// index when one is configured. The index returns a superset;
    /// pair resolution rejects the false positives.
    fn group_candidates(&mut self, caller: BodyKey, group: &[BodyKey]) -> Vec<BodyKey> {
        if self.index.is_none() {
            return group.to_vec();
        }
        if self.index_dirty {
            self.update_index();
        }
        let Some(body) = self.bodies.get_mut(caller) else {
            return Vec::new();
        };
        if !body.refresh_shape() {
            return Vec::new();
        }
        let Some(bounds) = body.bounding_box() else {
            return Vec::new();
        };
        let members: HashSet<BodyKey> = group.iter().copied().collect();
        match self.index.as_ref() {
            Some(tree) => tree.retrieve_from_group(&bounds, &members),
            None => group.to_vec(),
        }
    }

    /// Invoke the contact handler for a freshly resolved pair.
    fn notify(
        &mut self,
        caller: BodyKey,
        target: BodyKey,
        handler: &mut Option<ContactHandler<'_>>,
    ) {
        let Some(handler) = handler.as_mut() else {
            return;
        };
        if let Some([a, b]) = self.bodies.get_disjoint_mut([caller, target]) {
            if !a.is_destroyed() && !b.is_destroyed() {
                handler(a, b);
            }
        }
    }

    fn resolve_pair(
        &mut self,
        caller: BodyKey,
        target: BodyKey,
        policy: ResponsePolicy,
    ) -> Option<Vec2> {
        if caller == target {
            return None;
        }
        let [a, b] = self.bodies.get_disjoint_mut([caller, target])?;
        if a.is_destroyed() || b.is_destroyed() {
            return None;
        }
        if !a.refresh_shape() || !b.refresh_shape() {
            return None;
        }

        let mtv = swept_pair_mtv(a, b, &self.config);
        if mtv == Vec2::zeros() {
            return None;
        }
        // A hit can leave the pair at mid-step contact positions
        self.index_dirty = true;
        update_touch_flags(a, b, mtv);

        match policy {
            ResponsePolicy::Overlap => {}
            ResponsePolicy::Displace => {
                if !b.immovable {
                    b.position -= mtv;
                    b.refresh_shape();
                }
            }
            ResponsePolicy::Collide => {
                separate_caller(a, mtv);
                apply_velocity_response(a, b, mtv.normalize(), true, true);
            }
            ResponsePolicy::Bounce => {
                separate_caller(a, mtv);
                apply_velocity_response(a, b, mtv.normalize(), false, false);
            }
            ResponsePolicy::BounceOff => {
                separate_caller(a, mtv);
                apply_velocity_response(a, b, mtv.normalize(), true, false);
            }
        }
        Some(mtv)
    }
}

/// Minimum translation moving `a` out of `b`, replaying the step when
/// either body moved.
///
/// On a hit the pair is left at the positions where contact was found,
/// except immovable bodies which complete their step. Without a hit
/// both bodies end at their final positions and zero is returned.
fn swept_pair_mtv(a: &mut Body, b: &mut Body, config: &CollisionConfig) -> Vec2 {
    let da = a.position - a.previous_position;
    let db = b.position - b.previous_position;

    let (Some(shape_a), Some(shape_b)) = (a.shape(), b.shape()) else {
        return Vec2::zeros();
    };

    let cover_a = motion_box(shape_a, da, da);
    let cover_b = motion_box(shape_b, db, db);
    if cover_a.is_none() && cover_b.is_none() {
        return shape_a.collide(shape_b);
    }
    if !cover_a
        .as_ref()
        .unwrap_or(shape_a)
        .overlaps(cover_b.as_ref().unwrap_or(shape_b))
    {
        return Vec2::zeros();
    }

    let min_radius = shape_a.min_radius().min(shape_b.min_radius());
    let steps = substep_count(min_radius, (da - db).norm(), config);
    let final_a = a.position;
    let final_b = b.position;

    for i in 1..=steps {
        if i == steps {
            // Land exactly on the stored endpoints rather than on
            // previous + delta, which can drift by a few ulps
            a.position = final_a;
            b.position = final_b;
        } else {
            let t = f64::from(i) / f64::from(steps);
            a.position = a.previous_position + da * t;
            b.position = b.previous_position + db * t;
        }
        a.refresh_shape();
        b.refresh_shape();

        let mtv = match (a.shape(), b.shape()) {
            (Some(sa), Some(sb)) => sa.collide(sb),
            _ => Vec2::zeros(),
        };
        if mtv != Vec2::zeros() {
            if i < steps {
                log::trace!("Contact at sub-step {} of {}", i, steps);
            }
            if a.immovable {
                a.position = final_a;
                a.refresh_shape();
            }
            if b.immovable {
                b.position = final_b;
                b.refresh_shape();
            }
            return mtv;
        }
    }
    Vec2::zeros()
}

/// Push the caller out along the separation vector unless it is
/// immovable.
fn separate_caller(body: &mut Body, mtv: Vec2) {
    if !body.immovable {
        body.position += mtv;
        body.refresh_shape();
    }
}

/// Record which side of each body touched, from the caller's
/// separation vector. Axes follow screen convention with y growing
/// downward, so a positive y push means the caller was hit from above.
fn update_touch_flags(a: &mut Body, b: &mut Body, mtv: Vec2) {
    if mtv.x > 0.0 {
        a.touching |= TouchFlags::LEFT;
        b.touching |= TouchFlags::RIGHT;
    } else if mtv.x < 0.0 {
        a.touching |= TouchFlags::RIGHT;
        b.touching |= TouchFlags::LEFT;
    }
    if mtv.y > 0.0 {
        a.touching |= TouchFlags::TOP;
        b.touching |= TouchFlags::BOTTOM;
    } else if mtv.y < 0.0 {
        a.touching |= TouchFlags::BOTTOM;
        b.touching |= TouchFlags::TOP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::ShapeParams;
    use approx::assert_relative_eq;

    fn indexed_world() -> CollisionWorld {
        CollisionWorld::new(CollisionConfig::default())
    }

    fn brute_world() -> CollisionWorld {
        CollisionWorld::new(CollisionConfig {
            use_spatial_index: false,
            ..CollisionConfig::default()
        })
    }

    fn circle_body(center: Vec2, radius: f64) -> Body {
        Body::new(center)
            .with_shape(ShapeParams::Circle {
                offset: Vec2::zeros(),
                radius: Some(radius),
            })
            .unwrap()
    }

    fn box_body(center: Vec2, width: f64, height: f64) -> Body {
        Body::new(center)
            .with_shape(ShapeParams::AxisAlignedBox {
                offset: Vec2::zeros(),
                size: Some(Vec2::new(width, height)),
            })
            .unwrap()
    }

    #[test]
    fn test_overlap_reports_without_moving_anything() {
        let mut world = indexed_world();
        let a = world.insert_body(circle_body(Vec2::zeros(), 5.0));
        let b = world.insert_body(circle_body(Vec2::new(8.0, 0.0), 4.0));

        assert!(world.overlaps(a, b));

        assert_eq!(world.body(a).unwrap().position, Vec2::zeros());
        assert_eq!(world.body(b).unwrap().position, Vec2::new(8.0, 0.0));
        assert!(world.body(a).unwrap().touching.contains(TouchFlags::RIGHT));
        assert!(world.body(b).unwrap().touching.contains(TouchFlags::LEFT));
    }

    #[test]
    fn test_displace_pushes_the_target_out() {
        let mut world = indexed_world();
        let a = world.insert_body(circle_body(Vec2::zeros(), 5.0));
        let b = world.insert_body(circle_body(Vec2::new(8.0, 0.0), 4.0));

        assert!(world.displace(a, b, None));

        // Radii sum to 9, so the target ends up flush against the caller
        assert_eq!(world.body(a).unwrap().position, Vec2::zeros());
        assert_eq!(world.body(b).unwrap().position, Vec2::new(9.0, 0.0));
        assert!(!world.displace(a, b, None));
    }

    #[test]
    fn test_displace_never_moves_an_immovable_target() {
        let mut world = indexed_world();
        let a = world.insert_body(circle_body(Vec2::zeros(), 5.0));
        let b = world.insert_body(circle_body(Vec2::new(8.0, 0.0), 4.0).with_immovable(true));

        // Contact still reported, but the target holds its ground
        assert!(world.displace(a, b, None));
        assert_eq!(world.body(a).unwrap().position, Vec2::zeros());
        assert_eq!(world.body(b).unwrap().position, Vec2::new(8.0, 0.0));
    }

    #[test]
    fn test_collide_moves_the_caller_and_stops_it() {
        let mut world = indexed_world();
        let ball = world.insert_body(
            circle_body(Vec2::zeros(), 5.0).with_velocity(Vec2::new(4.0, 0.0)),
        );
        let wall = world.insert_body(box_body(Vec2::new(8.0, 0.0), 8.0, 20.0));

        assert!(world.collide(ball, wall, None));

        let ball = world.body(ball).unwrap();
        assert_eq!(ball.position, Vec2::new(-1.0, 0.0));
        assert_eq!(ball.velocity, Vec2::zeros());
        let wall = world.body(wall).unwrap();
        assert_eq!(wall.position, Vec2::new(8.0, 0.0));
        assert_eq!(wall.velocity, Vec2::zeros());
    }

    #[test]
    fn test_bounce_swaps_momentum_between_equals() {
        let mut world = indexed_world();
        let a = world.insert_body(
            circle_body(Vec2::zeros(), 5.0).with_velocity(Vec2::new(4.0, 0.0)),
        );
        let b = world.insert_body(circle_body(Vec2::new(8.0, 0.0), 4.0));

        assert!(world.bounce(a, b, None));

        assert_eq!(world.body(a).unwrap().position, Vec2::new(-1.0, 0.0));
        assert_eq!(world.body(a).unwrap().velocity, Vec2::zeros());
        assert_eq!(world.body(b).unwrap().velocity, Vec2::new(4.0, 0.0));
    }

    #[test]
    fn test_bounce_off_leaves_the_target_still() {
        let mut world = indexed_world();
        let a = world.insert_body(
            circle_body(Vec2::zeros(), 5.0).with_velocity(Vec2::new(4.0, 0.0)),
        );
        let b = world.insert_body(circle_body(Vec2::new(8.0, 0.0), 4.0));

        assert!(world.bounce_off(a, b, None));

        assert_eq!(world.body(a).unwrap().velocity, Vec2::new(-4.0, 0.0));
        assert_eq!(world.body(b).unwrap().position, Vec2::new(8.0, 0.0));
        assert_eq!(world.body(b).unwrap().velocity, Vec2::zeros());
    }

    #[test]
    fn test_immovable_caller_is_reported_but_never_moved() {
        let mut world = indexed_world();
        let anchor =
            world.insert_body(box_body(Vec2::zeros(), 10.0, 10.0).with_immovable(true));
        let other = world.insert_body(circle_body(Vec2::new(4.0, 0.0), 2.0));

        assert!(world.collide(anchor, other, None));

        assert_eq!(world.body(anchor).unwrap().position, Vec2::zeros());
        assert_eq!(world.body(other).unwrap().position, Vec2::new(4.0, 0.0));
        assert!(world.body(anchor).unwrap().touching.contains(TouchFlags::RIGHT));
        assert!(world.body(other).unwrap().touching.contains(TouchFlags::LEFT));
    }

    #[test]
    fn test_substeps_catch_a_fast_mover() {
        let mut world = brute_world();
        let ball = world.insert_body(circle_body(Vec2::zeros(), 1.0));
        let wall = world.insert_body(
            box_body(Vec2::new(50.0, 0.0), 0.5, 10.0).with_immovable(true),
        );

        world.begin_step();
        world.body_mut(ball).unwrap().position = Vec2::new(100.0, 0.0);

        // The whole step jumps clean over the wall; the replay stops
        // the ball where the contact actually happens
        assert!(world.collide(ball, wall, None));
        let caught = world.body(ball).unwrap().position;
        assert_relative_eq!(caught.x, 51.25, epsilon = 1e-9);
        assert_eq!(world.body(wall).unwrap().position, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn test_substep_floor_of_one_tests_only_the_final_position() {
        let config = CollisionConfig {
            substep_floor: 1.0,
            ..CollisionConfig::default()
        };
        let mut world = CollisionWorld::new(config);
        let ball = world.insert_body(circle_body(Vec2::zeros(), 1.0));
        let wall = world.insert_body(
            box_body(Vec2::new(50.0, 0.0), 0.5, 10.0).with_immovable(true),
        );

        world.begin_step();
        world.body_mut(ball).unwrap().position = Vec2::new(100.0, 0.0);

        // One sub-step degenerates to a final-position test, so the
        // same mover tunnels straight through
        assert!(!world.collide(ball, wall, None));
        assert_eq!(world.body(ball).unwrap().position, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_touch_flags_follow_the_contact_sides() {
        let mut world = indexed_world();
        let upper = world.insert_body(circle_body(Vec2::zeros(), 2.0));
        let lower = world.insert_body(circle_body(Vec2::new(0.0, 3.0), 2.0));

        assert!(world.overlaps(upper, lower));

        assert!(world.body(upper).unwrap().touching.contains(TouchFlags::BOTTOM));
        assert!(world.body(lower).unwrap().touching.contains(TouchFlags::TOP));
    }

    fn ring_scene(config: CollisionConfig) -> (CollisionWorld, BodyKey, Vec<BodyKey>) {
        let mut world = CollisionWorld::new(config);
        let caller = world.insert_body(circle_body(Vec2::zeros(), 3.0));
        let centers = [
            Vec2::new(3.0, 0.0),
            Vec2::new(0.0, 3.0),
            Vec2::new(-3.0, 0.0),
            Vec2::new(0.0, -3.0),
            Vec2::new(20.0, 20.0),
            Vec2::new(-20.0, 20.0),
            Vec2::new(40.0, 0.0),
        ];
        let targets = centers
            .into_iter()
            .map(|center| world.insert_body(box_body(center, 2.0, 2.0)))
            .collect();
        (world, caller, targets)
    }

    #[test]
    fn test_group_resolution_matches_brute_force() {
        let (mut indexed, caller_a, targets_a) = ring_scene(CollisionConfig::default());
        let (mut brute, caller_b, targets_b) = ring_scene(CollisionConfig {
            use_spatial_index: false,
            ..CollisionConfig::default()
        });

        let mut indexed_hits = 0;
        let mut handler = |_: &mut Body, _: &mut Body| indexed_hits += 1;
        assert!(indexed.displace_group(caller_a, &targets_a, Some(&mut handler)));

        let mut brute_hits = 0;
        let mut handler = |_: &mut Body, _: &mut Body| brute_hits += 1;
        assert!(brute.displace_group(caller_b, &targets_b, Some(&mut handler)));

        assert_eq!(indexed_hits, 4);
        assert_eq!(brute_hits, 4);
        for (a, b) in targets_a.iter().zip(&targets_b) {
            assert_eq!(
                indexed.body(*a).unwrap().position,
                brute.body(*b).unwrap().position
            );
        }
        // The ring members were each pushed flush against the caller
        assert_eq!(
            indexed.body(targets_a[0]).unwrap().position,
            Vec2::new(4.0, 0.0)
        );
        assert_eq!(
            indexed.body(targets_a[1]).unwrap().position,
            Vec2::new(0.0, 4.0)
        );
    }

    #[test]
    fn test_handler_sees_caller_then_target() {
        let mut world = indexed_world();
        let a = world.insert_body(circle_body(Vec2::zeros(), 5.0));
        let b = world.insert_body(circle_body(Vec2::new(8.0, 0.0), 4.0));

        let mut seen = Vec::new();
        let mut handler = |caller: &mut Body, target: &mut Body| {
            seen.push((caller.position.x, target.position.x));
        };
        assert!(world.displace(a, b, Some(&mut handler)));

        // The handler runs after separation, caller first
        assert_eq!(seen, vec![(0.0, 9.0)]);
    }

    #[test]
    fn test_destroying_in_the_handler_skips_later_pairs() {
        let mut world = brute_world();
        let caller = world.insert_body(circle_body(Vec2::zeros(), 5.0));
        let first = world.insert_body(circle_body(Vec2::new(6.0, 0.0), 2.0));
        let second = world.insert_body(circle_body(Vec2::new(-6.0, 0.0), 2.0));

        let mut handler = |caller: &mut Body, _: &mut Body| caller.destroy();
        assert!(world.displace_group(caller, &[first, second], Some(&mut handler)));

        // The first pair resolved, then the caller died and the rest
        // of the group was skipped
        assert_eq!(world.body(first).unwrap().position, Vec2::new(7.0, 0.0));
        assert_eq!(world.body(second).unwrap().position, Vec2::new(-6.0, 0.0));
        assert!(world.body(caller).unwrap().is_destroyed());
    }

    #[test]
    fn test_destroyed_bodies_are_swept_at_step_start() {
        let mut world = indexed_world();
        let a = world.insert_body(circle_body(Vec2::zeros(), 5.0));
        let b = world.insert_body(circle_body(Vec2::new(8.0, 0.0), 4.0));

        world.body_mut(b).unwrap().destroy();
        assert!(!world.overlaps(a, b));
        assert!(world.contains(b));

        world.begin_step();
        assert!(!world.contains(b));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_shapeless_bodies_never_collide() {
        let mut world = indexed_world();
        let bare = world.insert_body(Body::new(Vec2::zeros()));
        let shaped = world.insert_body(circle_body(Vec2::zeros(), 5.0));

        assert!(!world.overlaps(bare, shaped));
        assert!(!world.overlaps(shaped, bare));
    }

    #[test]
    fn test_begin_step_snapshots_positions_and_clears_flags() {
        let mut world = indexed_world();
        let key = world.insert_body(circle_body(Vec2::new(5.0, 5.0), 1.0));
        {
            let body = world.body_mut(key).unwrap();
            body.position = Vec2::new(7.0, 5.0);
            body.touching = TouchFlags::LEFT | TouchFlags::TOP;
        }

        world.begin_step();

        let body = world.body(key).unwrap();
        assert_eq!(body.previous_position, Vec2::new(7.0, 5.0));
        assert!(body.touching.is_empty());
    }

    #[test]
    fn test_moving_platform_completes_its_step_on_contact() {
        let mut world = indexed_world();
        let ball = world.insert_body(circle_body(Vec2::new(5.0, 0.0), 1.0));
        let platform = world.insert_body(
            box_body(Vec2::zeros(), 4.0, 4.0)
                .with_velocity(Vec2::new(10.0, 0.0))
                .with_immovable(true),
        );

        world.begin_step();
        world.body_mut(platform).unwrap().position = Vec2::new(10.0, 0.0);

        assert!(world.bounce(ball, platform, None));

        // The platform finishes its sweep; the ball is pushed clear
        // and kicked ahead at twice the platform speed
        assert_eq!(world.body(platform).unwrap().position, Vec2::new(10.0, 0.0));
        assert_eq!(world.body(platform).unwrap().velocity, Vec2::new(10.0, 0.0));
        assert_eq!(world.body(ball).unwrap().position, Vec2::new(6.0, 0.0));
        assert_eq!(world.body(ball).unwrap().velocity, Vec2::new(20.0, 0.0));
    }

    #[test]
    fn test_ball_bounces_between_walls() {
        let mut world = indexed_world();
        let ball = world.insert_body(
            circle_body(Vec2::zeros(), 1.0).with_velocity(Vec2::new(6.0, 0.0)),
        );
        let left = world.insert_body(
            box_body(Vec2::new(-10.0, 0.0), 2.0, 20.0).with_immovable(true),
        );
        let right = world.insert_body(
            box_body(Vec2::new(10.0, 0.0), 2.0, 20.0).with_immovable(true),
        );

        for _ in 0..4 {
            world.begin_step();
            let velocity = world.body(ball).unwrap().velocity;
            world.body_mut(ball).unwrap().position += velocity;
            world.bounce(ball, left, None);
            world.bounce(ball, right, None);
        }

        // One reflection off the right wall, then free flight back
        assert_eq!(world.body(ball).unwrap().position, Vec2::new(-4.0, 0.0));
        assert_eq!(world.body(ball).unwrap().velocity, Vec2::new(-6.0, 0.0));
    }

    #[test]
    fn test_update_index_skips_shapeless_bodies() {
        let mut world = indexed_world();
        let shaped = world.insert_body(circle_body(Vec2::new(1.0, 2.0), 1.0));
        let bare = world.insert_body(Body::new(Vec2::new(50.0, 50.0)));

        world.update_index();

        let tree = world.index().unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get_all(), vec![shaped]);
        assert!(world.contains(bare));
        assert!(brute_world().index().is_none());
    }
}
