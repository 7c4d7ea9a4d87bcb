//! Swept-shape support for fast movers
//!
//! A fast shape can pass clean through a thin obstacle between two
//! steps. The broad phase wraps each moving shape in an oriented box
//! covering everywhere it was during the step; pairs that survive it
//! are replayed in sub-steps sized so that nothing can slip between
//! consecutive samples.

use super::shape::CollisionShape;
use crate::config::CollisionConfig;
use crate::foundation::math::{perpendicular, Vec2};

/// Oriented box covering a shape's travel over one step.
///
/// The box points along the velocity, spans the step length plus the
/// shape's reach at both ends, and is centered midway between the
/// previous and current shape centers. A stationary shape has no
/// motion box; callers test its exact shape instead.
pub(crate) fn motion_box(
    shape: &CollisionShape,
    displacement: Vec2,
    velocity: Vec2,
) -> Option<CollisionShape> {
    let speed = velocity.norm();
    if speed == 0.0 {
        return None;
    }
    let direction = velocity / speed;
    let along = shape.radius_on_axis(direction);
    let across = shape.radius_on_axis(perpendicular(direction));
    let center = shape.center() - displacement * 0.5;
    let rotation = direction.y.atan2(direction.x);

    Some(CollisionShape::world_oriented_box(
        center,
        rotation,
        speed + 2.0 * along,
        2.0 * across,
    ))
}

/// Number of lockstep sub-steps needed so neither body advances more
/// than the pair's smallest shape radius per sub-step.
///
/// The configured floor keeps point and sliver shapes from demanding
/// unbounded counts, and the cap bounds worst-case work per pair.
pub(crate) fn substep_count(
    min_radius: f64,
    relative_speed: f64,
    config: &CollisionConfig,
) -> u32 {
    if relative_speed <= 0.0 {
        return 1;
    }
    let fraction = (min_radius / relative_speed).max(config.substep_floor);
    if fraction >= 1.0 {
        return 1;
    }
    let steps = (1.0 / fraction).ceil() as u32;
    steps.clamp(1, config.max_substeps.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_stationary_shape_has_no_motion_box() {
        let shape = CollisionShape::circle(Vec2::new(3.0, 4.0), 1.0).unwrap();
        assert!(motion_box(&shape, Vec2::zeros(), Vec2::zeros()).is_none());
    }

    #[test]
    fn test_motion_box_covers_the_whole_travel() {
        // Circle of radius 1 that moved from (0, 0) to (10, 0)
        let shape = CollisionShape::circle(Vec2::new(10.0, 0.0), 1.0).unwrap();
        let cover = motion_box(&shape, Vec2::new(10.0, 0.0), Vec2::new(10.0, 0.0))
            .expect("moving shape needs a motion box");

        let bb = cover.bounding_box();
        assert_relative_eq!(bb.left, -1.0, epsilon = EPSILON);
        assert_relative_eq!(bb.right, 11.0, epsilon = EPSILON);
        assert_relative_eq!(bb.top, -1.0, epsilon = EPSILON);
        assert_relative_eq!(bb.bottom, 1.0, epsilon = EPSILON);

        // A sliver standing mid-path is caught by the cover
        let wall = CollisionShape::axis_aligned_box(Vec2::new(5.0, 0.0), 0.2, 10.0).unwrap();
        assert!(cover.overlaps(&wall));
    }

    #[test]
    fn test_motion_box_points_along_velocity() {
        let shape = CollisionShape::circle(Vec2::new(0.0, 8.0), 1.0).unwrap();
        let cover = motion_box(&shape, Vec2::new(0.0, 8.0), Vec2::new(0.0, 8.0))
            .expect("moving shape needs a motion box");

        // Travel is along +Y, so the cover is tall and thin
        assert_relative_eq!(cover.radius_on_axis(Vec2::x()), 1.0, epsilon = EPSILON);
        assert_relative_eq!(cover.radius_on_axis(Vec2::y()), 5.0, epsilon = EPSILON);
        assert_relative_eq!(cover.center().y, 4.0, epsilon = EPSILON);
    }

    #[test]
    fn test_substep_count_scales_with_speed() {
        let config = CollisionConfig::default();
        assert_eq!(substep_count(1.0, 10.0, &config), 10);
        assert_eq!(substep_count(1.0, 0.5, &config), 1);
        assert_eq!(substep_count(1.0, 0.0, &config), 1);
    }

    #[test]
    fn test_substep_floor_bounds_point_shapes() {
        let config = CollisionConfig::default();
        // A point has no radius; the floor keeps the count finite
        assert_eq!(substep_count(0.0, 10.0, &config), 64);
    }

    #[test]
    fn test_substep_cap_applies() {
        let config = CollisionConfig {
            max_substeps: 16,
            ..CollisionConfig::default()
        };
        assert_eq!(substep_count(0.0, 100.0, &config), 16);
    }
}
