//! Velocity responses for colliding pairs
//!
//! One-dimensional momentum exchange along the collision normal, with
//! the pair's restitution taken as the product of both bodies' values.
//! Immovable bodies act as infinite mass: their motion never changes
//! and the other body carries the entire response.

use super::body::Body;
use crate::foundation::math::Vec2;

/// Exchange momentum along `normal` between two overlapping bodies.
///
/// `force_target_immovable` makes `b` unyielding for this response even
/// if it is otherwise free, which is how the one-sided policies treat
/// their target. `zero_target_restitution` drops the pair's restitution
/// to zero so the caller's approach simply stops instead of bouncing.
/// Only the normal component of each velocity changes; tangential
/// motion is preserved.
pub(crate) fn apply_velocity_response(
    a: &mut Body,
    b: &mut Body,
    normal: Vec2,
    force_target_immovable: bool,
    zero_target_restitution: bool,
) {
    let b_immovable = b.immovable || force_target_immovable;
    let (mass_a, mass_b) = match (a.immovable, b_immovable) {
        (false, false) => (a.mass, b.mass),
        // An immovable side takes the whole mass budget so the split
        // sends the full response to the free side
        (true, false) => (1.0, 0.0),
        (false, true) => (0.0, 1.0),
        (true, true) => return,
    };
    let combined = mass_a + mass_b;
    if combined <= 0.0 {
        return;
    }

    let restitution = a.restitution
        * if zero_target_restitution {
            0.0
        } else {
            b.restitution
        };
    let van = a.velocity.dot(&normal);
    let vbn = b.velocity.dot(&normal);
    let next_van =
        ((mass_a - restitution * mass_b) * van + (1.0 + restitution) * mass_b * vbn) / combined;
    let next_vbn =
        ((mass_b - restitution * mass_a) * vbn + (1.0 + restitution) * mass_a * van) / combined;

    if !a.immovable {
        a.velocity += normal * (next_van - van);
    }
    if !b_immovable {
        b.velocity += normal * (next_vbn - vbn);
    }
}
