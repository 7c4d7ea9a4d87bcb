//! Separating axis tests between convex shapes
//!
//! Every supported shape is centrosymmetric, so its projection onto an
//! axis is an interval centered on the projected shape center with a
//! half-length given by the shape's support radius. A pair collides only
//! if the intervals overlap on every candidate axis; the result is the
//! minimum translation vector (MTV) along the least-overlap axis.

use super::shape::CollisionShape;
use crate::foundation::math::Vec2;

/// Unit axes whose cross product is below this are treated as parallel
/// and tested once
const PARALLEL_EPSILON: f64 = 1e-14;

/// Fixed-capacity set of unit test axes for one shape pair.
///
/// Each side contributes at most two axes. Pushed axes are normalized
/// and near-parallel duplicates are dropped; a zero-length axis falls
/// back to the world X axis so concentric shapes still get tested.
#[derive(Debug, Clone)]
pub(crate) struct AxisSet {
    axes: [Vec2; 4],
    len: usize,
}

impl AxisSet {
    pub(crate) fn new() -> Self {
        Self {
            axes: [Vec2::zeros(); 4],
            len: 0,
        }
    }

    /// Normalize and add a candidate axis, dropping duplicates
    pub(crate) fn push(&mut self, axis: Vec2) {
        let length = axis.norm();
        let unit = if length == 0.0 { Vec2::x() } else { axis / length };
        for existing in &self.axes[..self.len] {
            if existing.perp(&unit).abs() < PARALLEL_EPSILON {
                return;
            }
        }
        if self.len < self.axes.len() {
            self.axes[self.len] = unit;
            self.len += 1;
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Vec2> {
        self.axes[..self.len].iter()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.len
    }
}

/// Minimum translation vector that moves `a` out of `b`.
///
/// Zero means the shapes are separated (or merely touching). A pair
/// with no candidate axes at all, which only happens for two points,
/// reports no collision.
pub(crate) fn minimum_translation(a: &CollisionShape, b: &CollisionShape) -> Vec2 {
    let delta = b.center() - a.center();

    let mut axes = AxisSet::new();
    a.candidate_axes(b, &mut axes);
    b.candidate_axes(a, &mut axes);

    let mut depth = f64::INFINITY;
    let mut direction = Vec2::zeros();
    for axis in axes.iter() {
        let distance = delta.dot(axis).abs();
        let overlap = a.radius_on_axis(*axis) + b.radius_on_axis(*axis) - distance;
        if overlap <= 0.0 {
            // A separating axis ends the test immediately
            return Vec2::zeros();
        }
        if overlap < depth {
            depth = overlap;
            direction = *axis;
        }
    }

    if !depth.is_finite() {
        return Vec2::zeros();
    }

    // Point the correction from b toward a
    if delta.dot(&direction) > 0.0 {
        direction * -depth
    } else {
        direction * depth
    }
}

impl CollisionShape {
    /// Minimum translation vector that moves this shape out of `other`.
    ///
    /// A zero vector means no collision. Adding the result to this
    /// shape's position separates the pair exactly.
    pub fn collide(&self, other: &Self) -> Vec2 {
        minimum_translation(self, other)
    }

    /// Whether this shape overlaps `other`
    pub fn overlaps(&self, other: &Self) -> bool {
        self.collide(other) != Vec2::zeros()
    }
}
