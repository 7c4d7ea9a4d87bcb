//! Axis-aligned bounding boxes used by the broad phase and spatial index

use crate::foundation::math::Vec2;

/// Axis-aligned box stored as its four world-space edges.
///
/// Y grows downward, so a well-formed box has `top <= bottom` and
/// `left <= right`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Smallest Y edge
    pub top: f64,
    /// Largest Y edge
    pub bottom: f64,
    /// Smallest X edge
    pub left: f64,
    /// Largest X edge
    pub right: f64,
}

impl BoundingBox {
    /// Create a bounding box from corner points
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            top: min.y,
            bottom: max.y,
            left: min.x,
            right: max.x,
        }
    }

    /// Create a bounding box from a center and half-size extents
    pub fn from_center_extents(center: Vec2, extents: Vec2) -> Self {
        Self {
            top: center.y - extents.y,
            bottom: center.y + extents.y,
            left: center.x - extents.x,
            right: center.x + extents.x,
        }
    }

    /// Center of the box
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }

    /// Half-size extents of the box
    pub fn extents(&self) -> Vec2 {
        Vec2::new(
            (self.right - self.left) * 0.5,
            (self.bottom - self.top) * 0.5,
        )
    }

    /// Width of the box
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Height of the box
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Check if a point is inside this box, edges included
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left
            && point.x <= self.right
            && point.y >= self.top
            && point.y <= self.bottom
    }

    /// Check if this box intersects another, shared edges included
    pub fn intersects(&self, other: &Self) -> bool {
        self.left <= other.right
            && self.right >= other.left
            && self.top <= other.bottom
            && self.bottom >= other.top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_center_extents_edges() {
        let bb = BoundingBox::from_center_extents(Vec2::new(10.0, 20.0), Vec2::new(3.0, 5.0));
        assert_eq!(bb.left, 7.0);
        assert_eq!(bb.right, 13.0);
        assert_eq!(bb.top, 15.0);
        assert_eq!(bb.bottom, 25.0);
        assert_eq!(bb.center(), Vec2::new(10.0, 20.0));
        assert_eq!(bb.extents(), Vec2::new(3.0, 5.0));
    }

    #[test]
    fn test_contains_point_includes_edges() {
        let bb = BoundingBox::from_min_max(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(bb.contains_point(Vec2::new(5.0, 5.0)));
        assert!(bb.contains_point(Vec2::new(0.0, 0.0)));
        assert!(bb.contains_point(Vec2::new(10.0, 10.0)));
        assert!(!bb.contains_point(Vec2::new(10.1, 5.0)));
    }

    #[test]
    fn test_intersects_overlapping_and_touching() {
        let a = BoundingBox::from_min_max(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = BoundingBox::from_min_max(Vec2::new(5.0, 5.0), Vec2::new(15.0, 15.0));
        let touching = BoundingBox::from_min_max(Vec2::new(10.0, 0.0), Vec2::new(20.0, 10.0));
        let apart = BoundingBox::from_min_max(Vec2::new(11.0, 0.0), Vec2::new(20.0, 10.0));

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(a.intersects(&touching));
        assert!(!a.intersects(&apart));
    }
}
