//! Collision shape definitions
//!
//! Shapes store their geometry in local space plus a pair of transforms
//! (local and parent) and cache the world-space values the SAT tests
//! read: center, scaled radius, half-diagonals, face normals. Callers
//! refresh a shape from its owner before testing; the caches are never
//! recomputed mid-test.

use thiserror::Error;

use super::bounds::BoundingBox;
use super::sat::AxisSet;
use crate::foundation::math::{perpendicular, Transform2D, Vec2};

/// Errors from shape construction and parameter validation
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ShapeError {
    /// A size-like parameter was zero, negative, or not finite
    #[error("shape dimension '{name}' must be positive and finite, got {value}")]
    InvalidDimension {
        /// Which parameter was rejected
        name: &'static str,
        /// The offending value
        value: f64,
    },
    /// A positional or angular parameter was NaN or infinite
    #[error("shape parameter '{name}' must be finite, got {value}")]
    NonFinite {
        /// Which parameter was rejected
        name: &'static str,
        /// The offending value
        value: f64,
    },
}

fn check_dimension(name: &'static str, value: f64) -> Result<f64, ShapeError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ShapeError::InvalidDimension { name, value })
    }
}

fn check_finite(name: &'static str, value: f64) -> Result<f64, ShapeError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ShapeError::NonFinite { name, value })
    }
}

/// Recipe for a shape an entity wants to carry.
///
/// Dimensions left as `None` are adopted from the owner's visual extent
/// once it is known, so a shape can be requested before the owner has
/// been measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeParams {
    /// Dimensionless point
    Point {
        /// Center offset from the owner origin
        offset: Vec2,
    },
    /// Circle, sized explicitly or from the owner extent
    Circle {
        /// Center offset from the owner origin
        offset: Vec2,
        /// Radius, or `None` to take half the owner's larger extent
        radius: Option<f64>,
    },
    /// Box that stays axis-aligned in world space
    AxisAlignedBox {
        /// Center offset from the owner origin
        offset: Vec2,
        /// Width and height, or `None` to take the owner extent
        size: Option<Vec2>,
    },
    /// Rectangle that rotates with its transforms
    OrientedBox {
        /// Center offset from the owner origin
        offset: Vec2,
        /// Fixed rotation relative to the owner, in radians
        rotation: f64,
        /// Width and height, or `None` to take the owner extent
        size: Option<Vec2>,
    },
}

impl Default for ShapeParams {
    /// An axis-aligned box sized from the owner extent
    fn default() -> Self {
        Self::AxisAlignedBox {
            offset: Vec2::zeros(),
            size: None,
        }
    }
}

impl ShapeParams {
    /// Validate every explicit parameter, reporting the first problem.
    ///
    /// Deferred dimensions (`None`) are accepted; they are checked against
    /// nothing because the owner supplies them later.
    pub fn validate(&self) -> Result<(), ShapeError> {
        match *self {
            Self::Point { offset } => {
                check_finite("offset.x", offset.x)?;
                check_finite("offset.y", offset.y)?;
            }
            Self::Circle { offset, radius } => {
                check_finite("offset.x", offset.x)?;
                check_finite("offset.y", offset.y)?;
                if let Some(radius) = radius {
                    check_dimension("radius", radius)?;
                }
            }
            Self::AxisAlignedBox { offset, size } => {
                check_finite("offset.x", offset.x)?;
                check_finite("offset.y", offset.y)?;
                if let Some(size) = size {
                    check_dimension("width", size.x)?;
                    check_dimension("height", size.y)?;
                }
            }
            Self::OrientedBox {
                offset,
                rotation,
                size,
            } => {
                check_finite("offset.x", offset.x)?;
                check_finite("offset.y", offset.y)?;
                check_finite("rotation", rotation)?;
                if let Some(size) = size {
                    check_dimension("width", size.x)?;
                    check_dimension("height", size.y)?;
                }
            }
        }
        Ok(())
    }
}

/// Owner state a shape reads when refreshing before a test
#[derive(Debug, Clone, Copy)]
pub struct OwnerPose {
    /// World position of the owner origin
    pub position: Vec2,
    /// Owner rotation in radians, clockwise-positive
    pub rotation: f64,
    /// Owner scale factors
    pub scale: Vec2,
    /// Current visual size, for shapes that adopt their dimensions
    pub extent: Option<Vec2>,
}

/// Shape geometry plus the world-space values cached for SAT tests
#[derive(Debug, Clone)]
pub enum ShapeKind {
    /// Dimensionless point
    Point,
    /// Circle
    Circle {
        /// Local-space radius
        radius: f64,
        /// Radius under the current transforms, measured along local X
        scaled_radius: f64,
    },
    /// Box that stays axis-aligned in world space.
    ///
    /// Rotation does not turn the box; it enlarges the axis-aligned
    /// envelope around the rotated corners instead.
    AxisAlignedBox {
        /// Local-space width
        width: f64,
        /// Local-space height
        height: f64,
        /// World-space envelope half-diagonals
        half_diag: [Vec2; 2],
    },
    /// Rectangle that rotates with its transforms
    OrientedBox {
        /// Local-space width
        width: f64,
        /// Local-space height
        height: f64,
        /// Fixed rotation baked into the local transform, in radians
        rotation: f64,
        /// World-space half-diagonals to two adjacent corners
        half_diag: [Vec2; 2],
        /// Unit face normals under the current transforms
        normals: [Vec2; 2],
    },
}

/// A convex shape positioned by a local and a parent transform.
///
/// The cached world-space geometry is only as fresh as the last
/// [`CollisionShape::update_from_owner`] or
/// [`CollisionShape::set_parent_transform`] call.
#[derive(Debug, Clone)]
pub struct CollisionShape {
    kind: ShapeKind,
    local: Transform2D,
    parent: Transform2D,
    center: Vec2,
    adopts_owner_size: bool,
}

impl CollisionShape {
    /// Create a point shape at an offset from the owner origin
    pub fn point(offset: Vec2) -> Self {
        Self::build(ShapeKind::Point, offset, 0.0, false)
    }

    /// Create a circle shape
    pub fn circle(offset: Vec2, radius: f64) -> Result<Self, ShapeError> {
        check_finite("offset.x", offset.x)?;
        check_finite("offset.y", offset.y)?;
        let radius = check_dimension("radius", radius)?;
        Ok(Self::build_circle(offset, radius, false))
    }

    /// Create a box that stays axis-aligned in world space
    pub fn axis_aligned_box(offset: Vec2, width: f64, height: f64) -> Result<Self, ShapeError> {
        check_finite("offset.x", offset.x)?;
        check_finite("offset.y", offset.y)?;
        let width = check_dimension("width", width)?;
        let height = check_dimension("height", height)?;
        Ok(Self::build_axis_aligned(offset, width, height, false))
    }

    /// Create an exact oriented rectangle
    pub fn oriented_box(
        offset: Vec2,
        rotation: f64,
        width: f64,
        height: f64,
    ) -> Result<Self, ShapeError> {
        check_finite("offset.x", offset.x)?;
        check_finite("offset.y", offset.y)?;
        check_finite("rotation", rotation)?;
        let width = check_dimension("width", width)?;
        let height = check_dimension("height", height)?;
        Ok(Self::build_oriented(offset, rotation, width, height, false))
    }

    /// Build a shape from stored parameters, deferring until the owner
    /// extent is known for dimensions left unspecified.
    pub(crate) fn from_params(params: &ShapeParams, extent: Option<Vec2>) -> Option<Self> {
        match *params {
            ShapeParams::Point { offset } => Some(Self::build(ShapeKind::Point, offset, 0.0, false)),
            ShapeParams::Circle {
                offset,
                radius: Some(radius),
            } => Some(Self::build_circle(offset, radius, false)),
            ShapeParams::Circle {
                offset,
                radius: None,
            } => extent.map(|e| Self::build_circle(offset, e.x.max(e.y) * 0.5, true)),
            ShapeParams::AxisAlignedBox {
                offset,
                size: Some(size),
            } => Some(Self::build_axis_aligned(offset, size.x, size.y, false)),
            ShapeParams::AxisAlignedBox { offset, size: None } => {
                extent.map(|e| Self::build_axis_aligned(offset, e.x, e.y, true))
            }
            ShapeParams::OrientedBox {
                offset,
                rotation,
                size: Some(size),
            } => Some(Self::build_oriented(offset, rotation, size.x, size.y, false)),
            ShapeParams::OrientedBox {
                offset,
                rotation,
                size: None,
            } => extent.map(|e| Self::build_oriented(offset, rotation, e.x, e.y, true)),
        }
    }

    /// Build an oriented box already placed in world space.
    ///
    /// Used for swept motion envelopes; skips dimension validation so a
    /// degenerate (zero-thickness) envelope is representable.
    pub(crate) fn world_oriented_box(center: Vec2, rotation: f64, width: f64, height: f64) -> Self {
        Self::build_oriented(center, rotation, width, height, false)
    }

    fn build_circle(offset: Vec2, radius: f64, adopts: bool) -> Self {
        Self::build(
            ShapeKind::Circle {
                radius,
                scaled_radius: radius,
            },
            offset,
            0.0,
            adopts,
        )
    }

    fn build_axis_aligned(offset: Vec2, width: f64, height: f64, adopts: bool) -> Self {
        Self::build(
            ShapeKind::AxisAlignedBox {
                width,
                height,
                half_diag: [Vec2::zeros(); 2],
            },
            offset,
            0.0,
            adopts,
        )
    }

    fn build_oriented(offset: Vec2, rotation: f64, width: f64, height: f64, adopts: bool) -> Self {
        Self::build(
            ShapeKind::OrientedBox {
                width,
                height,
                rotation,
                half_diag: [Vec2::zeros(); 2],
                normals: [Vec2::x(), Vec2::y()],
            },
            offset,
            rotation,
            adopts,
        )
    }

    fn build(kind: ShapeKind, offset: Vec2, rotation: f64, adopts_owner_size: bool) -> Self {
        let mut local = Transform2D::identity();
        local.translate(offset.x, offset.y);
        local.rotate(rotation);
        let mut shape = Self {
            kind,
            local,
            parent: Transform2D::identity(),
            center: Vec2::zeros(),
            adopts_owner_size,
        };
        shape.recache();
        shape
    }

    /// The shape variant and its cached world-space geometry
    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    /// Cached world-space center
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Move the shape by rewriting the offset in its local transform.
    ///
    /// With an identity parent the world center lands exactly on the
    /// given point.
    pub fn set_center(&mut self, offset: Vec2) {
        self.local.c = offset.x;
        self.local.f = offset.y;
        self.recache();
    }

    /// Replace the parent transform and refresh the cached geometry
    pub fn set_parent_transform(&mut self, parent: Transform2D) {
        self.parent = parent;
        self.recache();
    }

    /// Refresh the parent transform, and any adopted dimensions, from
    /// the owner's current state.
    pub fn update_from_owner(&mut self, owner: &OwnerPose) {
        let mut parent = Transform2D::identity();
        parent.translate(owner.position.x, owner.position.y);
        parent.rotate(owner.rotation);
        parent.scale(owner.scale.x, owner.scale.y);
        self.parent = parent;

        if self.adopts_owner_size {
            if let Some(extent) = owner.extent {
                self.adopt_extent(extent);
            }
        }
        self.recache();
    }

    fn adopt_extent(&mut self, extent: Vec2) {
        match &mut self.kind {
            ShapeKind::Point => {}
            ShapeKind::Circle { radius, .. } => *radius = extent.x.max(extent.y) * 0.5,
            ShapeKind::AxisAlignedBox { width, height, .. }
            | ShapeKind::OrientedBox { width, height, .. } => {
                *width = extent.x;
                *height = extent.y;
            }
        }
    }

    /// Recompute the cached world-space geometry from the transforms
    fn recache(&mut self) {
        let world = self.parent * self.local;
        self.center = world.translation();
        match &mut self.kind {
            ShapeKind::Point => {}
            ShapeKind::Circle {
                radius,
                scaled_radius,
            } => {
                *scaled_radius = world.transform_vector(Vec2::new(*radius, 0.0)).norm();
            }
            ShapeKind::AxisAlignedBox {
                width,
                height,
                half_diag,
            } => {
                let d1 = world.transform_vector(Vec2::new(*width * 0.5, *height * 0.5));
                let d2 = world.transform_vector(Vec2::new(*width * -0.5, *height * 0.5));
                // Wrap the rotated corners back into an axis-aligned envelope
                let ex = d1.x.abs().max(d2.x.abs());
                let ey = d1.y.abs().max(d2.y.abs());
                *half_diag = [Vec2::new(ex, ey), Vec2::new(-ex, ey)];
            }
            ShapeKind::OrientedBox {
                width,
                height,
                half_diag,
                normals,
                ..
            } => {
                let d1 = world.transform_vector(Vec2::new(*width * 0.5, *height * 0.5));
                let d2 = world.transform_vector(Vec2::new(*width * -0.5, *height * 0.5));
                *half_diag = [d1, d2];
                *normals = [
                    face_normal(d1 - d2, Vec2::x()),
                    face_normal(d1 + d2, Vec2::y()),
                ];
            }
        }
    }

    /// Half-extent of the shape along a unit axis.
    ///
    /// This is the support radius the SAT interval test uses: the
    /// projection of the shape onto `axis` is `center . axis` plus or
    /// minus this value.
    pub fn radius_on_axis(&self, axis: Vec2) -> f64 {
        match &self.kind {
            ShapeKind::Point => 0.0,
            ShapeKind::Circle { scaled_radius, .. } => *scaled_radius,
            ShapeKind::AxisAlignedBox { half_diag, .. }
            | ShapeKind::OrientedBox { half_diag, .. } => half_diag[0]
                .dot(&axis)
                .abs()
                .max(half_diag[1].dot(&axis).abs()),
        }
    }

    /// Smallest half-extent over all directions, used to size sub-steps
    /// for fast-moving pairs.
    pub(crate) fn min_radius(&self) -> f64 {
        match &self.kind {
            ShapeKind::Point => 0.0,
            ShapeKind::Circle { scaled_radius, .. } => *scaled_radius,
            ShapeKind::AxisAlignedBox { half_diag, .. } => half_diag[0].x.min(half_diag[0].y),
            ShapeKind::OrientedBox { normals, .. } => self
                .radius_on_axis(normals[0])
                .min(self.radius_on_axis(normals[1])),
        }
    }

    /// Axis-aligned bounding box around the cached world-space geometry
    pub fn bounding_box(&self) -> BoundingBox {
        let extents = Vec2::new(
            self.radius_on_axis(Vec2::x()),
            self.radius_on_axis(Vec2::y()),
        );
        BoundingBox::from_center_extents(self.center, extents)
    }

    /// Contribute this shape's separating-axis candidates for a test
    /// against `other`.
    ///
    /// Points contribute nothing, circles aim at the other shape's
    /// nearest feature, boxes contribute their face normals.
    pub(crate) fn candidate_axes(&self, other: &Self, axes: &mut AxisSet) {
        match &self.kind {
            ShapeKind::Point => {}
            ShapeKind::Circle { .. } => {
                axes.push(other.nearest_feature(self.center) - self.center);
            }
            ShapeKind::AxisAlignedBox { .. } => {
                axes.push(Vec2::x());
                axes.push(Vec2::y());
            }
            ShapeKind::OrientedBox { normals, .. } => {
                axes.push(normals[0]);
                axes.push(normals[1]);
            }
        }
    }

    /// The point a circle aims its test axis at: the center for round
    /// shapes, the nearest corner for boxes.
    fn nearest_feature(&self, from: Vec2) -> Vec2 {
        match &self.kind {
            ShapeKind::Point | ShapeKind::Circle { .. } => self.center,
            ShapeKind::AxisAlignedBox { half_diag, .. }
            | ShapeKind::OrientedBox { half_diag, .. } => {
                let mut best = self.center + half_diag[0];
                let mut best_dist = (best - from).norm_squared();
                for corner in [
                    self.center - half_diag[0],
                    self.center + half_diag[1],
                    self.center - half_diag[1],
                ] {
                    let dist = (corner - from).norm_squared();
                    if dist < best_dist {
                        best = corner;
                        best_dist = dist;
                    }
                }
                best
            }
        }
    }
}

/// Unit normal of an edge direction, or a fallback axis when the edge
/// has collapsed to zero length under a degenerate scale.
fn face_normal(edge: Vec2, fallback: Vec2) -> Vec2 {
    let normal = perpendicular(edge);
    let len = normal.norm();
    if len == 0.0 {
        fallback
    } else {
        normal / len
    }
}
