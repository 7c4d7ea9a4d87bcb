//! Math utilities and types
//!
//! Provides the scalar and vector types the collision pipeline is built on,
//! plus the 2D affine transform used to place shapes in world space.
//!
//! Coordinates follow the screen convention: X grows to the right, Y grows
//! downward, and positive rotations turn clockwise on screen.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f64>;

/// Rotate a vector a quarter turn, preserving its length.
///
/// Useful for deriving the axis across a direction of travel.
pub fn perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// 2D affine transform stored as six scalars.
///
/// Maps points by `x' = a*x + b*y + c` and `y' = d*x + e*y + f`; the
/// implicit bottom row is `[0, 0, 1]`. Vectors go through the linear part
/// only and ignore `c` and `f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    /// X output from X input
    pub a: f64,
    /// X output from Y input
    pub b: f64,
    /// X translation
    pub c: f64,
    /// Y output from X input
    pub d: f64,
    /// Y output from Y input
    pub e: f64,
    /// Y translation
    pub f: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    /// Create an identity transform
    pub const fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: 1.0,
            f: 0.0,
        }
    }

    /// Create a pure translation
    pub const fn from_translation(x: f64, y: f64) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: x,
            d: 0.0,
            e: 1.0,
            f: y,
        }
    }

    /// Create a pure rotation, clockwise-positive in screen coordinates
    pub fn from_rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            a: cos,
            b: -sin,
            c: 0.0,
            d: sin,
            e: cos,
            f: 0.0,
        }
    }

    /// Create a pure scale
    pub const fn from_scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: sy,
            f: 0.0,
        }
    }

    /// Reset to the identity transform
    pub fn clear(&mut self) {
        *self = Self::identity();
    }

    /// Compose `other` into this transform.
    ///
    /// The composed map applies `other` to points first and this transform
    /// second, which is the ordering needed for parent/local chaining:
    /// `world = parent.mult(&local)`.
    pub fn mult(&mut self, other: &Self) {
        let a = self.a * other.a + self.b * other.d;
        let b = self.a * other.b + self.b * other.e;
        let c = self.a * other.c + self.b * other.f + self.c;
        let d = self.d * other.a + self.e * other.d;
        let e = self.d * other.b + self.e * other.e;
        let f = self.d * other.c + self.e * other.f + self.f;
        *self = Self { a, b, c, d, e, f };
    }

    /// Append a translation, applied to points before the existing map
    pub fn translate(&mut self, x: f64, y: f64) {
        self.mult(&Self::from_translation(x, y));
    }

    /// Append a rotation, applied to points before the existing map.
    ///
    /// Positive angles turn clockwise on screen (Y-down coordinates).
    pub fn rotate(&mut self, radians: f64) {
        self.mult(&Self::from_rotation(radians));
    }

    /// Append a scale, applied to points before the existing map
    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.mult(&Self::from_scale(sx, sy));
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            self.a * point.x + self.b * point.y + self.c,
            self.d * point.x + self.e * point.y + self.f,
        )
    }

    /// Apply the linear part of this transform to a vector
    pub fn transform_vector(&self, vector: Vec2) -> Vec2 {
        Vec2::new(
            self.a * vector.x + self.b * vector.y,
            self.d * vector.x + self.e * vector.y,
        )
    }

    /// Extract the translation component
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.c, self.f)
    }

    /// Extract the scale factors from the linear part.
    ///
    /// A reflection (negative determinant) is reported as a negative Y
    /// scale.
    pub fn scale_factors(&self) -> Vec2 {
        let sx = self.a.hypot(self.d);
        let sy = self.b.hypot(self.e);
        let det = self.a * self.e - self.b * self.d;
        if det < 0.0 {
            Vec2::new(sx, -sy)
        } else {
            Vec2::new(sx, sy)
        }
    }

    /// Extract the rotation angle in radians.
    ///
    /// Exact when the scale is uniform; an approximation otherwise.
    pub fn rotation(&self) -> f64 {
        (-self.b).atan2(self.a)
    }
}

impl std::ops::Mul for Transform2D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut out = self;
        out.mult(&rhs);
        out
    }
}

impl std::ops::MulAssign for Transform2D {
    fn mul_assign(&mut self, rhs: Self) {
        self.mult(&rhs);
    }
}
