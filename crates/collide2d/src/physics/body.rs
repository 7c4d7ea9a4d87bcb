//! Collidable body state
//!
//! A body is the moving-entity side of the pipeline: pose, velocity,
//! response parameters, and the shape recipe it carries. Bodies live in
//! a world arena and are addressed by [`BodyKey`].

use bitflags::bitflags;
use slotmap::new_key_type;

use super::collision::shape::{CollisionShape, OwnerPose, ShapeError, ShapeParams};
use super::collision::BoundingBox;
use crate::foundation::math::Vec2;

new_key_type! {
    /// Stable handle to a body stored in a collision world
    pub struct BodyKey;
}

bitflags! {
    /// Which sides of a body touched something during the current step.
    ///
    /// Y grows downward, so TOP means contact on the low-Y side.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TouchFlags: u8 {
        /// Contact on the left side
        const LEFT = 1 << 0;
        /// Contact on the right side
        const RIGHT = 1 << 1;
        /// Contact on the top side
        const TOP = 1 << 2;
        /// Contact on the bottom side
        const BOTTOM = 1 << 3;
    }
}

/// A collidable entity: pose, motion, response parameters, and the
/// shape it carries.
///
/// The shape is built lazily from its parameters, so a body whose
/// dimensions come from a not-yet-measured visual simply reports no
/// collisions until the extent arrives.
#[derive(Debug, Clone)]
pub struct Body {
    /// World position
    pub position: Vec2,
    /// Position at the start of the current step
    pub previous_position: Vec2,
    /// Velocity in units per step
    pub velocity: Vec2,
    /// Rotation in radians, clockwise-positive
    pub rotation: f64,
    /// Scale factors applied to the carried shape
    pub scale: Vec2,
    /// Mass used by momentum responses
    pub mass: f64,
    /// Bounciness; a response multiplies both bodies' values
    pub restitution: f64,
    /// Immovable bodies never have their position or velocity altered
    pub immovable: bool,
    /// Sides that touched something during the current step
    pub touching: TouchFlags,
    /// Visual size a shape may adopt its dimensions from
    pub extent: Option<Vec2>,
    params: ShapeParams,
    shape: Option<CollisionShape>,
    destroyed: bool,
}

impl Body {
    /// Create a body at a position, with an extent-sized axis-aligned
    /// box as its default shape recipe
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            previous_position: position,
            velocity: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            mass: 1.0,
            restitution: 1.0,
            immovable: false,
            touching: TouchFlags::empty(),
            extent: None,
            params: ShapeParams::default(),
            shape: None,
            destroyed: false,
        }
    }

    /// Set the velocity
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the visual extent shapes may size themselves from
    pub fn with_extent(mut self, extent: Vec2) -> Self {
        self.extent = Some(extent);
        self
    }

    /// Set the mass
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Set the restitution
    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution;
        self
    }

    /// Mark the body as immovable
    pub fn with_immovable(mut self, immovable: bool) -> Self {
        self.immovable = immovable;
        self
    }

    /// Set the shape recipe, validating it first
    pub fn with_shape(mut self, params: ShapeParams) -> Result<Self, ShapeError> {
        self.set_shape(params)?;
        Ok(self)
    }

    /// Replace the shape recipe.
    ///
    /// Bad parameters fail loudly here and leave the previous recipe in
    /// place; the shape itself is rebuilt lazily on the next refresh.
    pub fn set_shape(&mut self, params: ShapeParams) -> Result<(), ShapeError> {
        params.validate()?;
        self.params = params;
        self.shape = None;
        Ok(())
    }

    /// The stored shape recipe
    pub fn shape_params(&self) -> ShapeParams {
        self.params
    }

    /// The current collision shape, if it has been built
    pub fn shape(&self) -> Option<&CollisionShape> {
        self.shape.as_ref()
    }

    /// Mutable access to the built shape, for direct placement
    pub fn shape_mut(&mut self) -> Option<&mut CollisionShape> {
        self.shape.as_mut()
    }

    /// Bounding box of the built shape, if any
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.shape.as_ref().map(CollisionShape::bounding_box)
    }

    /// Mark this body for removal at the next step boundary.
    ///
    /// A destroyed body stops colliding immediately; the world drops it
    /// when the next step begins.
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    /// Whether this body is marked for removal
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub(crate) fn pose(&self) -> OwnerPose {
        OwnerPose {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
            extent: self.extent,
        }
    }

    /// Build the shape if needed and refresh it from the current pose.
    ///
    /// Returns false while no shape is available: the recipe still
    /// needs an extent the body has not provided, or the body is
    /// destroyed. A body without a usable shape reports no collisions.
    pub fn refresh_shape(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        if self.shape.is_none() {
            match CollisionShape::from_params(&self.params, self.extent) {
                Some(shape) => self.shape = Some(shape),
                None => return false,
            }
        }
        let pose = self.pose();
        if let Some(shape) = self.shape.as_mut() {
            shape.update_from_owner(&pose);
        }
        true
    }
}
