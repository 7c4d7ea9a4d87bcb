//! Collision detection for convex 2D shapes
//!
//! Shapes keep their geometry in local space and cache the world-space
//! values tests need, so a shape is refreshed from its owner once per
//! step and then tested cheaply any number of times.
//!
//! # Module Organization
//!
//! - [`bounds`] - Axis-aligned bounding boxes for the broad phase
//! - [`shape`] - Shape variants, their transforms, and cached geometry
//! - `sat` - Separating-axis tests and minimum translation vectors
//! - `swept` - Motion covers and sub-step sizing for fast movers
//!
//! # Key Types
//!
//! - [`CollisionShape`] - A convex shape placed by local and parent transforms
//! - [`ShapeParams`] - Shape recipe an entity carries, built lazily
//! - [`BoundingBox`] - Axis-aligned box in world space

pub mod bounds;
mod sat;
pub mod shape;
pub(crate) mod swept;

pub use bounds::BoundingBox;
pub use shape::{CollisionShape, OwnerPose, ShapeError, ShapeKind, ShapeParams};
