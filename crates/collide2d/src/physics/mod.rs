//! Physics module for collision detection and response
//!
//! Provides bodies with attached collision shapes, separating-axis
//! detection with swept coverage for fast movers, and pairwise
//! resolution under a choice of response policies.

pub mod body;
pub mod collision;
mod response;
pub mod world;

pub use body::{Body, BodyKey, TouchFlags};
pub use collision::{BoundingBox, CollisionShape, OwnerPose, ShapeError, ShapeKind, ShapeParams};
pub use world::{CollisionWorld, ContactHandler, ResponsePolicy};
