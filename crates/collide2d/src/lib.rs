//! # Collide2D
//!
//! A 2D collision detection and resolution library for screen-space
//! games, using y-down coordinates throughout.
//!
//! ## Features
//!
//! - **Separating-Axis Detection**: overlap tests with exact minimum
//!   translation vectors for points, circles and boxes
//! - **Swept Coverage**: sub-stepped replay that keeps fast movers
//!   from tunneling through thin obstacles
//! - **Spatial Indexing**: quadtree broad phase for group queries,
//!   switchable from configuration
//! - **Response Policies**: overlap, displace, collide, bounce and
//!   bounce-off resolution with two-body momentum exchange
//! - **Scene Transforms**: shapes follow an owner's position, rotation
//!   and scale through affine parent transforms
//!
//! ## Quick Start
//!
//! ```rust
//! use collide2d::{Body, CollisionConfig, CollisionWorld, ShapeParams, Vec2};
//!
//! # fn main() -> Result<(), collide2d::ShapeError> {
//! let mut world = CollisionWorld::new(CollisionConfig::default());
//!
//! let ball = world.insert_body(
//!     Body::new(Vec2::new(0.0, 0.0))
//!         .with_velocity(Vec2::new(4.0, 0.0))
//!         .with_shape(ShapeParams::Circle {
//!             offset: Vec2::zeros(),
//!             radius: Some(2.0),
//!         })?,
//! );
//! let wall = world.insert_body(
//!     Body::new(Vec2::new(5.0, 0.0))
//!         .with_immovable(true)
//!         .with_shape(ShapeParams::AxisAlignedBox {
//!             offset: Vec2::zeros(),
//!             size: Some(Vec2::new(2.0, 10.0)),
//!         })?,
//! );
//!
//! // Each step: snapshot, integrate, then resolve
//! world.begin_step();
//! let velocity = world.body(ball).unwrap().velocity;
//! world.body_mut(ball).unwrap().position += velocity;
//!
//! assert!(world.bounce(ball, wall, None));
//! assert_eq!(world.body(ball).unwrap().position, Vec2::new(2.0, 0.0));
//! assert_eq!(world.body(ball).unwrap().velocity, Vec2::new(-4.0, 0.0));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

pub mod config;
pub mod foundation;
pub mod physics;
pub mod spatial;

pub use config::{CollisionConfig, Config, ConfigError};
pub use foundation::math::{Transform2D, Vec2};
pub use physics::{
    Body, BodyKey, BoundingBox, CollisionShape, CollisionWorld, ContactHandler, OwnerPose,
    ResponsePolicy, ShapeError, ShapeKind, ShapeParams, TouchFlags,
};
pub use spatial::{QuadTree, QuadTreeConfig};

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{CollisionConfig, Config},
        foundation::math::{Transform2D, Vec2},
        physics::{
            Body, BodyKey, CollisionShape, CollisionWorld, ResponsePolicy, ShapeParams,
            TouchFlags,
        },
        spatial::{QuadTree, QuadTreeConfig},
    };
}
