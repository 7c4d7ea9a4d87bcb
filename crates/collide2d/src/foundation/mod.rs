//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and the 2D affine transform
//! - Logging utilities

pub mod logging;
pub mod math;

pub use math::{Transform2D, Vec2};
