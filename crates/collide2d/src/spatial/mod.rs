//! Spatial partitioning data structures
//!
//! Provides the quadtree backing broad-phase candidate queries, so
//! group collision tests scale with local density instead of the whole
//! population.

mod quadtree;

pub use quadtree::{QuadTree, QuadTreeConfig, QuadTreeNode};
