//! Quadtree spatial partitioning structure
//!
//! Divides 2D space into hierarchical quadrants for fast broad-phase
//! candidate queries. Entries are stored with their bounding box and
//! sink to the deepest node that wholly contains them; boxes straddling
//! a split line stay at the straddled node.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec2;
use crate::physics::body::BodyKey;
use crate::physics::collision::BoundingBox;

/// Configuration for quadtree behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadTreeConfig {
    /// Entries a node may hold before it subdivides
    pub capacity: usize,

    /// Maximum subdivision depth; nodes at the limit fill past capacity
    /// without complaint
    pub max_depth: u32,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            max_depth: 4,
        }
    }
}

/// Quadrant index for a box that fits wholly inside one child, or
/// `None` when the box straddles a split line.
///
/// Routing compares against the split lines only, so boxes outside the
/// node's bounds still route consistently toward the nearest quadrant.
fn quadrant_of(center: Vec2, bounds: &BoundingBox) -> Option<usize> {
    let west = bounds.right <= center.x;
    let east = bounds.left >= center.x;
    let north = bounds.bottom <= center.y;
    let south = bounds.top >= center.y;

    // Quadrant layout (Y grows downward):
    // 0: -X, -Y (top-left)
    // 1: +X, -Y (top-right)
    // 2: -X, +Y (bottom-left)
    // 3: +X, +Y (bottom-right)
    let x_bit = if east {
        1
    } else if west {
        0
    } else {
        return None;
    };
    let y_bit = if south {
        1
    } else if north {
        0
    } else {
        return None;
    };
    Some((y_bit << 1) | x_bit)
}

/// Single node in the quadtree hierarchy
#[derive(Debug, Clone)]
pub struct QuadTreeNode {
    /// World-space bounds of this node
    pub bounds: BoundingBox,

    /// Entries held at this node: straddlers, plus everything else
    /// until the node subdivides
    pub entries: Vec<(BodyKey, BoundingBox)>,

    /// Child nodes (4 quadrants), None if this is a leaf
    pub children: Option<Box<[QuadTreeNode; 4]>>,

    /// Depth in the tree (0 = root)
    pub depth: u32,
}

impl QuadTreeNode {
    /// Create a new leaf node
    pub fn new(bounds: BoundingBox, depth: u32) -> Self {
        Self {
            bounds,
            entries: Vec::new(),
            children: None,
            depth,
        }
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Quadrant a box would route to from this node
    fn child_index(&self, bounds: &BoundingBox) -> Option<usize> {
        quadrant_of(self.bounds.center(), bounds)
    }

    /// Subdivide into 4 children and push down every entry that fits
    /// wholly inside one of them
    fn subdivide(&mut self) {
        if self.children.is_some() {
            return;
        }

        let center = self.bounds.center();
        let quarter = self.bounds.extents() * 0.5;
        let child = |x_sign: f64, y_sign: f64| {
            let child_center = Vec2::new(
                center.x + quarter.x * x_sign,
                center.y + quarter.y * y_sign,
            );
            Self::new(
                BoundingBox::from_center_extents(child_center, quarter),
                self.depth + 1,
            )
        };
        let mut children = Box::new([
            child(-1.0, -1.0),
            child(1.0, -1.0),
            child(-1.0, 1.0),
            child(1.0, 1.0),
        ]);

        let mut kept = Vec::new();
        for (key, bounds) in std::mem::take(&mut self.entries) {
            match quadrant_of(center, &bounds) {
                Some(index) => children[index].entries.push((key, bounds)),
                None => kept.push((key, bounds)),
            }
        }
        self.entries = kept;
        self.children = Some(children);
    }

    /// Insert an entry, sinking it toward the deepest containing node
    fn insert(&mut self, key: BodyKey, bounds: BoundingBox, config: &QuadTreeConfig) {
        if let Some(children) = self.children.as_deref_mut() {
            if let Some(index) = quadrant_of(self.bounds.center(), &bounds) {
                children[index].insert(key, bounds, config);
                return;
            }
        }

        self.entries.push((key, bounds));
        if self.entries.len() > config.capacity && self.depth < config.max_depth && self.is_leaf()
        {
            self.subdivide();
        }
    }

    /// Remove an entry, descending along the same route its box inserts by
    fn remove(&mut self, key: BodyKey, bounds: &BoundingBox) -> bool {
        if let Some(index) = self.entries.iter().position(|(k, _)| *k == key) {
            self.entries.swap_remove(index);
            return true;
        }
        if let Some(children) = self.children.as_deref_mut() {
            if let Some(index) = quadrant_of(self.bounds.center(), bounds) {
                return children[index].remove(key, bounds);
            }
        }
        false
    }

    /// Collect candidate keys for a query box: everything stored along
    /// its route, including all children when it straddles a split line
    fn collect_into(&self, bounds: &BoundingBox, results: &mut Vec<BodyKey>) {
        for (key, _) in &self.entries {
            results.push(*key);
        }
        if let Some(children) = self.children.as_deref() {
            match quadrant_of(self.bounds.center(), bounds) {
                Some(index) => children[index].collect_into(bounds, results),
                None => {
                    for child in children.iter() {
                        child.collect_into(bounds, results);
                    }
                }
            }
        }
    }

    /// Collect every stored key
    fn keys_into(&self, results: &mut Vec<BodyKey>) {
        for (key, _) in &self.entries {
            results.push(*key);
        }
        if let Some(children) = self.children.as_deref() {
            for child in children.iter() {
                child.keys_into(results);
            }
        }
    }

    /// Move every stored entry out of this subtree
    fn drain_into(&mut self, results: &mut Vec<(BodyKey, BoundingBox)>) {
        results.append(&mut self.entries);
        if let Some(children) = self.children.as_deref_mut() {
            for child in children.iter_mut() {
                child.drain_into(results);
            }
        }
    }

    /// Count total entries in this node and all children
    fn count_entries(&self) -> usize {
        let mut count = self.entries.len();
        if let Some(children) = self.children.as_deref() {
            for child in children.iter() {
                count += child.count_entries();
            }
        }
        count
    }
}

/// Quadtree spatial index over bounding boxes
#[derive(Debug, Clone)]
pub struct QuadTree {
    /// Root node covering the indexed region
    pub root: QuadTreeNode,

    /// Configuration
    config: QuadTreeConfig,
}

impl QuadTree {
    /// Create a new quadtree with the given world bounds
    pub fn new(bounds: BoundingBox, config: QuadTreeConfig) -> Self {
        Self {
            root: QuadTreeNode::new(bounds, 0),
            config,
        }
    }

    /// Insert an entry with its bounding box
    pub fn insert(&mut self, key: BodyKey, bounds: BoundingBox) {
        self.root.insert(key, bounds, &self.config);
    }

    /// Remove an entry, locating it by the box it was inserted with.
    ///
    /// Returns whether the entry was found. A box that no longer matches
    /// the stored placement can miss; a later rebuild drops any leftover.
    pub fn remove(&mut self, key: BodyKey, bounds: &BoundingBox) -> bool {
        self.root.remove(key, bounds)
    }

    /// Collect collision candidates for a query box.
    ///
    /// The result always includes every stored entry whose box
    /// intersects the query box, plus coarse neighbors that a narrow
    /// phase is expected to reject.
    pub fn retrieve(&self, bounds: &BoundingBox) -> Vec<BodyKey> {
        let mut results = Vec::new();
        self.root.collect_into(bounds, &mut results);
        results
    }

    /// Collect collision candidates restricted to a membership set
    pub fn retrieve_from_group(
        &self,
        bounds: &BoundingBox,
        members: &HashSet<BodyKey>,
    ) -> Vec<BodyKey> {
        self.retrieve(bounds)
            .into_iter()
            .filter(|key| members.contains(key))
            .collect()
    }

    /// Every stored key, in traversal order
    pub fn get_all(&self) -> Vec<BodyKey> {
        let mut results = Vec::new();
        self.root.keys_into(&mut results);
        results
    }

    /// Total entry count
    pub fn len(&self) -> usize {
        self.root.count_entries()
    }

    /// Whether the tree holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shrink-wrap the root bounds around a set of positions.
    ///
    /// Covers positions only, not shape extents; entries poking past the
    /// root bounds simply stay near the root. Callers normally follow
    /// with [`QuadTree::cleanup`] or a full reinsert so placement matches
    /// the new bounds. An empty position set leaves the bounds alone.
    pub fn update_bounds(&mut self, positions: impl IntoIterator<Item = Vec2>) {
        let mut iter = positions.into_iter();
        let Some(first) = iter.next() else {
            return;
        };
        let mut min = first;
        let mut max = first;
        for position in iter {
            min = min.inf(&position);
            max = max.sup(&position);
        }
        self.root.bounds = BoundingBox::from_min_max(min, max);
    }

    /// Rebuild the tree structure from its own entries.
    ///
    /// Every stored entry is pulled out and reinserted under the current
    /// root bounds, so membership is unchanged while placement
    /// rebalances.
    pub fn cleanup(&mut self) {
        let mut entries = Vec::with_capacity(self.len());
        self.root.drain_into(&mut entries);
        self.root.children = None;
        for (key, bounds) in entries {
            self.root.insert(key, bounds, &self.config);
        }
    }

    /// Drop every entry, keeping the current bounds
    pub fn clear(&mut self) {
        self.root = QuadTreeNode::new(self.root.bounds, 0);
    }
}
