//! Bounding Volume Hierarchy over a set of axis-aligned boxes.
//!
//! The tree is built once from one box per item (a triangle, a vertex, ...)
//! and then only read. Nearest-neighbour style queries walk it best-first:
//! nodes and items sit in a single min-heap keyed by the squared distance
//! from the query point to their box, so items come out in non-decreasing
//! order of that lower bound. Callers pull as many as they need and stop
//! once the next bound can no longer beat their best exact distance.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::debug;
use nalgebra::Point3;
use smallvec::SmallVec;

use crate::geometry::Aabb;

/// Default maximum number of items per leaf.
pub const DEFAULT_LEAF_SIZE: usize = 8;

/// Subtrees with at least this many items are built on separate rayon tasks.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// BVH node containing either leaf items or child nodes.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Leaf node containing item indices.
    Leaf {
        /// Bounding box of all items in this leaf.
        bbox: Aabb,
        /// Item indices stored in this leaf.
        items: SmallVec<[u32; 8]>,
    },
    /// Internal node with two children.
    Internal {
        /// Bounding box of all items in this subtree.
        bbox: Aabb,
        /// Left child node.
        left: Box<Self>,
        /// Right child node.
        right: Box<Self>,
    },
}

impl BvhNode {
    /// Get the bounding box of this node.
    #[must_use]
    pub fn bbox(&self) -> &Aabb {
        match self {
            Self::Leaf { bbox, .. } | Self::Internal { bbox, .. } => bbox,
        }
    }

    fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn count(&self) -> (usize, usize) {
        match self {
            Self::Leaf { .. } => (1, 1),
            Self::Internal { left, right, .. } => {
                let (ln, ll) = left.count();
                let (rn, rl) = right.count();
                (1 + ln + rn, ll + rl)
            }
        }
    }
}

/// Bounding Volume Hierarchy.
///
/// An index built from zero boxes is valid: every query on it returns nothing.
#[derive(Debug, Clone)]
pub struct Bvh {
    root: Option<BvhNode>,
    boxes: Vec<Aabb>,
}

/// Shape statistics of a built tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BvhStats {
    /// Number of indexed items.
    pub items: usize,
    /// Total number of nodes.
    pub nodes: usize,
    /// Number of leaves.
    pub leaves: usize,
    /// Longest root-to-leaf path, counted in nodes.
    pub depth: usize,
}

impl Bvh {
    /// Build a BVH from per-item boxes, single-threaded.
    ///
    /// Item `i` of every query result refers to `boxes[i]`.
    ///
    /// # Example
    ///
    /// ```
    /// use proxima::geometry::Aabb;
    /// use proxima::spatial::Bvh;
    /// use nalgebra::Point3;
    ///
    /// let boxes: Vec<Aabb> = (0..10)
    ///     .map(|i| Aabb::from_point(&Point3::new(i as f64, 0.0, 0.0)))
    ///     .collect();
    /// let bvh = Bvh::build(boxes, 2);
    /// assert_eq!(bvh.nearest_candidates(&Point3::new(6.2, 0.0, 0.0), 2), vec![6, 7]);
    /// ```
    #[must_use]
    pub fn build(boxes: Vec<Aabb>, max_leaf_size: usize) -> Self {
        Self::build_impl(boxes, max_leaf_size, None)
    }

    /// Build a BVH, splitting large subtrees across rayon tasks.
    ///
    /// The resulting tree is identical to the one from [`Bvh::build`].
    #[must_use]
    pub fn build_parallel(boxes: Vec<Aabb>, max_leaf_size: usize, parallel_threshold: usize) -> Self {
        Self::build_impl(boxes, max_leaf_size, Some(parallel_threshold.max(2)))
    }

    fn build_impl(boxes: Vec<Aabb>, max_leaf_size: usize, parallel_threshold: Option<usize>) -> Self {
        if boxes.is_empty() {
            debug!("bvh: no items, building empty index");
            return Self { root: None, boxes };
        }

        let centers: Vec<Point3<f64>> = boxes.iter().map(Aabb::center).collect();
        let indices: Vec<u32> = (0..boxes.len() as u32).collect();
        let max_leaf = max_leaf_size.max(1);
        let root = build_recursive(&boxes, &centers, indices, max_leaf, parallel_threshold);

        let bvh = Self { root: Some(root), boxes };
        let stats = bvh.stats();
        debug!(
            "bvh: built over {} items ({} nodes, {} leaves, depth {})",
            stats.items, stats.nodes, stats.leaves, stats.depth
        );
        bvh
    }

    /// Number of indexed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether the index holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Per-item boxes the tree was built from.
    #[must_use]
    pub fn boxes(&self) -> &[Aabb] {
        &self.boxes
    }

    /// Bounding box of everything in the tree.
    #[must_use]
    pub fn bounds(&self) -> Option<&Aabb> {
        self.root.as_ref().map(BvhNode::bbox)
    }

    /// Shape statistics of the tree.
    #[must_use]
    pub fn stats(&self) -> BvhStats {
        match &self.root {
            None => BvhStats::default(),
            Some(root) => {
                let (nodes, leaves) = root.count();
                BvhStats {
                    items: self.boxes.len(),
                    nodes,
                    leaves,
                    depth: root.depth(),
                }
            }
        }
    }

    /// Iterate over items in non-decreasing order of box distance to `point`.
    ///
    /// Yields `(item, lower_bound_sq)` where `lower_bound_sq` is the squared
    /// distance from `point` to the item's box. Equal bounds come out in
    /// ascending item order.
    pub fn nearest_iter(&self, point: &Point3<f64>) -> NearestIter<'_> {
        let mut heap = BinaryHeap::new();
        if let Some(root) = &self.root {
            heap.push(Entry {
                dist_sq: root.bbox().distance_squared(point),
                kind: EntryKind::Node(root),
            });
        }
        NearestIter {
            boxes: &self.boxes,
            point: *point,
            heap,
        }
    }

    /// The first `k` items in order of increasing box distance to `point`.
    ///
    /// These are plausible containers of the nearest item, not a guarantee:
    /// a closer box does not imply a closer item. Callers that need an exact
    /// answer should use [`Bvh::nearest_iter`] and keep pulling until the
    /// bound exceeds their best distance.
    #[must_use]
    pub fn nearest_candidates(&self, point: &Point3<f64>, k: usize) -> Vec<usize> {
        self.nearest_iter(point).take(k).map(|(i, _)| i).collect()
    }
}

fn build_recursive(
    boxes: &[Aabb],
    centers: &[Point3<f64>],
    mut indices: Vec<u32>,
    max_leaf_size: usize,
    parallel_threshold: Option<usize>,
) -> BvhNode {
    let mut bbox = Aabb::empty();
    for &i in &indices {
        bbox.expand(&boxes[i as usize]);
    }

    if indices.len() <= max_leaf_size {
        return BvhNode::Leaf {
            bbox,
            items: indices.into_iter().collect(),
        };
    }

    // Median split along the longest axis of the center spread.
    let mut spread = Aabb::empty();
    for &i in &indices {
        spread.expand_point(&centers[i as usize]);
    }
    let axis = spread.longest_axis();
    indices.sort_by(|&a, &b| {
        centers[a as usize][axis]
            .total_cmp(&centers[b as usize][axis])
            .then(a.cmp(&b))
    });

    let right_indices = indices.split_off(indices.len() / 2);
    let left_indices = indices;

    let (left, right) = match parallel_threshold {
        Some(threshold) if left_indices.len() + right_indices.len() >= threshold => rayon::join(
            || build_recursive(boxes, centers, left_indices, max_leaf_size, parallel_threshold),
            || build_recursive(boxes, centers, right_indices, max_leaf_size, parallel_threshold),
        ),
        _ => (
            build_recursive(boxes, centers, left_indices, max_leaf_size, parallel_threshold),
            build_recursive(boxes, centers, right_indices, max_leaf_size, parallel_threshold),
        ),
    };

    BvhNode::Internal {
        bbox,
        left: Box::new(left),
        right: Box::new(right),
    }
}

enum EntryKind<'a> {
    Item(u32),
    Node(&'a BvhNode),
}

struct Entry<'a> {
    dist_sq: f64,
    kind: EntryKind<'a>,
}

impl Entry<'_> {
    /// At equal distance nodes expand first, so every item with that bound
    /// is queued before any of them is yielded; items then go lowest first.
    fn rank(&self) -> (u8, u32) {
        match self.kind {
            EntryKind::Node(_) => (0, 0),
            EntryKind::Item(i) => (1, i),
        }
    }
}

impl Ord for Entry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the smallest entry pops first.
        other
            .dist_sq
            .total_cmp(&self.dist_sq)
            .then_with(|| other.rank().cmp(&self.rank()))
    }
}

impl PartialOrd for Entry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry<'_> {}

/// Best-first traversal returned by [`Bvh::nearest_iter`].
pub struct NearestIter<'a> {
    boxes: &'a [Aabb],
    point: Point3<f64>,
    heap: BinaryHeap<Entry<'a>>,
}

impl Iterator for NearestIter<'_> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(entry) = self.heap.pop() {
            match entry.kind {
                EntryKind::Item(i) => return Some((i as usize, entry.dist_sq)),
                EntryKind::Node(BvhNode::Leaf { items, .. }) => {
                    for &i in items {
                        self.heap.push(Entry {
                            dist_sq: self.boxes[i as usize].distance_squared(&self.point),
                            kind: EntryKind::Item(i),
                        });
                    }
                }
                EntryKind::Node(BvhNode::Internal { left, right, .. }) => {
                    for child in [left.as_ref(), right.as_ref()] {
                        self.heap.push(Entry {
                            dist_sq: child.bbox().distance_squared(&self.point),
                            kind: EntryKind::Node(child),
                        });
                    }
                }
            }
        }
        None
    }
}

impl std::fmt::Debug for NearestIter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NearestIter")
            .field("point", &self.point)
            .field("pending", &self.heap.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_boxes(n: usize) -> Vec<Aabb> {
        let mut boxes = Vec::new();
        for i in 0..n {
            for j in 0..n {
                let min = Point3::new(i as f64, j as f64, 0.0);
                let max = Point3::new(i as f64 + 0.5, j as f64 + 0.5, 0.25);
                boxes.push(Aabb::from_min_max(min, max));
            }
        }
        boxes
    }

    #[test]
    fn test_empty_index() {
        let bvh = Bvh::build(Vec::new(), 4);
        assert!(bvh.is_empty());
        assert!(bvh.bounds().is_none());
        assert!(bvh.nearest_candidates(&Point3::origin(), 10).is_empty());
        assert_eq!(bvh.nearest_iter(&Point3::origin()).count(), 0);
        assert_eq!(bvh.stats(), BvhStats::default());
    }

    #[test]
    fn test_iter_visits_every_item_in_order() {
        let boxes = grid_boxes(12);
        let bvh = Bvh::build(boxes.clone(), 3);
        let q = Point3::new(4.3, 7.9, 3.0);

        let visited: Vec<(usize, f64)> = bvh.nearest_iter(&q).collect();
        assert_eq!(visited.len(), boxes.len());

        for w in visited.windows(2) {
            assert!(w[0].1 <= w[1].1, "bounds out of order: {} > {}", w[0].1, w[1].1);
        }
        for &(i, d) in &visited {
            assert_eq!(d, boxes[i].distance_squared(&q));
        }

        let mut seen: Vec<usize> = visited.iter().map(|&(i, _)| i).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..boxes.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_equal_bounds_come_out_by_index() {
        // Every box contains the query point, so every bound is zero.
        let boxes = vec![
            Aabb::from_min_max(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
            20
        ];
        let bvh = Bvh::build(boxes, 2);
        let order = bvh.nearest_candidates(&Point3::origin(), 20);
        assert_eq!(order, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_nearest_candidates_matches_sorting() {
        let boxes = grid_boxes(9);
        let bvh = Bvh::build(boxes.clone(), 4);
        let q = Point3::new(-2.0, 3.3, 1.0);

        let mut expected: Vec<(f64, usize)> = boxes
            .iter()
            .enumerate()
            .map(|(i, b)| (b.distance_squared(&q), i))
            .collect();
        expected.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let got = bvh.nearest_candidates(&q, 5);
        let want: Vec<usize> = expected.iter().take(5).map(|&(_, i)| i).collect();
        assert_eq!(got, want);
    }

    #[test]
    fn test_parallel_build_matches_sequential() {
        let boxes = grid_boxes(30);
        let a = Bvh::build(boxes.clone(), 4);
        let b = Bvh::build_parallel(boxes, 4, 16);
        assert_eq!(a.stats(), b.stats());

        let q = Point3::new(10.1, 20.7, -1.0);
        assert_eq!(a.nearest_candidates(&q, 50), b.nearest_candidates(&q, 50));
    }

    #[test]
    fn test_stats() {
        let bvh = Bvh::build(grid_boxes(4), 4);
        let stats = bvh.stats();
        assert_eq!(stats.items, 16);
        assert_eq!(stats.leaves, 4);
        assert_eq!(stats.nodes, 7);
        assert_eq!(stats.depth, 3);
    }
}
