//! Spatial acceleration structures (broad phase).

mod bvh;

pub use bvh::{Bvh, BvhNode, BvhStats, NearestIter, DEFAULT_LEAF_SIZE, DEFAULT_PARALLEL_THRESHOLD};
