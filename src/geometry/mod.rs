//! Geometric primitives: bounding boxes, the closest-point-on-triangle
//! routine, and a few vector helpers.

mod aabb;
mod triangle;
pub mod vector;

pub use aabb::Aabb;
pub use triangle::{closest_point_on_triangle, triangle_normal, ClosestPoint, Region};
