//! Core mesh data structures.
//!
//! The primary type is [`TriangleMesh`]: vertex positions, per-triangle
//! vertex indices, and per-triangle outward unit normals. That is the whole
//! of the mesh model the proximity queries consume.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`FaceId`] - Identifies a triangle
//! - [`EdgeKey`] - Identifies an undirected edge by its sorted vertex pair
//!
//! # Construction
//!
//! ```
//! use proxima::mesh::TriangleMesh;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh = TriangleMesh::new(vertices, vec![[0, 1, 2]]).unwrap();
//! assert_eq!(mesh.num_triangles(), 1);
//! ```

mod builder;
mod index;
mod trimesh;

pub use builder::{points_from_flat, points_from_rows, points_to_flat};
pub use index::{EdgeKey, FaceId, VertexId};
pub use trimesh::TriangleMesh;
