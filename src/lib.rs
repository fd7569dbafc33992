//! # Proxima
//!
//! Exact closest-point, distance and signed-distance queries against
//! triangle meshes.
//!
//! Given a triangle mesh and a batch of query points, proxima finds for each
//! point the closest point on the surface, its distance, the triangle it lies
//! on, and optionally whether the query point is inside or outside.
//!
//! ## Features
//!
//! - **Exact**: per-triangle closest points by Voronoi region classification,
//!   robust on shared edges, shared vertices and degenerate triangles
//! - **Accelerated**: a bounding volume hierarchy prunes candidates without
//!   ever changing the answer; the brute-force engine is kept as an oracle
//! - **Signed distance** from face, edge and vertex pseudonormals
//! - **Parallel**: query batches and index builds run on rayon
//!
//! ## Quick Start
//!
//! ```
//! use proxima::prelude::*;
//! use nalgebra::Point3;
//!
//! // An outward-wound tetrahedron.
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//! ];
//! let triangles = vec![
//!     [0, 2, 1], // bottom
//!     [0, 1, 3], // front
//!     [1, 2, 3], // slanted
//!     [2, 0, 3], // left
//! ];
//! let mesh = TriangleMesh::new(vertices, triangles).unwrap();
//!
//! let query = [Point3::new(0.2, 0.2, -1.0), Point3::new(0.1, 0.1, 0.1)];
//! let result = closest_point(&mesh, &query);
//! assert_eq!(result.triangle_ids[0], FaceId::new(0));
//! assert!((result.distances[0] - 1.0).abs() < 1e-12);
//!
//! let signed = signed_distance(&mesh, &query);
//! assert!(signed[0] < 0.0); // outside
//! assert!(signed[1] > 0.0); // inside
//! ```
//!
//! ## Repeated Queries
//!
//! ```
//! use proxima::prelude::*;
//! use nalgebra::Point3;
//!
//! # let mesh = TriangleMesh::from_flat(
//! #     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
//! #     &[0, 1, 2],
//! # ).unwrap();
//! let index = ProximityIndex::build(&mesh, &QueryOptions::default()).unwrap();
//! for z in [1.0, 2.0, 3.0] {
//!     let result = index.closest_point(&mesh, &[Point3::new(0.1, 0.1, z)]).unwrap();
//!     assert_eq!(result.distances[0], z);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod proximity;
pub mod spatial;

/// Prelude module for convenient imports.
///
/// ```
/// use proxima::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ProximityError, Result};
    pub use crate::geometry::Region;
    pub use crate::mesh::{EdgeKey, FaceId, TriangleMesh, VertexId};
    pub use crate::proximity::{
        closest_point, closest_point_naive, nearest_vertex, signed_distance, NearestResult,
        ProximityIndex, QueryOptions,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
