//! Closest-point, distance and signed-distance queries.
//!
//! Three engines share one contract:
//!
//! - [`closest_point_naive`] evaluates every triangle for every query point.
//!   It is the correctness oracle and is fine for small meshes.
//! - [`closest_point`] prunes with a [`Bvh`](crate::spatial::Bvh) over the
//!   triangle bounds and returns exactly what the naive engine returns.
//! - [`signed_distance`] runs the accelerated query and resolves
//!   inside/outside with face, edge and vertex pseudonormals.
//!
//! For repeated queries against the same mesh, build a [`ProximityIndex`]
//! once and query through it.
//!
//! # Tie-break
//!
//! When several triangles are exactly equally close, the lowest triangle
//! index wins. Both engines use the same total order
//! `(squared distance, triangle index)`. The accelerated engine prunes with a
//! small relative slack over the box bounds, so its results agree with the
//! brute-force engine in practice; the slack guarantees agreement only up to
//! rounding of the bounds, which matters for queries within a few ulps of
//! the surface.
//!
//! # Sign convention
//!
//! Signed distances are **positive inside** the surface and negative outside.
//! Correct signs require outward, globally consistent triangle normals; this
//! is a caller obligation and is not checked.
//!
//! # Example
//!
//! ```
//! use proxima::prelude::*;
//! use nalgebra::Point3;
//!
//! let mesh = TriangleMesh::new(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! )
//! .unwrap();
//!
//! let result = closest_point(&mesh, &[Point3::new(0.2, 0.2, 3.0)]);
//! assert_eq!(result.distances[0], 3.0);
//! assert_eq!(result.triangle_ids[0], FaceId::new(0));
//! ```

mod accelerated;
mod index;
mod naive;
mod sign;

use nalgebra::Point3;
use rayon::prelude::*;

use crate::error::{ProximityError, Result};
use crate::geometry::Region;
use crate::mesh::FaceId;
use crate::spatial::{DEFAULT_LEAF_SIZE, DEFAULT_PARALLEL_THRESHOLD};

pub use accelerated::{
    closest_point, closest_point_with_options, nearest_vertex, nearest_vertex_with_options,
};
pub use index::ProximityIndex;
pub use naive::{closest_point_naive, closest_point_naive_with_options};
pub use sign::{signed_distance, signed_distance_with_options, Pseudonormals, SIGN_TOLERANCE};

/// Options for proximity queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Evaluate query points on the rayon thread pool (default: true).
    ///
    /// Results are identical either way.
    pub parallel: bool,
    /// Maximum triangles per BVH leaf (default: 8).
    pub leaf_size: usize,
    /// Candidates evaluated before the accelerated engine starts pruning
    /// (default: 8).
    pub initial_candidates: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            leaf_size: DEFAULT_LEAF_SIZE,
            initial_candidates: 8,
        }
    }
}

impl QueryOptions {
    /// Enable or disable parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the BVH leaf size.
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    /// Set the number of initial candidates.
    pub fn with_initial_candidates(mut self, count: usize) -> Self {
        self.initial_candidates = count;
        self
    }

    /// Check that the options are usable.
    ///
    /// # Errors
    /// Returns [`ProximityError::InvalidParameter`] for a zero leaf size or a
    /// zero initial candidate count.
    pub fn validate(&self) -> Result<()> {
        if self.leaf_size == 0 {
            return Err(ProximityError::invalid_param(
                "leaf_size",
                self.leaf_size,
                "must be at least 1",
            ));
        }
        if self.initial_candidates == 0 {
            return Err(ProximityError::invalid_param(
                "initial_candidates",
                self.initial_candidates,
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Subtree size above which the BVH build forks, if parallel at all.
    pub(crate) fn build_threshold(&self) -> Option<usize> {
        self.parallel.then_some(DEFAULT_PARALLEL_THRESHOLD)
    }
}

/// Per-point results of a closest-point query, in query order.
///
/// For a mesh without triangles every entry is a "no answer" sentinel: NaN
/// point and distance, [`FaceId::INVALID`], and [`Region::Interior`].
#[derive(Debug, Clone, PartialEq)]
pub struct NearestResult {
    /// Closest point on the surface for each query point.
    pub points: Vec<Point3<f64>>,
    /// Unsigned distance from each query point to its closest point.
    pub distances: Vec<f64>,
    /// Triangle that produced each closest point.
    pub triangle_ids: Vec<FaceId>,
    /// Feature of that triangle the closest point lies on.
    pub regions: Vec<Region>,
}

impl NearestResult {
    fn from_hits(hits: Vec<Option<Hit>>) -> Self {
        let n = hits.len();
        let mut result = Self {
            points: Vec::with_capacity(n),
            distances: Vec::with_capacity(n),
            triangle_ids: Vec::with_capacity(n),
            regions: Vec::with_capacity(n),
        };
        for hit in hits {
            match hit {
                Some(h) => {
                    result.points.push(h.point);
                    result.distances.push(h.dist_sq.sqrt());
                    result.triangle_ids.push(h.face);
                    result.regions.push(h.region);
                }
                None => {
                    result.points.push(Point3::new(f64::NAN, f64::NAN, f64::NAN));
                    result.distances.push(f64::NAN);
                    result.triangle_ids.push(FaceId::INVALID);
                    result.regions.push(Region::Interior);
                }
            }
        }
        result
    }

    /// Number of query points answered.
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Whether there were no query points.
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Split into `(points, distances, triangle_ids)`.
    pub fn into_parts(self) -> (Vec<Point3<f64>>, Vec<f64>, Vec<FaceId>) {
        (self.points, self.distances, self.triangle_ids)
    }
}

/// Best candidate found so far for one query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Hit {
    pub point: Point3<f64>,
    pub dist_sq: f64,
    pub face: FaceId,
    pub region: Region,
}

impl Hit {
    /// Strict total order on `(dist_sq, face)`.
    #[inline]
    pub fn beats(&self, other: &Hit) -> bool {
        self.dist_sq < other.dist_sq || (self.dist_sq == other.dist_sq && self.face < other.face)
    }
}

/// Keep whichever of `best` and `candidate` comes first.
#[inline]
pub(crate) fn keep_best(best: &mut Option<Hit>, candidate: Hit) {
    if best.as_ref().map_or(true, |b| candidate.beats(b)) {
        *best = Some(candidate);
    }
}

/// Evaluate `f` for every point, in parallel or not, preserving order.
pub(crate) fn map_points<T, F>(points: &[Point3<f64>], parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&Point3<f64>) -> T + Sync + Send,
{
    if parallel {
        points.par_iter().map(f).collect()
    } else {
        points.iter().map(f).collect()
    }
}
