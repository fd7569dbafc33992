//! BVH-accelerated closest point and nearest vertex.
//!
//! Broad phase: a [`Bvh`] over the per-triangle boxes hands out candidates
//! in order of box distance. Narrow phase: the exact closest point on each
//! candidate triangle. The loop stops only when the next box is farther than
//! the best exact distance found so far. A box distance never exceeds the
//! distance to anything inside the box, so nothing that was skipped could have
//! won, and the answer matches [`closest_point_naive`](super::closest_point_naive)
//! exactly.

use log::trace;
use nalgebra::Point3;

use super::{keep_best, map_points, Hit, NearestResult, QueryOptions};
use crate::error::Result;
use crate::geometry::{closest_point_on_triangle, Aabb};
use crate::mesh::{FaceId, TriangleMesh, VertexId};
use crate::spatial::Bvh;

/// Relative slack on the pruning bound.
///
/// The box bound and the exact distance are rounded independently; without
/// slack a triangle tied with the current best could be skipped and the tie
/// resolved differently from the exhaustive search. The slack absorbs
/// rounding at ordinary scales; agreement is not proven for distances near
/// the rounding floor of the coordinates.
const PRUNE_RELATIVE_SLACK: f64 = 1e-12;

/// BVH over the triangle bounds of `mesh`.
pub(crate) fn triangle_bvh(mesh: &TriangleMesh, options: &QueryOptions) -> Bvh {
    let boxes = mesh.triangle_bounds();
    match options.build_threshold() {
        Some(threshold) => Bvh::build_parallel(boxes, options.leaf_size, threshold),
        None => Bvh::build(boxes, options.leaf_size),
    }
}

/// BVH over zero-volume boxes at the vertex positions.
pub(crate) fn vertex_bvh(mesh: &TriangleMesh, options: &QueryOptions) -> Bvh {
    let boxes: Vec<Aabb> = mesh.vertices().iter().map(Aabb::from_point).collect();
    match options.build_threshold() {
        Some(threshold) => Bvh::build_parallel(boxes, options.leaf_size, threshold),
        None => Bvh::build(boxes, options.leaf_size),
    }
}

/// Exact nearest triangle to `p`, using `bvh` to skip hopeless candidates.
pub(crate) fn nearest_indexed(
    mesh: &TriangleMesh,
    bvh: &Bvh,
    p: &Point3<f64>,
    initial_candidates: usize,
) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    let mut examined = 0usize;

    for (item, lower_bound) in bvh.nearest_iter(p) {
        if examined >= initial_candidates {
            if let Some(b) = &best {
                if lower_bound > b.dist_sq * (1.0 + PRUNE_RELATIVE_SLACK) {
                    break;
                }
            }
        }

        let face = FaceId::new(item);
        let hit = closest_point_on_triangle(p, &mesh.triangle_positions(face));
        keep_best(
            &mut best,
            Hit {
                point: hit.point,
                dist_sq: (p - hit.point).norm_squared(),
                face,
                region: hit.region,
            },
        );
        examined += 1;
    }

    trace!(
        "closest point: examined {} of {} triangles",
        examined,
        mesh.num_triangles()
    );
    best
}

/// Nearest vertex to `p`.
///
/// A point box's distance is the exact distance, so the first item out of
/// the best-first traversal is the answer, and ties already come out lowest
/// index first.
pub(crate) fn nearest_vertex_indexed(bvh: &Bvh, p: &Point3<f64>) -> (f64, VertexId) {
    match bvh.nearest_iter(p).next() {
        Some((v, dist_sq)) => (dist_sq.sqrt(), VertexId::new(v)),
        None => (f64::NAN, VertexId::INVALID),
    }
}

pub(crate) fn closest_point_impl(
    mesh: &TriangleMesh,
    bvh: &Bvh,
    points: &[Point3<f64>],
    options: &QueryOptions,
) -> NearestResult {
    let k = options.initial_candidates;
    NearestResult::from_hits(map_points(points, options.parallel, |p| {
        nearest_indexed(mesh, bvh, p, k)
    }))
}

pub(crate) fn nearest_vertex_impl(
    bvh: &Bvh,
    points: &[Point3<f64>],
    parallel: bool,
) -> (Vec<f64>, Vec<VertexId>) {
    map_points(points, parallel, |p| nearest_vertex_indexed(bvh, p))
        .into_iter()
        .unzip()
}

/// Closest point on the mesh for each query point.
///
/// Agrees with [`closest_point_naive`](super::closest_point_naive),
/// including the tie-break, up to rounding of the pruning bounds. Costs
/// roughly logarithmic time per point for well-distributed meshes. Builds a throwaway index; use
/// [`ProximityIndex`](super::ProximityIndex) to amortize it.
///
/// # Example
///
/// ```
/// use proxima::mesh::TriangleMesh;
/// use proxima::proximity::{closest_point, closest_point_naive};
/// use nalgebra::Point3;
///
/// let mesh = TriangleMesh::from_flat(
///     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
///     &[0, 2, 1, 0, 1, 3, 1, 2, 3, 2, 0, 3],
/// )
/// .unwrap();
/// let query = [Point3::new(1.0, 1.0, 1.0), Point3::new(-0.3, 0.1, 0.2)];
/// assert_eq!(closest_point(&mesh, &query), closest_point_naive(&mesh, &query));
/// ```
pub fn closest_point(mesh: &TriangleMesh, points: &[Point3<f64>]) -> NearestResult {
    let options = QueryOptions::default();
    let bvh = triangle_bvh(mesh, &options);
    closest_point_impl(mesh, &bvh, points, &options)
}

/// [`closest_point`] with explicit options.
///
/// # Errors
/// Returns an error if the options are invalid.
pub fn closest_point_with_options(
    mesh: &TriangleMesh,
    points: &[Point3<f64>],
    options: &QueryOptions,
) -> Result<NearestResult> {
    options.validate()?;
    let bvh = triangle_bvh(mesh, options);
    Ok(closest_point_impl(mesh, &bvh, points, options))
}

/// Nearest mesh vertex for each query point, as `(distances, vertex_ids)`.
///
/// Ties go to the lowest vertex index. A mesh without vertices yields NaN
/// distances and [`VertexId::INVALID`].
pub fn nearest_vertex(mesh: &TriangleMesh, points: &[Point3<f64>]) -> (Vec<f64>, Vec<VertexId>) {
    let options = QueryOptions::default();
    let bvh = vertex_bvh(mesh, &options);
    nearest_vertex_impl(&bvh, points, options.parallel)
}

/// [`nearest_vertex`] with explicit options.
///
/// # Errors
/// Returns an error if the options are invalid.
pub fn nearest_vertex_with_options(
    mesh: &TriangleMesh,
    points: &[Point3<f64>],
    options: &QueryOptions,
) -> Result<(Vec<f64>, Vec<VertexId>)> {
    options.validate()?;
    let bvh = vertex_bvh(mesh, options);
    Ok(nearest_vertex_impl(&bvh, points, options.parallel))
}
