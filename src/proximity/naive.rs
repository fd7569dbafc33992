//! Brute-force closest point: every triangle, every query point.

use nalgebra::Point3;

use super::{keep_best, map_points, Hit, NearestResult, QueryOptions};
use crate::error::Result;
use crate::geometry::closest_point_on_triangle;
use crate::mesh::{FaceId, TriangleMesh};

/// Nearest triangle to `p` by exhaustive search.
pub(crate) fn nearest_naive(mesh: &TriangleMesh, p: &Point3<f64>) -> Option<Hit> {
    let mut best = None;
    for face in mesh.face_ids() {
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
    }
    best
}

/// Closest point on the mesh for each query point, by checking every triangle.
///
/// O(points × triangles). Use it as ground truth, or for meshes small enough
/// that building an index does not pay off.
///
/// # Example
///
/// ```
/// use proxima::mesh::TriangleMesh;
/// use proxima::proximity::closest_point_naive;
/// use nalgebra::Point3;
///
/// let mesh = TriangleMesh::from_flat(
///     &[0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 0.0],
///     &[0, 1, 2],
/// )
/// .unwrap();
/// let (points, distances, ids) =
///     closest_point_naive(&mesh, &[Point3::new(-1.0, 0.0, 0.0)]).into_parts();
/// assert_eq!(points[0], Point3::origin());
/// assert_eq!(distances[0], 1.0);
/// assert_eq!(ids[0].index(), 0);
/// ```
pub fn closest_point_naive(mesh: &TriangleMesh, points: &[Point3<f64>]) -> NearestResult {
    naive_impl(mesh, points, true)
}

/// [`closest_point_naive`] with explicit options. Only `parallel` applies.
///
/// # Errors
/// Returns an error if the options are invalid.
pub fn closest_point_naive_with_options(
    mesh: &TriangleMesh,
    points: &[Point3<f64>],
    options: &QueryOptions,
) -> Result<NearestResult> {
    options.validate()?;
    Ok(naive_impl(mesh, points, options.parallel))
}

fn naive_impl(mesh: &TriangleMesh, points: &[Point3<f64>], parallel: bool) -> NearestResult {
    NearestResult::from_hits(map_points(points, parallel, |p| nearest_naive(mesh, p)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Region;

    /// Two triangles sharing the edge (1, 2) in the plane z = 0.
    fn square() -> TriangleMesh {
        TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [1, 3, 2]],
        )
        .unwrap()
    }

    #[test]
    fn test_each_triangle_owns_its_side() {
        let mesh = square();
        let result = closest_point_naive(
            &mesh,
            &[Point3::new(0.2, 0.2, 1.0), Point3::new(0.8, 0.8, -1.0)],
        );
        assert_eq!(result.triangle_ids, vec![FaceId::new(0), FaceId::new(1)]);
        assert_eq!(result.distances, vec![1.0, 1.0]);
        assert_eq!(result.regions, vec![Region::Interior, Region::Interior]);
    }

    #[test]
    fn test_shared_edge_goes_to_lowest_index() {
        let mesh = square();
        // Exactly on the diagonal both triangles give the same point.
        let result = closest_point_naive(&mesh, &[Point3::new(0.5, 0.5, 2.0)]);
        assert_eq!(result.triangle_ids[0], FaceId::new(0));
        assert_eq!(result.distances[0], 2.0);
    }

    #[test]
    fn test_empty_mesh_gives_sentinels() {
        let mesh = TriangleMesh::empty();
        let result = closest_point_naive(&mesh, &[Point3::origin(), Point3::new(1.0, 2.0, 3.0)]);
        assert_eq!(result.len(), 2);
        assert!(result.distances.iter().all(|d| d.is_nan()));
        assert!(result.triangle_ids.iter().all(|f| !f.is_valid()));
    }

    #[test]
    fn test_no_points() {
        let result = closest_point_naive(&square(), &[]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let mesh = square();
        let points: Vec<Point3<f64>> = (0..40)
            .map(|i| {
                let t = i as f64 * 0.3;
                Point3::new(t.cos() * 2.0, t.sin() * 2.0, (t * 0.5).sin())
            })
            .collect();
        let options = QueryOptions::default().with_parallel(false);
        let seq = closest_point_naive_with_options(&mesh, &points, &options).unwrap();
        let par = closest_point_naive(&mesh, &points);
        assert_eq!(seq, par);
    }
}
