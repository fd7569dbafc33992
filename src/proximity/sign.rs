//! Inside/outside resolution with angle-weighted pseudonormals.
//!
//! The sign of `(query - closest) · n` is only reliable when `n` is the
//! pseudonormal of the feature the closest point lies on: the face normal in
//! a triangle interior, the average of the adjacent face normals on an edge,
//! and the angle-weighted average of the incident face normals at a vertex
//! (Bærentzen & Aanæs, "Signed distance computation using the angle weighted
//! pseudonormal"). Using the matched triangle's own normal at an edge or a
//! vertex flips signs near sharp features.
//!
//! Edges are keyed by their unordered vertex pair, so both triangles that
//! share an edge see the same normal no matter which of them won the
//! closest-point tie-break. An edge used by more than two triangles averages
//! all of them; the result is well defined but not necessarily meaningful.

use std::collections::HashMap;

use log::debug;
use nalgebra::{Point3, Vector3};

use super::{accelerated, map_points, Hit, QueryOptions};
use crate::error::Result;
use crate::geometry::vector::{unitize_checked, TOL_ZERO};
use crate::geometry::Region;
use crate::mesh::{EdgeKey, FaceId, TriangleMesh, VertexId};
use crate::spatial::Bvh;

/// `|(query - closest) · normal|` at or below this resolves to a signed
/// distance of exactly `0.0`.
pub const SIGN_TOLERANCE: f64 = 1e-12;

/// Vertex and edge pseudonormals of a mesh.
#[derive(Debug, Clone, Default)]
pub struct Pseudonormals {
    vertex: Vec<Vector3<f64>>,
    edge: HashMap<EdgeKey, Vector3<f64>>,
}

impl Pseudonormals {
    /// Aggregate the triangle normals of `mesh` onto its vertices and edges.
    ///
    /// Vertices not used by any triangle, and features whose contributions
    /// cancel out, get a zero vector.
    pub fn compute(mesh: &TriangleMesh) -> Self {
        // Each sum carries the total weight of its contributions, so a
        // cancelled sum is judged against what went into it.
        let mut vertex = vec![(Vector3::zeros(), 0.0); mesh.num_vertices()];
        let mut edge: HashMap<EdgeKey, (Vector3<f64>, f64)> =
            HashMap::with_capacity(mesh.num_triangles() * 3 / 2);

        for (&tri, normal) in mesh.triangles().iter().zip(mesh.triangle_normals()) {
            let corners = tri.map(|v| mesh.vertices()[v]);
            let weight = normal.norm();

            for i in 0..3 {
                let (j, k) = ((i + 1) % 3, (i + 2) % 3);

                let e1 = unitize_checked(&(corners[j] - corners[i]), 0.0);
                let e2 = unitize_checked(&(corners[k] - corners[i]), 0.0);
                if let (Some(e1), Some(e2)) = (e1, e2) {
                    let angle = e1.dot(&e2).clamp(-1.0, 1.0).acos();
                    let (sum, total) = &mut vertex[tri[i]];
                    *sum += normal * angle;
                    *total += weight * angle;
                }

                let (sum, total) = edge
                    .entry(EdgeKey::new(tri[i], tri[j]))
                    .or_insert_with(|| (Vector3::zeros(), 0.0));
                *sum += normal;
                *total += weight;
            }
        }

        let finish = |(sum, total): (Vector3<f64>, f64)| {
            unitize_checked(&sum, TOL_ZERO * total).unwrap_or_else(Vector3::zeros)
        };
        let vertex: Vec<Vector3<f64>> = vertex.into_iter().map(finish).collect();
        let edge: HashMap<EdgeKey, Vector3<f64>> =
            edge.into_iter().map(|(key, acc)| (key, finish(acc))).collect();

        debug!(
            "pseudonormals: {} vertices, {} edges",
            vertex.len(),
            edge.len()
        );
        Self { vertex, edge }
    }

    /// Pseudonormal of a vertex.
    #[inline]
    pub fn vertex(&self, v: VertexId) -> Vector3<f64> {
        self.vertex[v.index()]
    }

    /// Pseudonormal of an edge, if any triangle uses it.
    #[inline]
    pub fn edge(&self, key: EdgeKey) -> Option<Vector3<f64>> {
        self.edge.get(&key).copied()
    }

    /// Number of distinct edges.
    pub fn num_edges(&self) -> usize {
        self.edge.len()
    }

    /// Normal to test against for a closest point on `face` in `region`.
    ///
    /// Falls back to the face normal where the pseudonormal vanished.
    pub fn reference_normal(&self, mesh: &TriangleMesh, face: FaceId, region: Region) -> Vector3<f64> {
        let face_normal = mesh.triangle_normal(face);
        let tri = mesh.triangles()[face.index()];
        let n = match region {
            Region::Interior => return face_normal,
            Region::Edge(i) => {
                let (a, b) = Region::edge_corners(i);
                self.edge(EdgeKey::new(tri[a], tri[b])).unwrap_or_else(Vector3::zeros)
            }
            Region::Vertex(i) => self.vertex(VertexId::new(tri[i])),
        };
        if n == Vector3::zeros() {
            face_normal
        } else {
            n
        }
    }
}

/// Signed distance for one resolved closest point. Positive inside.
pub(crate) fn signed_from_hit(
    mesh: &TriangleMesh,
    pseudonormals: &Pseudonormals,
    query: &Point3<f64>,
    hit: Option<Hit>,
) -> f64 {
    let Some(hit) = hit else {
        return f64::NAN;
    };
    let normal = pseudonormals.reference_normal(mesh, hit.face, hit.region);
    let dot = (query - hit.point).dot(&normal);
    if dot.abs() <= SIGN_TOLERANCE {
        0.0
    } else if dot > 0.0 {
        -hit.dist_sq.sqrt()
    } else {
        hit.dist_sq.sqrt()
    }
}

pub(crate) fn signed_distance_impl(
    mesh: &TriangleMesh,
    bvh: &Bvh,
    pseudonormals: &Pseudonormals,
    points: &[Point3<f64>],
    options: &QueryOptions,
) -> Vec<f64> {
    let k = options.initial_candidates;
    map_points(points, options.parallel, |p| {
        let hit = accelerated::nearest_indexed(mesh, bvh, p, k);
        signed_from_hit(mesh, pseudonormals, p, hit)
    })
}

/// Signed distance from each query point to the mesh surface.
///
/// **Positive inside**, negative outside, `0.0` on the surface. Triangle
/// normals must point outward and be globally consistent; this is not
/// checked. A mesh without triangles yields NaN for every point.
///
/// # Example
///
/// ```
/// use proxima::mesh::TriangleMesh;
/// use proxima::proximity::signed_distance;
/// use nalgebra::Point3;
///
/// // Outward-wound tetrahedron.
/// let mesh = TriangleMesh::from_flat(
///     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
///     &[0, 2, 1, 0, 1, 3, 1, 2, 3, 2, 0, 3],
/// )
/// .unwrap();
/// let d = signed_distance(&mesh, &[Point3::new(0.1, 0.1, 0.1), Point3::new(2.0, 2.0, 2.0)]);
/// assert!(d[0] > 0.0);
/// assert!(d[1] < 0.0);
/// ```
pub fn signed_distance(mesh: &TriangleMesh, points: &[Point3<f64>]) -> Vec<f64> {
    let options = QueryOptions::default();
    let bvh = accelerated::triangle_bvh(mesh, &options);
    let pseudonormals = Pseudonormals::compute(mesh);
    signed_distance_impl(mesh, &bvh, &pseudonormals, points, &options)
}

/// [`signed_distance`] with explicit options.
///
/// # Errors
/// Returns an error if the options are invalid.
pub fn signed_distance_with_options(
    mesh: &TriangleMesh,
    points: &[Point3<f64>],
    options: &QueryOptions,
) -> Result<Vec<f64>> {
    options.validate()?;
    let bvh = accelerated::triangle_bvh(mesh, options);
    let pseudonormals = Pseudonormals::compute(mesh);
    Ok(signed_distance_impl(mesh, &bvh, &pseudonormals, points, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Outward-wound unit tetrahedron.
    fn tetrahedron() -> TriangleMesh {
        TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]],
        )
        .unwrap()
    }

    #[test]
    fn test_pseudonormals_of_tetrahedron() {
        let mesh = tetrahedron();
        let pn = Pseudonormals::compute(&mesh);
        assert_eq!(pn.num_edges(), 6);

        // The corner at the origin sees three right angles on the three
        // axis-aligned faces, so its pseudonormal is the diagonal.
        let n0 = pn.vertex(VertexId::new(0));
        let expected = -Vector3::new(1.0, 1.0, 1.0).normalize();
        assert_relative_eq!(n0, expected, epsilon = 1e-12);

        // Edge (0, 1) joins the faces with normals -z and -y.
        let e01 = pn.edge(EdgeKey::new(1, 0)).unwrap();
        assert_relative_eq!(e01, -Vector3::new(0.0, 1.0, 1.0).normalize(), epsilon = 1e-12);

        assert!(pn.edge(EdgeKey::new(0, 0)).is_none());
    }

    #[test]
    fn test_inside_positive_outside_negative() {
        let mesh = tetrahedron();
        let d = signed_distance(
            &mesh,
            &[
                Point3::new(0.1, 0.1, 0.1),
                Point3::new(-1.0, -1.0, -1.0),
                Point3::new(0.5, -0.5, 0.5),
                Point3::new(0.2, 0.2, -0.3),
            ],
        );
        assert_relative_eq!(d[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(d[1], -(3.0_f64).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(d[2], -0.5, epsilon = 1e-12);
        assert_relative_eq!(d[3], -0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_on_surface_is_zero() {
        let mesh = tetrahedron();
        let d = signed_distance(
            &mesh,
            &[
                Point3::new(0.2, 0.2, 0.0),
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.5, 0.0, 0.0),
            ],
        );
        assert_eq!(d, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_inverted_mesh_flips_sign() {
        let mut mesh = tetrahedron();
        let points = [Point3::new(0.1, 0.1, 0.1), Point3::new(2.0, 0.0, 0.0)];
        let before = signed_distance(&mesh, &points);
        mesh.invert();
        let after = signed_distance(&mesh, &points);
        assert_relative_eq!(before[0], -after[0], epsilon = 1e-12);
        assert_relative_eq!(before[1], -after[1], epsilon = 1e-12);
        assert!(before[0] > 0.0 && before[1] < 0.0);
    }

    #[test]
    fn test_empty_mesh_is_nan() {
        let d = signed_distance(&TriangleMesh::empty(), &[Point3::origin()]);
        assert!(d[0].is_nan());
        assert!(signed_distance(&tetrahedron(), &[]).is_empty());
    }

    #[test]
    fn test_small_tetrahedron_keeps_sign() {
        let scale = 1e-7;
        let base = tetrahedron();
        let vertices = base.vertices().iter().map(|p| p * scale).collect();
        let mesh = TriangleMesh::new(vertices, base.triangles().to_vec()).unwrap();

        let pn = Pseudonormals::compute(&mesh);
        let expected = -Vector3::new(1.0, 1.0, 1.0).normalize();
        assert_relative_eq!(pn.vertex(VertexId::new(0)), expected, epsilon = 1e-12);

        let d = signed_distance(
            &mesh,
            &[Point3::new(0.1, 0.1, 0.1) * scale, Point3::new(-1.0, -1.0, -1.0) * scale],
        );
        assert_relative_eq!(d[0], 0.1 * scale, max_relative = 1e-9);
        assert_relative_eq!(d[1], -(3.0_f64).sqrt() * scale, max_relative = 1e-9);
    }

    #[test]
    fn test_tiny_triangle_far_query() {
        let mesh = TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1e-7, 0.0, 0.0),
                Point3::new(0.0, 1e-7, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let d = signed_distance(&mesh, &[Point3::new(2e-8, 2e-8, -5.0), Point3::new(2e-8, 2e-8, 5.0)]);
        assert_eq!(d, vec![5.0, -5.0]);
    }

    #[test]
    fn test_zero_pseudonormal_falls_back_to_face() {
        // Two coincident triangles with opposite windings cancel on every
        // edge and vertex.
        let mesh = TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 1]],
        )
        .unwrap();
        let pn = Pseudonormals::compute(&mesh);
        let face = FaceId::new(0);
        assert_eq!(pn.reference_normal(&mesh, face, Region::Vertex(0)), mesh.triangle_normal(face));
        assert_eq!(pn.reference_normal(&mesh, face, Region::Edge(1)), mesh.triangle_normal(face));
    }
}
