//! Indexed triangle mesh.
//!
//! The query engines only need three arrays: vertex positions, per-triangle
//! vertex indices, and per-triangle unit normals. [`TriangleMesh`] owns those
//! arrays, validates them once at construction, and keeps them private so
//! every query can rely on in-range indices without re-checking.
//!
//! # Change tracking
//!
//! Every mesh carries a generation stamp taken from a process-wide counter.
//! Mutating methods draw a fresh stamp, so a derived structure (such as a
//! [`ProximityIndex`](crate::proximity::ProximityIndex)) can record the stamp
//! it was built from and detect that it has gone stale.

use std::sync::atomic::{AtomicU64, Ordering};

use nalgebra::{Point3, Vector3};

use super::index::{FaceId, VertexId};
use crate::error::{ProximityError, Result};
use crate::geometry::vector::unitize;
use crate::geometry::{triangle_normal, Aabb};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// A triangle mesh as consumed by the proximity queries.
///
/// Triangles may be degenerate and vertices may be duplicated; neither is an
/// error. Normals are expected to point outward and to be globally
/// consistent. That is a precondition of
/// [`signed_distance`](crate::proximity::signed_distance), not something the
/// mesh checks.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    vertices: Vec<Point3<f64>>,
    triangles: Vec<[usize; 3]>,
    triangle_normals: Vec<Vector3<f64>>,
    generation: u64,
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::empty()
    }
}

impl TriangleMesh {
    /// Create a mesh, deriving triangle normals from the winding order.
    ///
    /// # Errors
    /// Returns [`ProximityError::InvalidVertexIndex`] if a triangle refers to a
    /// vertex that does not exist.
    ///
    /// # Example
    /// ```
    /// use proxima::mesh::TriangleMesh;
    /// use nalgebra::Point3;
    ///
    /// let mesh = TriangleMesh::new(
    ///     vec![
    ///         Point3::new(0.0, 0.0, 0.0),
    ///         Point3::new(1.0, 0.0, 0.0),
    ///         Point3::new(0.0, 1.0, 0.0),
    ///     ],
    ///     vec![[0, 1, 2]],
    /// )
    /// .unwrap();
    /// assert_eq!(mesh.triangle_normals()[0].z, 1.0);
    /// ```
    pub fn new(vertices: Vec<Point3<f64>>, triangles: Vec<[usize; 3]>) -> Result<Self> {
        validate_triangles(vertices.len(), &triangles)?;
        let triangle_normals = compute_triangle_normals(&vertices, &triangles);
        Ok(Self {
            vertices,
            triangles,
            triangle_normals,
            generation: next_generation(),
        })
    }

    /// Create a mesh with caller-supplied triangle normals.
    ///
    /// Normals are normalized on the way in; zero vectors stay zero.
    ///
    /// # Errors
    /// Returns an error for out-of-range indices or if the number of normals
    /// differs from the number of triangles.
    pub fn with_normals(
        vertices: Vec<Point3<f64>>,
        triangles: Vec<[usize; 3]>,
        normals: Vec<Vector3<f64>>,
    ) -> Result<Self> {
        validate_triangles(vertices.len(), &triangles)?;
        if normals.len() != triangles.len() {
            return Err(ProximityError::NormalCountMismatch {
                triangles: triangles.len(),
                normals: normals.len(),
            });
        }
        let triangle_normals = normals.iter().map(unitize).collect();
        Ok(Self {
            vertices,
            triangles,
            triangle_normals,
            generation: next_generation(),
        })
    }

    /// A mesh with no vertices and no triangles.
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
            triangle_normals: Vec::new(),
            generation: next_generation(),
        }
    }

    // ==================== Accessors ====================

    /// Vertex positions.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Per-triangle vertex indices.
    #[inline]
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Per-triangle unit normals (zero for degenerate triangles).
    #[inline]
    pub fn triangle_normals(&self) -> &[Vector3<f64>] {
        &self.triangle_normals
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Current generation stamp.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertices[v.index()]
    }

    /// The three corner positions of a triangle.
    #[inline]
    pub fn triangle_positions(&self, f: FaceId) -> [Point3<f64>; 3] {
        let [a, b, c] = self.triangles[f.index()];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Unit normal of a triangle.
    #[inline]
    pub fn triangle_normal(&self, f: FaceId) -> Vector3<f64> {
        self.triangle_normals[f.index()]
    }

    /// Iterate over all triangle IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.triangles.len()).map(FaceId::new)
    }

    // ==================== Geometry ====================

    /// One tight bounding box per triangle, in triangle order.
    pub fn triangle_bounds(&self) -> Vec<Aabb> {
        self.triangles
            .iter()
            .map(|&[a, b, c]| Aabb::from_triangle(&self.vertices[a], &self.vertices[b], &self.vertices[c]))
            .collect()
    }

    /// Bounding box of all vertices, or `None` for a mesh without vertices.
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    /// Area of a triangle.
    pub fn triangle_area(&self, f: FaceId) -> f64 {
        let [p0, p1, p2] = self.triangle_positions(f);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    /// Total surface area.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.triangle_area(f)).sum()
    }

    // ==================== Mutation ====================

    /// Replace the vertex positions, recomputing normals from the winding.
    ///
    /// Any previously supplied normals are discarded.
    ///
    /// # Errors
    /// Fails without modifying the mesh if an existing triangle would refer to
    /// a vertex past the end of the new array.
    pub fn set_vertices(&mut self, vertices: Vec<Point3<f64>>) -> Result<()> {
        validate_triangles(vertices.len(), &self.triangles)?;
        self.triangle_normals = compute_triangle_normals(&vertices, &self.triangles);
        self.vertices = vertices;
        self.generation = next_generation();
        Ok(())
    }

    /// Replace the triangles, recomputing normals from the winding.
    ///
    /// # Errors
    /// Fails without modifying the mesh on out-of-range indices.
    pub fn set_triangles(&mut self, triangles: Vec<[usize; 3]>) -> Result<()> {
        validate_triangles(self.vertices.len(), &triangles)?;
        self.triangle_normals = compute_triangle_normals(&self.vertices, &triangles);
        self.triangles = triangles;
        self.generation = next_generation();
        Ok(())
    }

    /// Reverse the winding of every triangle and negate its normal.
    pub fn invert(&mut self) {
        for tri in &mut self.triangles {
            tri.swap(1, 2);
        }
        for n in &mut self.triangle_normals {
            *n = -*n;
        }
        self.generation = next_generation();
    }
}

/// Largest element count that [`VertexId`] and [`FaceId`] can address;
/// `u32::MAX` itself is the invalid sentinel.
const MAX_ELEMENTS: usize = u32::MAX as usize;

fn check_element_count(name: &'static str, len: usize) -> Result<()> {
    if len > MAX_ELEMENTS {
        return Err(ProximityError::TooManyElements {
            name,
            len,
            max: MAX_ELEMENTS,
        });
    }
    Ok(())
}

fn validate_triangles(num_vertices: usize, triangles: &[[usize; 3]]) -> Result<()> {
    check_element_count("vertices", num_vertices)?;
    check_element_count("triangles", triangles.len())?;
    for (ti, tri) in triangles.iter().enumerate() {
        if let Some(&vertex) = tri.iter().find(|&&vi| vi >= num_vertices) {
            return Err(ProximityError::InvalidVertexIndex { triangle: ti, vertex });
        }
    }
    Ok(())
}

/// Right-hand-rule unit normals; zero for degenerate triangles.
fn compute_triangle_normals(vertices: &[Point3<f64>], triangles: &[[usize; 3]]) -> Vec<Vector3<f64>> {
    triangles
        .iter()
        .map(|tri| triangle_normal(&tri.map(|v| vertices[v])).unwrap_or_else(Vector3::zeros))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> TriangleMesh {
        TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap()
    }

    #[test]
    fn test_derived_normals() {
        let mesh = single_triangle();
        assert_eq!(mesh.triangle_normals()[0], Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(mesh.triangle_area(FaceId::new(0)), 0.5);
    }

    #[test]
    fn test_tiny_triangle_has_unit_normal() {
        for scale in [1e-7, 1e-12, 1e-100] {
            let mesh = TriangleMesh::new(
                vec![
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(scale, 0.0, 0.0),
                    Point3::new(0.0, scale, 0.0),
                ],
                vec![[0, 1, 2]],
            )
            .unwrap();
            assert_eq!(mesh.triangle_normals()[0], Vector3::z(), "scale {}", scale);
        }

        let mesh = TriangleMesh::with_normals(
            vec![Point3::origin(); 3],
            vec![[0, 1, 2]],
            vec![Vector3::new(0.0, 1e-20, 0.0)],
        )
        .unwrap();
        assert_eq!(mesh.triangle_normals()[0], Vector3::y());
    }

    #[test]
    fn test_element_count_limit() {
        assert!(check_element_count("triangles", u32::MAX as usize).is_ok());
        let err = check_element_count("triangles", u32::MAX as usize + 1).unwrap_err();
        assert!(matches!(err, ProximityError::TooManyElements { name: "triangles", .. }));
        assert!(validate_triangles(u32::MAX as usize + 1, &[]).is_err());
    }

    #[test]
    fn test_invalid_index() {
        let err = TriangleMesh::new(vec![Point3::origin(); 3], vec![[0, 1, 3]]).unwrap_err();
        assert!(matches!(
            err,
            ProximityError::InvalidVertexIndex { triangle: 0, vertex: 3 }
        ));
    }

    #[test]
    fn test_supplied_normals_are_normalized() {
        let mesh = TriangleMesh::with_normals(
            vec![Point3::origin(); 3],
            vec![[0, 1, 2]],
            vec![Vector3::new(0.0, 0.0, 5.0)],
        )
        .unwrap();
        assert_eq!(mesh.triangle_normals()[0], Vector3::new(0.0, 0.0, 1.0));

        let err = TriangleMesh::with_normals(vec![Point3::origin(); 3], vec![[0, 1, 2]], vec![])
            .unwrap_err();
        assert!(matches!(err, ProximityError::NormalCountMismatch { .. }));
    }

    #[test]
    fn test_degenerate_triangle_has_zero_normal() {
        let mesh = TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        assert_eq!(mesh.triangle_normals()[0], Vector3::zeros());
    }

    #[test]
    fn test_generation_changes_on_mutation() {
        let mut mesh = single_triangle();
        let copy = mesh.clone();
        assert_eq!(mesh.generation(), copy.generation());

        let g0 = mesh.generation();
        mesh.set_vertices(vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ])
        .unwrap();
        assert_ne!(mesh.generation(), g0);
        assert_eq!(copy.generation(), g0);

        // A failed mutation leaves the stamp alone.
        let g1 = mesh.generation();
        assert!(mesh.set_triangles(vec![[0, 1, 7]]).is_err());
        assert_eq!(mesh.generation(), g1);
    }

    #[test]
    fn test_invert_flips_normals() {
        let mut mesh = single_triangle();
        mesh.invert();
        assert_eq!(mesh.triangles()[0], [0, 2, 1]);
        assert_eq!(mesh.triangle_normals()[0], Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_triangle_bounds() {
        let mesh = single_triangle();
        let bounds = mesh.triangle_bounds();
        assert_eq!(bounds.len(), 1);
        assert_eq!(bounds[0].max, Point3::new(1.0, 1.0, 0.0));
        assert!(TriangleMesh::empty().bounding_box().is_none());
    }
}
