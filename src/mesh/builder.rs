//! Mesh and point construction from flat arrays.
//!
//! Callers that hold geometry as flat `[x0, y0, z0, x1, ...]` buffers (file
//! readers, FFI, numeric code) go through these functions, which reject
//! malformed shapes before any geometric work starts.

use nalgebra::{Point3, Vector3};

use super::trimesh::TriangleMesh;
use crate::error::{ProximityError, Result};

fn check_width(name: &'static str, len: usize, width: usize) -> Result<()> {
    if len % width != 0 {
        return Err(ProximityError::InvalidShape { name, len, width });
    }
    Ok(())
}

/// Interpret a flat `[n * 3]` buffer as `n` points.
///
/// # Errors
/// Returns [`ProximityError::InvalidShape`] if the length is not a multiple of 3.
///
/// # Example
/// ```
/// use proxima::mesh::points_from_flat;
///
/// let pts = points_from_flat(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// assert_eq!(pts.len(), 2);
/// assert!(points_from_flat(&[0.0, 1.0]).is_err());
/// ```
pub fn points_from_flat(values: &[f64]) -> Result<Vec<Point3<f64>>> {
    check_width("points", values.len(), 3)?;
    Ok(values
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect())
}

/// Interpret rows of arbitrary length as points; every row must have 3 values.
///
/// # Errors
/// Returns [`ProximityError::InvalidShape`] naming the first bad row's length.
pub fn points_from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Vec<Point3<f64>>> {
    rows.iter()
        .map(|row| match row.as_ref() {
            &[x, y, z] => Ok(Point3::new(x, y, z)),
            other => Err(ProximityError::InvalidShape {
                name: "point row",
                len: other.len(),
                width: 3,
            }),
        })
        .collect()
}

/// Flatten points back into an `[n * 3]` buffer.
pub fn points_to_flat(points: &[Point3<f64>]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
}

impl TriangleMesh {
    /// Build a mesh from flat vertex (`[m * 3]`) and index (`[t * 3]`) buffers.
    ///
    /// # Errors
    /// Returns [`ProximityError::InvalidShape`] for buffers that are not a
    /// multiple of 3 long, or [`ProximityError::InvalidVertexIndex`] for
    /// out-of-range indices.
    ///
    /// # Example
    /// ```
    /// use proxima::mesh::TriangleMesh;
    ///
    /// let mesh = TriangleMesh::from_flat(
    ///     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    ///     &[0, 1, 2],
    /// )
    /// .unwrap();
    /// assert_eq!(mesh.num_triangles(), 1);
    /// ```
    pub fn from_flat(vertices: &[f64], triangles: &[usize]) -> Result<Self> {
        let vertices = points_from_flat(vertices)?;
        check_width("triangles", triangles.len(), 3)?;
        let triangles = triangles
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        TriangleMesh::new(vertices, triangles)
    }

    /// Like [`TriangleMesh::from_flat`], with a flat `[t * 3]` normal buffer.
    ///
    /// # Errors
    /// As [`TriangleMesh::from_flat`], plus a shape error for the normals and
    /// [`ProximityError::NormalCountMismatch`].
    pub fn from_flat_with_normals(
        vertices: &[f64],
        triangles: &[usize],
        normals: &[f64],
    ) -> Result<Self> {
        let vertices = points_from_flat(vertices)?;
        check_width("triangles", triangles.len(), 3)?;
        check_width("triangle normals", normals.len(), 3)?;
        let triangles = triangles
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        let normals = normals
            .chunks_exact(3)
            .map(|c| Vector3::new(c[0], c[1], c[2]))
            .collect();
        TriangleMesh::with_normals(vertices, triangles, normals)
    }
}
