//! STL (stereolithography) format support.
//!
//! Binary and ASCII files are both accepted on load. Vertices shared between
//! facets are merged by exact position, so adjacent triangles share vertex
//! indices and therefore edge and vertex pseudonormals. Facet normals stored
//! in the file are ignored; normals are recomputed from the winding.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use log::debug;
use nalgebra::Point3;

use crate::error::{ProximityError, Result};
use crate::mesh::TriangleMesh;

/// Load a mesh from an STL file.
///
/// Degenerate facets are kept; the query engines handle them.
///
/// # Example
///
/// ```no_run
/// use proxima::io::stl;
///
/// let mesh = stl::load("model.stl").unwrap();
/// println!("{} triangles", mesh.num_triangles());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| ProximityError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let vertices: Vec<Point3<f64>> = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();
    let triangles: Vec<[usize; 3]> = stl.faces.iter().map(|f| f.vertices).collect();

    debug!(
        "loaded {}: {} vertices, {} triangles",
        path.display(),
        vertices.len(),
        triangles.len()
    );

    TriangleMesh::new(vertices, triangles).map_err(|e| ProximityError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Save a mesh to a binary STL file.
///
/// Coordinates are narrowed to `f32`, as the format requires.
pub fn save<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let to_vertex = |p: &Point3<f64>| stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32]);

    let triangles: Vec<stl_io::Triangle> = mesh
        .face_ids()
        .map(|f| {
            let [p0, p1, p2] = mesh.triangle_positions(f);
            let n = mesh.triangle_normal(f);
            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [to_vertex(&p0), to_vertex(&p1), to_vertex(&p2)],
            }
        })
        .collect();

    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| ProximityError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("proxima-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_roundtrip_shares_vertices() {
        let mesh = TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.5),
            ],
            vec![[0, 1, 2], [1, 3, 2]],
        )
        .unwrap();

        let path = temp_path("roundtrip.stl");
        save(&mesh, &path).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_triangles(), 2);
        assert_eq!(loaded.num_vertices(), 4);
        assert!((loaded.surface_area() - mesh.surface_area()).abs() < 1e-6);
    }

    #[test]
    fn test_missing_file() {
        let err = load(temp_path("does-not-exist.stl")).unwrap_err();
        assert!(matches!(err, ProximityError::Io(_)));
    }
}
