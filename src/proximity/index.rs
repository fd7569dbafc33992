//! Reusable proximity index.

use std::sync::OnceLock;

use log::debug;
use nalgebra::Point3;

use super::accelerated::{closest_point_impl, nearest_vertex_impl, triangle_bvh, vertex_bvh};
use super::sign::{signed_distance_impl, Pseudonormals};
use super::{NearestResult, QueryOptions};
use crate::error::{ProximityError, Result};
use crate::mesh::{TriangleMesh, VertexId};
use crate::spatial::Bvh;

/// Acceleration data for repeated queries against one mesh.
///
/// The triangle BVH is built eagerly. The vertex BVH and the pseudonormals
/// are built on first use. The index remembers the mesh's generation stamp;
/// queries against a mesh with a different stamp (a different mesh, or the
/// same mesh after a mutation) fail with [`ProximityError::StaleIndex`]
/// instead of answering from outdated data.
///
/// # Example
///
/// ```
/// use proxima::prelude::*;
/// use nalgebra::Point3;
///
/// let mut mesh = TriangleMesh::from_flat(
///     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
///     &[0, 1, 2],
/// )
/// .unwrap();
/// let index = ProximityIndex::build(&mesh, &QueryOptions::default()).unwrap();
/// let result = index.closest_point(&mesh, &[Point3::new(0.1, 0.1, 1.0)]).unwrap();
/// assert_eq!(result.distances[0], 1.0);
///
/// mesh.invert();
/// assert!(index.closest_point(&mesh, &[Point3::origin()]).is_err());
/// ```
#[derive(Debug)]
pub struct ProximityIndex {
    bvh: Bvh,
    vertex_bvh: OnceLock<Bvh>,
    pseudonormals: OnceLock<Pseudonormals>,
    generation: u64,
    options: QueryOptions,
}

impl ProximityIndex {
    /// Build the index for `mesh`.
    ///
    /// # Errors
    /// Returns an error if the options are invalid.
    pub fn build(mesh: &TriangleMesh, options: &QueryOptions) -> Result<Self> {
        options.validate()?;
        let bvh = triangle_bvh(mesh, options);
        debug!(
            "proximity index: {} triangles, generation {}",
            bvh.len(),
            mesh.generation()
        );
        Ok(Self {
            bvh,
            vertex_bvh: OnceLock::new(),
            pseudonormals: OnceLock::new(),
            generation: mesh.generation(),
            options: options.clone(),
        })
    }

    /// Generation stamp of the mesh the index was built from.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The triangle BVH.
    #[inline]
    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Options the index was built with; queries use them too.
    #[inline]
    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Whether the index still matches `mesh`.
    #[inline]
    pub fn is_current(&self, mesh: &TriangleMesh) -> bool {
        mesh.generation() == self.generation
    }

    fn check(&self, mesh: &TriangleMesh) -> Result<()> {
        if self.is_current(mesh) {
            Ok(())
        } else {
            Err(ProximityError::StaleIndex {
                built: self.generation,
                current: mesh.generation(),
            })
        }
    }

    /// Pseudonormals of `mesh`, computed on first call.
    ///
    /// # Errors
    /// Returns [`ProximityError::StaleIndex`] if `mesh` changed since the build.
    pub fn pseudonormals(&self, mesh: &TriangleMesh) -> Result<&Pseudonormals> {
        self.check(mesh)?;
        Ok(self.pseudonormals.get_or_init(|| Pseudonormals::compute(mesh)))
    }

    /// Closest point on the mesh for each query point.
    ///
    /// # Errors
    /// Returns [`ProximityError::StaleIndex`] if `mesh` changed since the build.
    pub fn closest_point(&self, mesh: &TriangleMesh, points: &[Point3<f64>]) -> Result<NearestResult> {
        self.check(mesh)?;
        Ok(closest_point_impl(mesh, &self.bvh, points, &self.options))
    }

    /// Signed distance for each query point, positive inside.
    ///
    /// # Errors
    /// Returns [`ProximityError::StaleIndex`] if `mesh` changed since the build.
    pub fn signed_distance(&self, mesh: &TriangleMesh, points: &[Point3<f64>]) -> Result<Vec<f64>> {
        let pseudonormals = self.pseudonormals(mesh)?;
        Ok(signed_distance_impl(mesh, &self.bvh, pseudonormals, points, &self.options))
    }

    /// Nearest vertex for each query point, as `(distances, vertex_ids)`.
    ///
    /// # Errors
    /// Returns [`ProximityError::StaleIndex`] if `mesh` changed since the build.
    pub fn nearest_vertex(
        &self,
        mesh: &TriangleMesh,
        points: &[Point3<f64>],
    ) -> Result<(Vec<f64>, Vec<VertexId>)> {
        self.check(mesh)?;
        let bvh = self.vertex_bvh.get_or_init(|| vertex_bvh(mesh, &self.options));
        Ok(nearest_vertex_impl(bvh, points, self.options.parallel))
    }
}
