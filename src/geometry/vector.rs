//! Small vector helpers shared by the mesh model and the query engines.

use nalgebra::{Point3, Vector3};

/// Relative tolerance: a sum of unit vectors whose length is at or below this
/// fraction of the summed weights is treated as cancelled out.
pub const TOL_ZERO: f64 = 1e-12;

/// Normalize a vector, returning `None` if its length is at or below
/// `threshold` or is not a finite positive number.
///
/// The vector is rescaled by its largest component before taking the norm,
/// so very small vectors do not underflow to zero length.
#[inline]
pub fn unitize_checked(v: &Vector3<f64>, threshold: f64) -> Option<Vector3<f64>> {
    let scale = v.amax();
    if scale.is_nan() || scale <= 0.0 || scale.is_infinite() {
        return None;
    }
    let w = v / scale;
    let len = w.norm();
    if len * scale > threshold {
        Some(w / len)
    } else {
        None
    }
}

/// Normalize a vector, mapping zero, NaN or infinite input to the zero vector.
///
/// No length cutoff applies: any nonzero finite vector keeps its direction,
/// however short it is. The zero vector is what the sign resolver reads as
/// "no orientation information".
#[inline]
pub fn unitize(v: &Vector3<f64>) -> Vector3<f64> {
    unitize_checked(v, 0.0).unwrap_or_else(Vector3::zeros)
}

/// Convert `(azimuth, inclination)` pairs to unit vectors.
pub fn spherical_to_vector(spherical: &[[f64; 2]]) -> Vec<Vector3<f64>> {
    spherical
        .iter()
        .map(|&[theta, phi]| {
            let (st, ct) = theta.sin_cos();
            let (sp, cp) = phi.sin_cos();
            Vector3::new(ct * sp, st * sp, cp)
        })
        .collect()
}

/// `count` evenly spaced points on the unit circle in the XY plane,
/// starting on the +X axis.
pub fn points_on_circle(count: usize) -> Vec<Point3<f64>> {
    let step = std::f64::consts::TAU / count.max(1) as f64;
    let angles: Vec<[f64; 2]> = (0..count)
        .map(|i| [i as f64 * step, std::f64::consts::FRAC_PI_2])
        .collect();
    spherical_to_vector(&angles)
        .into_iter()
        .map(Point3::from)
        .collect()
}
