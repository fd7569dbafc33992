//! Exact closest point on a single triangle.
//!
//! The classification follows the Voronoi regions of a triangle as laid out
//! in Ericson, "Real-Time Collision Detection", §5.1.5: three vertex regions,
//! three edge regions, and the face interior. Unlike the textbook version the
//! result also reports *which* region produced the point, because the sign
//! resolver needs to know whether the nearest feature is a face, an edge or a
//! vertex.
//!
//! Zero-area triangles (collinear or coincident corners) have no interior;
//! they are detected up front and handled as the union of their three edges.

use nalgebra::{Point3, Vector3};

use super::vector::unitize_checked;

/// `sin²` of the corner angle below which a triangle is treated as degenerate.
const DEGENERATE_SIN2: f64 = 1e-20;

/// Squared segment lengths at or below this are treated as a single point.
const MIN_SEGMENT_LENGTH2: f64 = f64::MIN_POSITIVE;

/// The geometric feature of a triangle that contains a closest point.
///
/// Edge `i` joins corner `i` and corner `(i + 1) % 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Strictly inside the face.
    Interior,
    /// On edge `i`, excluding its endpoints.
    Edge(usize),
    /// On corner `i`.
    Vertex(usize),
}

impl Region {
    /// The two corner slots (in triangle order) of an edge region.
    #[inline]
    pub fn edge_corners(i: usize) -> (usize, usize) {
        (i, (i + 1) % 3)
    }
}

/// A closest point together with the region that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint {
    /// The closest point on the triangle.
    pub point: Point3<f64>,
    /// The feature the point lies on.
    pub region: Region,
}

/// Compute the closest point on a filled triangle to a query point.
///
/// Always returns a finite point for finite input, including for degenerate
/// triangles.
///
/// # Example
///
/// ```
/// use proxima::geometry::{closest_point_on_triangle, Region};
/// use nalgebra::Point3;
///
/// let tri = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let hit = closest_point_on_triangle(&Point3::new(0.25, 0.25, 2.0), &tri);
/// assert_eq!(hit.region, Region::Interior);
/// assert_eq!(hit.point, Point3::new(0.25, 0.25, 0.0));
/// ```
#[must_use]
pub fn closest_point_on_triangle(p: &Point3<f64>, tri: &[Point3<f64>; 3]) -> ClosestPoint {
    let [a, b, c] = tri;
    let ab = b - a;
    let ac = c - a;

    if is_flat_corner(&ab, &ac) {
        return closest_point_on_degenerate(p, tri);
    }

    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return ClosestPoint { point: *a, region: Region::Vertex(0) };
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return ClosestPoint { point: *b, region: Region::Vertex(1) };
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let t = d1 / (d1 - d3);
        return on_edge(0, t, a + ab * t);
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return ClosestPoint { point: *c, region: Region::Vertex(2) };
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let t = d2 / (d2 - d6);
        return on_edge(2, 1.0 - t, a + ac * t);
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let t = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return on_edge(1, t, b + (c - b) * t);
    }

    // va + vb + vc == |ab x ac|^2, nonzero past the degeneracy check.
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    ClosestPoint { point: a + ab * v + ac * w, region: Region::Interior }
}

/// Whether the corner spanned by `ab` and `ac` is too flat to define a plane.
///
/// Each edge is rescaled by its largest component first, so the test depends
/// only on the corner angle and never on the size of the triangle. Zero or
/// non-finite edges count as flat.
fn is_flat_corner(ab: &Vector3<f64>, ac: &Vector3<f64>) -> bool {
    let u = ab / ab.amax();
    let v = ac / ac.amax();
    !(u.cross(&v).norm_squared() > DEGENERATE_SIN2 * u.norm_squared() * v.norm_squared())
}

/// Right-hand-rule unit normal of a triangle, or `None` if it has zero area.
///
/// Uses the same flatness test as [`closest_point_on_triangle`], so a
/// triangle has a normal exactly when it has an interior region.
///
/// ```
/// use proxima::geometry::triangle_normal;
/// use nalgebra::{Point3, Vector3};
///
/// let tiny = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1e-9, 0.0, 0.0),
///     Point3::new(0.0, 1e-9, 0.0),
/// ];
/// assert_eq!(triangle_normal(&tiny), Some(Vector3::z()));
///
/// let flat = [Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
/// assert_eq!(triangle_normal(&flat), None);
/// ```
pub fn triangle_normal(tri: &[Point3<f64>; 3]) -> Option<Vector3<f64>> {
    let [a, b, c] = tri;
    let ab = b - a;
    let ac = c - a;
    if is_flat_corner(&ab, &ac) {
        return None;
    }
    unitize_checked(&(ab / ab.amax()).cross(&(ac / ac.amax())), 0.0)
}

/// Edge `i` hit at parameter `t` from its first corner to its second.
///
/// A parameter landing exactly on an end is reported as that corner.
#[inline]
fn on_edge(i: usize, t: f64, point: Point3<f64>) -> ClosestPoint {
    let (s, e) = Region::edge_corners(i);
    let region = if t <= 0.0 {
        Region::Vertex(s)
    } else if t >= 1.0 {
        Region::Vertex(e)
    } else {
        Region::Edge(i)
    };
    ClosestPoint { point, region }
}

/// Closest point on segment `a -> b`, with the clamped parameter.
#[inline]
fn closest_on_segment(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> (Point3<f64>, f64) {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 <= MIN_SEGMENT_LENGTH2 {
        return (*a, 0.0);
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (a + ab * t, t)
}

/// Zero-area triangles: the best of the three edge segments.
fn closest_point_on_degenerate(p: &Point3<f64>, tri: &[Point3<f64>; 3]) -> ClosestPoint {
    let mut best: Option<(f64, ClosestPoint)> = None;

    for i in 0..3 {
        let (s, e) = Region::edge_corners(i);
        let (point, t) = closest_on_segment(p, &tri[s], &tri[e]);
        let region = if t <= 0.0 {
            Region::Vertex(s)
        } else if t >= 1.0 {
            Region::Vertex(e)
        } else {
            Region::Edge(i)
        };
        let d2 = (p - point).norm_squared();
        if best.map_or(true, |(bd, _)| d2 < bd) {
            best = Some((d2, ClosestPoint { point, region }));
        }
    }

    match best {
        Some((_, hit)) => hit,
        None => ClosestPoint { point: tri[0], region: Region::Vertex(0) },
    }
}
