//! Axis-aligned bounding boxes.

use nalgebra::Point3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3<f64>,
    /// Maximum corner of the bounding box.
    pub max: Point3<f64>,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    /// Create an empty (inverted) bounding box.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    /// Create a bounding box from min and max points.
    #[must_use]
    pub fn from_min_max(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// A zero-volume box around a single point.
    #[must_use]
    pub fn from_point(p: &Point3<f64>) -> Self {
        Self { min: *p, max: *p }
    }

    /// The tight box around a triangle.
    #[must_use]
    pub fn from_triangle(v0: &Point3<f64>, v1: &Point3<f64>, v2: &Point3<f64>) -> Self {
        Self {
            min: v0.inf(v1).inf(v2),
            max: v0.sup(v1).sup(v2),
        }
    }

    /// The tight box around a set of points, or `None` if there are none.
    #[must_use]
    pub fn from_points<'a, It>(points: It) -> Option<Self>
    where
        It: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::from_point(first);
        for p in iter {
            bbox.expand_point(p);
        }
        Some(bbox)
    }

    /// Expand this bounding box to include another.
    pub fn expand(&mut self, other: &Self) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// Expand this bounding box to include a point.
    pub fn expand_point(&mut self, point: &Point3<f64>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Get the center of this bounding box.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Get the extent (size) along each axis.
    #[must_use]
    pub fn extent(&self) -> [f64; 3] {
        [
            self.max.x - self.min.x,
            self.max.y - self.min.y,
            self.max.z - self.min.z,
        ]
    }

    /// Get the index of the longest axis (0=X, 1=Y, 2=Z).
    #[must_use]
    pub fn longest_axis(&self) -> usize {
        let [dx, dy, dz] = self.extent();
        if dx >= dy && dx >= dz {
            0
        } else if dy >= dz {
            1
        } else {
            2
        }
    }

    /// Check if this bounding box is valid (non-empty).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Squared distance from `point` to the closest point of the box.
    ///
    /// Zero for points inside. Never larger than the squared distance from
    /// `point` to anything contained in the box, so it is a valid lower bound
    /// for pruning nearest-neighbour searches.
    #[must_use]
    #[inline]
    pub fn distance_squared(&self, point: &Point3<f64>) -> f64 {
        let mut d = 0.0;
        for i in 0..3 {
            let v = point[i];
            let excess = if v < self.min[i] {
                self.min[i] - v
            } else if v > self.max[i] {
                v - self.max[i]
            } else {
                0.0
            };
            d += excess * excess;
        }
        d
    }
}
