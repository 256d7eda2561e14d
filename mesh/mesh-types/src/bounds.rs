//! Axis-aligned bounding box.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned box between two corners.
///
/// Used for the mesh's overall extent (its diagonal bounds thin-wall ray
/// queries) and for spatial index nodes. The empty box has `min` at +∞ and
/// `max` at −∞ so growing it by any point yields that point.
///
/// # Example
///
/// ```
/// use mesh_types::{Aabb, Point3};
///
/// let plate = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 0.1));
/// assert_eq!(plate.longest_axis(), 0);
/// assert!((plate.diagonal() - 200.01_f64.sqrt()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Lower corner.
    pub min: Point3<f64>,
    /// Upper corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Box spanning two opposite corners, given in any order.
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// The box containing nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::from(Vector3::repeat(f64::INFINITY)),
            max: Point3::from(Vector3::repeat(f64::NEG_INFINITY)),
        }
    }

    /// Tightest box around `points`; empty if there are none.
    #[must_use]
    pub fn from_points<'a>(points: impl Iterator<Item = &'a Point3<f64>>) -> Self {
        points.fold(Self::empty(), |mut acc, p| {
            acc.expand_to_include(p);
            acc
        })
    }

    /// Whether the box contains no point at all. A single-point box is not empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.min[axis] > self.max[axis])
    }

    /// Extent along each axis; zero for the empty box.
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        if self.is_empty() {
            Vector3::zeros()
        } else {
            self.max - self.min
        }
    }

    /// Midpoint of the two corners.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Corner-to-corner length; zero for the empty box.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        self.size().norm()
    }

    /// Axis (0 = X, 1 = Y, 2 = Z) with the largest extent, lowest on ties.
    #[must_use]
    pub fn longest_axis(&self) -> usize {
        let size = self.size();
        (1..3).fold(0, |best, axis| if size[axis] > size[best] { axis } else { best })
    }

    /// Whether `point` lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        (0..3).all(|axis| (self.min[axis]..=self.max[axis]).contains(&point[axis]))
    }

    /// Smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Grow in place to cover `point`.
    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn corners_in_any_order() {
        let a = Aabb::new(Point3::new(5.0, 0.0, 3.0), Point3::new(0.0, 5.0, 0.0));
        assert_eq!(a.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(a.max, Point3::new(5.0, 5.0, 3.0));
        assert_eq!(a.center(), Point3::new(2.5, 2.5, 1.5));
    }

    #[test]
    fn empty_box() {
        let empty = Aabb::default();
        assert!(empty.is_empty());
        assert_eq!(empty.size(), Vector3::zeros());
        assert_relative_eq!(empty.diagonal(), 0.0);
        assert!(!empty.contains(&Point3::origin()));
        assert_eq!(empty.union(&Aabb::new(Point3::origin(), Point3::origin())).max, Point3::origin());
    }

    #[test]
    fn grows_around_points() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 5.0, 3.0),
            Point3::new(-2.0, 8.0, 1.0),
        ];
        let bounds = Aabb::from_points(points.iter());
        assert_eq!(bounds.min, Point3::new(-2.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(10.0, 8.0, 3.0));
        assert!(points.iter().all(|p| bounds.contains(p)));

        let point = Aabb::from_points(std::iter::once(&points[1]));
        assert!(!point.is_empty());
        assert_relative_eq!(point.diagonal(), 0.0);
    }

    #[test]
    fn longest_axis_prefers_lower_on_ties() {
        let cube = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let tall = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 3.0));
        let deep = Aabb::new(Point3::origin(), Point3::new(1.0, 3.0, 3.0));
        assert_eq!(cube.longest_axis(), 0);
        assert_eq!(tall.longest_axis(), 2);
        assert_eq!(deep.longest_axis(), 1);
    }
}
