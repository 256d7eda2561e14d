//! Triangles with concrete corner positions.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Aabb;

/// Squared cross-product length at or below which a face counts as degenerate.
///
/// Roughly an area of `5e-13` square units.
pub const DEGENERATE_EPSILON: f64 = 1e-24;

/// Three corner positions of a face.
///
/// The mesh stores faces as vertex indices; `Triangle` is what overhang
/// classification, thickness rays and the BVH work on. Corners are
/// counter-clockwise when seen from outside, so the right-hand normal points
/// away from the solid.
///
/// ```
/// use mesh_types::{Point3, Triangle};
///
/// // A face looking straight down at the build plate.
/// let ceiling = Triangle::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(0.0, 10.0, 0.0),
///     Point3::new(10.0, 0.0, 0.0),
/// );
/// assert!((ceiling.area() - 50.0).abs() < 1e-12);
/// assert!(ceiling.normal().is_some_and(|n| n.z < -0.999));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triangle {
    /// Corner 0.
    pub v0: Point3<f64>,
    /// Corner 1.
    pub v1: Point3<f64>,
    /// Corner 2.
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Face from three corners.
    #[inline]
    #[must_use]
    pub const fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Shorthand for tests and fixtures.
    #[must_use]
    pub fn from_arrays(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Self {
        Self::new(a.into(), b.into(), c.into())
    }

    /// `(v1 - v0) × (v2 - v0)`. Its length is twice the area.
    #[inline]
    #[must_use]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Outward unit normal, or `None` when the face is degenerate.
    #[must_use]
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let cross = self.normal_unnormalized();
        (cross.norm_squared() > DEGENERATE_EPSILON).then(|| cross.normalize())
    }

    /// Surface area.
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        0.5 * self.normal_unnormalized().norm()
    }

    /// Mean of the three corners.
    #[inline]
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }

    /// True for collinear or coincident corners. Such faces carry no normal
    /// and are skipped by area and overhang sums.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.normal().is_none()
    }

    /// Box around the three corners.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points([self.v0, self.v1, self.v2].iter())
    }
}
