//! Rays and the primitive intersection tests.

use mesh_types::{Aabb, Point3, Triangle, Vector3};

/// Hits closer than this to the ray origin are ignored (self-intersection).
pub const MIN_HIT_DISTANCE: f64 = 1e-9;

/// Determinant below which a ray counts as parallel to a triangle.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Barycentric slack so rays through shared edges still register a hit.
const BARYCENTRIC_TOLERANCE: f64 = 1e-9;

/// A half-line with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Point3<f64>,
    /// Unit direction.
    pub direction: Vector3<f64>,
    inv_direction: Vector3<f64>,
}

impl Ray {
    /// Create a ray, normalizing `direction`.
    ///
    /// Returns `None` if `direction` is zero or not finite.
    #[must_use]
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Option<Self> {
        let direction = direction.try_normalize(f64::EPSILON)?;
        if !direction.iter().all(|c| c.is_finite()) {
            return None;
        }
        let inv = |c: f64| if c.abs() > f64::EPSILON { 1.0 / c } else { f64::MAX };
        Some(Self {
            origin,
            direction,
            inv_direction: Vector3::new(inv(direction.x), inv(direction.y), inv(direction.z)),
        })
    }

    /// Point at distance `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// Slab test against a box.
    ///
    /// Returns the entry and exit distances, with entry clamped to 0 when
    /// the origin is inside.
    #[must_use]
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<(f64, f64)> {
        let o = &self.origin;
        let inv = &self.inv_direction;

        let t1 = (aabb.min.x - o.x) * inv.x;
        let t2 = (aabb.max.x - o.x) * inv.x;
        let t3 = (aabb.min.y - o.y) * inv.y;
        let t4 = (aabb.max.y - o.y) * inv.y;
        let t5 = (aabb.min.z - o.z) * inv.z;
        let t6 = (aabb.max.z - o.z) * inv.z;

        let t_min = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
        let t_max = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

        if t_max >= t_min && t_max >= 0.0 {
            Some((t_min.max(0.0), t_max))
        } else {
            None
        }
    }

    /// Möller–Trumbore intersection.
    ///
    /// Returns the hit distance if it exceeds [`MIN_HIT_DISTANCE`]. Both
    /// sides of the triangle are hit.
    #[must_use]
    #[allow(clippy::many_single_char_names)]
    pub fn intersect_triangle(&self, tri: &Triangle) -> Option<f64> {
        let edge1 = tri.v1 - tri.v0;
        let edge2 = tri.v2 - tri.v0;

        let h = self.direction.cross(&edge2);
        let a = edge1.dot(&h);
        if a.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = self.origin - tri.v0;
        let u = f * s.dot(&h);
        if !(-BARYCENTRIC_TOLERANCE..=1.0 + BARYCENTRIC_TOLERANCE).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * self.direction.dot(&q);
        if v < -BARYCENTRIC_TOLERANCE || u + v > 1.0 + BARYCENTRIC_TOLERANCE {
            return None;
        }

        let t = f * edge2.dot(&q);
        (t > MIN_HIT_DISTANCE).then_some(t)
    }
}

/// The closest accepted intersection of a ray with the mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin.
    pub distance: f64,
    /// Index of the face that was hit.
    pub face: usize,
    /// Intersection point.
    pub point: Point3<f64>,
}
