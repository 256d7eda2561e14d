//! Synthetic triangle sources.
//!
//! Closed, outward-wound solids used by tests, benchmarks and examples.
//! Each generator returns a [`SoupSource`] with zero supplied normals, so
//! the loader derives every normal from the winding.

use std::f64::consts::TAU;

use nalgebra::Point3;

use crate::source::{SoupSource, TriangleRecord};

/// Axis-aligned box spanning `min` to `max`: 12 triangles, 8 corners.
#[must_use]
pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> SoupSource {
    const FACES: [[usize; 3]; 12] = [
        // -Z
        [0, 2, 3],
        [0, 3, 1],
        // +Z
        [4, 5, 7],
        [4, 7, 6],
        // -Y
        [0, 1, 5],
        [0, 5, 4],
        // +Y
        [2, 6, 7],
        [2, 7, 3],
        // -X
        [0, 4, 6],
        [0, 6, 2],
        // +X
        [1, 3, 7],
        [1, 7, 5],
    ];

    let corner = |i: usize| {
        Point3::new(
            if i & 1 == 0 { min.x } else { max.x },
            if i & 2 == 0 { min.y } else { max.y },
            if i & 4 == 0 { min.z } else { max.z },
        )
    };

    FACES
        .iter()
        .map(|&[a, b, c]| TriangleRecord::from_vertices(corner(a), corner(b), corner(c)))
        .collect()
}

/// Flat plate of `width` × `depth` and the given `thickness`, resting on z = 0.
#[must_use]
pub fn thin_plate(width: f64, depth: f64, thickness: f64) -> SoupSource {
    cuboid(Point3::origin(), Point3::new(width, depth, thickness))
}

/// Capped cylinder standing on z = 0 with its axis along +Z.
///
/// The side is approximated with `segments` quads (at least 3).
#[must_use]
pub fn cylinder(radius: f64, height: f64, segments: usize) -> SoupSource {
    let segments = segments.max(3);
    #[allow(clippy::cast_precision_loss)]
    let ring = |i: usize, z: f64| {
        let theta = TAU * (i % segments) as f64 / segments as f64;
        Point3::new(radius * theta.cos(), radius * theta.sin(), z)
    };

    let bottom_center = Point3::origin();
    let top_center = Point3::new(0.0, 0.0, height);

    let mut soup = SoupSource::default();
    for i in 0..segments {
        let (b0, b1) = (ring(i, 0.0), ring(i + 1, 0.0));
        let (t0, t1) = (ring(i, height), ring(i + 1, height));

        soup.push(TriangleRecord::from_vertices(b0, b1, t1));
        soup.push(TriangleRecord::from_vertices(b0, t1, t0));
        soup.push(TriangleRecord::from_vertices(bottom_center, b1, b0));
        soup.push(TriangleRecord::from_vertices(top_center, t0, t1));
    }
    soup
}
