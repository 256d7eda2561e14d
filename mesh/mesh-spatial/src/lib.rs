//! Spatial index for ray queries against a triangle mesh.
//!
//! Wall thickness is estimated by casting a ray from a surface point along
//! its inward normal and measuring the distance to the nearest surface that
//! faces back toward it. Testing every triangle per ray is O(n); this crate
//! builds a bounding volume hierarchy so each query touches only the
//! triangles near the ray.
//!
//! # Algorithm
//!
//! - Triangles are split recursively at the median centroid along the
//!   longest axis until a node holds at most 10 triangles or the depth
//!   reaches 32.
//! - Rays are tested against node boxes with the slab method and against
//!   triangles with Möller–Trumbore. Of two children, the one whose box the
//!   ray enters first is searched first, and its hit bounds the other.
//!
//! # Example
//!
//! ```
//! use mesh_spatial::{Ray, SpatialIndex};
//! use mesh_types::{primitives, Mesh, Point3, Vector3};
//!
//! let mesh = Mesh::from_source(&mut primitives::thin_plate(10.0, 10.0, 0.5)).unwrap();
//! let index = SpatialIndex::build(&mesh);
//!
//! let ray = Ray::new(Point3::new(5.0, 5.0, 3.0), -Vector3::z()).unwrap();
//! let hit = index.cast_ray(&mesh, &ray, 10.0).unwrap();
//! assert!((hit.distance - 2.5).abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bvh;
mod index;
mod ray;

pub use bvh::{BvhParams, BvhStats};
pub use index::{OPPOSING_DOT_THRESHOLD, SpatialIndex};
pub use ray::{MIN_HIT_DISTANCE, Ray, RayHit};
