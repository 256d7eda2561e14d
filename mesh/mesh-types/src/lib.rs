//! Core mesh types for printability analysis.
//!
//! This crate provides the foundational types shared by the loaders, the
//! spatial index and the analyzers:
//!
//! - [`Mesh`] - A welded, immutable triangle mesh with per-face normals
//! - [`TriangleSource`] - The capability a mesh is loaded from
//! - [`Triangle`] - A concrete triangle with vertex positions
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! # Units
//!
//! Coordinates are `f64` and unit-agnostic. The analyzers downstream
//! assume millimeters when reporting areas and wall thicknesses.
//!
//! # Coordinate System
//!
//! Uses a **right-handed coordinate system** with +Z as the build
//! direction. Face winding is **counter-clockwise (CCW) when viewed from
//! outside**; normals point outward by the right-hand rule.
//!
//! # Example
//!
//! ```
//! use mesh_types::{primitives, Mesh, MeshTopology};
//!
//! let mut source = primitives::cuboid(
//!     mesh_types::Point3::new(0.0, 0.0, 0.0),
//!     mesh_types::Point3::new(10.0, 10.0, 10.0),
//! );
//! let mesh = Mesh::from_source(&mut source).unwrap();
//!
//! assert_eq!(mesh.triangle_count(), 12);
//! assert!(mesh.is_watertight());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bounds;
mod error;
mod mesh;
pub mod primitives;
mod source;
mod traits;
mod triangle;

pub use bounds::Aabb;
pub use error::{MeshError, MeshResult};
pub use mesh::{Face, Mesh, MIN_NORMAL_LENGTH};
pub use source::{SoupSource, TriangleRecord, TriangleSource};
pub use traits::{MeshBounds, MeshTopology};
pub use triangle::{Triangle, DEGENERATE_EPSILON};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, UnitQuaternion, Vector3};
