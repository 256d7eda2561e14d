//! Printability analysis for additive manufacturing.
//!
//! Given a [`Mesh`](mesh_types::Mesh) and, optionally, a
//! [`SpatialIndex`](mesh_spatial::SpatialIndex) built for it, this crate
//! answers two questions:
//!
//! - **How printable is the mesh as oriented?** [`printability_report`]
//!   classifies overhanging faces against the build direction, counts
//!   vertices whose wall is thinner than a minimum, and folds both into a
//!   0–100 score.
//! - **Which way up should it print?** [`find_optimal_orientation`] scores
//!   candidate build directions by overhang area and returns the best one,
//!   without modifying the mesh.
//!
//! # Example
//!
//! ```
//! use mesh_printability::{PrinterConfig, analyze, find_optimal_orientation};
//! use mesh_spatial::SpatialIndex;
//! use mesh_types::{Mesh, primitives};
//!
//! let mesh = Mesh::from_source(&mut primitives::cylinder(5.0, 20.0, 32)).unwrap();
//! let index = SpatialIndex::build(&mesh);
//!
//! let config = PrinterConfig::fdm_default();
//! let report = analyze(&mesh, Some(&index), &config);
//! println!("{report}");
//!
//! let orientation = find_optimal_orientation(&mesh, config.orientation_samples, 45.0);
//! assert!((orientation.optimal_up_vector.norm() - 1.0).abs() < 1e-9);
//! ```
//!
//! # Overhangs
//!
//! A face overhangs when `dot(normal, up) < -sin(critical_angle)`, with the
//! angle clamped to [0°, 90°]. Raising the angle can only shrink the set of
//! overhanging faces.
//!
//! # Thin walls
//!
//! Each vertex looks along its inward normal for the nearest surface facing
//! back at it. Vertices with no such surface are never thin. Without a
//! current index, thin walls are not measured and count as zero.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod analysis;
mod config;
mod error;
mod orientation;
mod overhang;
mod report;
mod thickness;

pub use analysis::{analyze, printability_report, printability_report_for_up};
pub use config::{
    DEFAULT_CRITICAL_ANGLE, DEFAULT_MIN_WALL_THICKNESS, DEFAULT_ORIENTATION_SAMPLES,
    PrintTechnology, PrinterConfig,
};
pub use error::{PrintabilityError, PrintabilityResult};
pub use orientation::{
    CANONICAL_DIRECTIONS, OrientationParams, OrientationResult, build_axis_rotation,
    find_optimal_orientation, find_optimal_orientation_with, generate_candidates,
};
pub use overhang::{OverhangStats, overhang_faces, overhang_stats, overhang_threshold};
pub use report::{PERFECT_SCORE, PrintabilityReport, compute_score};
pub use thickness::{ThicknessAnalysis, analyze_thickness};
