//! Printability toolkit for 3D printing.
//!
//! This umbrella crate re-exports the mesh-* crates and adds [`Analyzer`],
//! a handle that owns a mesh together with its optional spatial index.
//!
//! # Quick Start
//!
//! ```no_run
//! use mesh::prelude::*;
//!
//! let mut analyzer = Analyzer::new();
//! analyzer.load_stl("model.stl").unwrap();
//! analyzer.build_spatial_index();
//!
//! let report = analyzer.printability_report(45.0, 0.8);
//! println!("{report}");
//!
//! let orientation = analyzer.auto_orient(26, 45.0);
//! if orientation.is_improvement() {
//!     analyzer.apply_orientation(&orientation);
//!     analyzer.save_stl("model_oriented.stl").unwrap();
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - `Mesh`, `Triangle`, `Aabb`, triangle sources and primitives
//! - [`io`] - STL reading and writing, STEP import boundary
//! - [`spatial`] - BVH spatial index and opposing-surface queries
//! - [`printability`] - Overhangs, wall thickness, scoring, orientation search

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod analyzer;

pub use analyzer::Analyzer;

// =============================================================================
// Re-exports
// =============================================================================

/// Core data structures: `Mesh`, `Triangle`, `Aabb`, triangle sources.
pub use mesh_types as types;

/// STL and STEP triangle sources.
pub use mesh_io as io;

/// BVH spatial index.
pub use mesh_spatial as spatial;

/// Overhang and thin-wall analysis, scoring, orientation search.
pub use mesh_printability as printability;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for printability analysis.
///
/// ```
/// use mesh::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Analyzer;

    // Core types
    pub use mesh_types::{
        Aabb, Mesh, MeshBounds, MeshError, MeshResult, MeshTopology, SoupSource, Triangle,
        TriangleRecord, TriangleSource,
    };

    // I/O
    pub use mesh_io::{StepImporter, StlReader, load_stl, save_stl};

    // Spatial
    pub use mesh_spatial::SpatialIndex;

    // Printability
    pub use mesh_printability::{
        OrientationParams, OrientationResult, PrintTechnology, PrintabilityReport, PrinterConfig,
        build_axis_rotation, find_optimal_orientation, printability_report,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prelude_imports() {
        use prelude::*;

        let mesh = Mesh::new();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(PrintabilityReport::default().score, 100.0);
    }

    #[test]
    fn module_reexports() {
        let _ = types::Mesh::new();
        let _ = spatial::BvhParams::default();
        let _ = printability::PrinterConfig::default();
        let _ = io::StepImporter::new("part.step");
    }
}
