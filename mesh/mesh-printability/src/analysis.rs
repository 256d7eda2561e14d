//! Printability report: overhangs, thin walls and the combined score.

use mesh_spatial::SpatialIndex;
use mesh_types::{Mesh, MeshTopology, Vector3};
use nalgebra::Unit;
use tracing::{debug, warn};

use crate::config::PrinterConfig;
use crate::overhang::overhang_stats;
use crate::report::{PrintabilityReport, compute_score};
use crate::thickness::analyze_thickness;

/// Analyze `mesh` as it is currently oriented (build direction +Z).
///
/// Thin walls are only measured when `index` is given and was built for the
/// mesh's current revision; otherwise `thin_wall_vertex_count` is 0 and a
/// warning is logged. The result depends only on the mesh and index, so
/// repeated calls return identical reports.
///
/// # Example
///
/// ```
/// use mesh_printability::printability_report;
/// use mesh_types::{Mesh, Point3, SoupSource, TriangleRecord, Vector3};
///
/// let mut soup = SoupSource::new(vec![TriangleRecord::new(
///     -Vector3::z(),
///     [
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///     ],
/// )]);
/// let mesh = Mesh::from_source(&mut soup).unwrap();
///
/// let report = printability_report(&mesh, None, 45.0, 0.8);
/// assert_eq!(report.overhang_percentage, 100.0);
/// assert!(report.score < 90.0);
/// ```
#[must_use]
pub fn printability_report(
    mesh: &Mesh,
    index: Option<&SpatialIndex>,
    critical_angle_deg: f64,
    min_wall_thickness: f64,
) -> PrintabilityReport {
    printability_report_for_up(mesh, index, &Vector3::z_axis(), critical_angle_deg, min_wall_thickness)
}

/// Analyze `mesh` as if it were printed with `up` as the build direction.
///
/// Only overhang classification depends on `up`; wall thickness is a
/// property of the geometry alone.
#[must_use]
pub fn printability_report_for_up(
    mesh: &Mesh,
    index: Option<&SpatialIndex>,
    up: &Unit<Vector3<f64>>,
    critical_angle_deg: f64,
    min_wall_thickness: f64,
) -> PrintabilityReport {
    if mesh.is_empty() {
        return PrintabilityReport::default();
    }

    let overhang = overhang_stats(mesh, up, critical_angle_deg);
    let overhang_percentage = overhang.percentage();

    let thin_wall_vertex_count = match index {
        Some(index) if !index.is_stale(mesh) => {
            analyze_thickness(mesh, index, min_wall_thickness).thin_count()
        }
        Some(index) => {
            warn!(
                index_revision = index.revision(),
                mesh_revision = mesh.revision(),
                "Spatial index is stale; skipping thin-wall detection"
            );
            0
        }
        None => {
            warn!("No spatial index built; skipping thin-wall detection");
            0
        }
    };

    let score = compute_score(overhang_percentage, thin_wall_vertex_count, mesh.vertex_count());

    debug!(
        overhang_area = overhang.overhang_area,
        total_surface_area = overhang.total_area,
        overhang_percentage,
        thin_wall_vertex_count,
        score,
        "Printability report"
    );

    PrintabilityReport {
        overhang_area: overhang.overhang_area,
        total_surface_area: overhang.total_area,
        overhang_percentage,
        thin_wall_vertex_count,
        score,
    }
}

/// Analyze `mesh` with the angle and wall thickness from `config`.
#[must_use]
pub fn analyze(mesh: &Mesh, index: Option<&SpatialIndex>, config: &PrinterConfig) -> PrintabilityReport {
    printability_report(mesh, index, config.max_overhang_angle, config.min_wall_thickness)
}
