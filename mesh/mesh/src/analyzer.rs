//! A mesh plus its derived spatial index, behind one handle.

use std::path::Path;

use mesh_io::{IoResult, StlReader, save_stl};
use mesh_printability::{
    OrientationParams, OrientationResult, PrintabilityReport, PrinterConfig,
    find_optimal_orientation, find_optimal_orientation_with, printability_report,
};
use mesh_spatial::SpatialIndex;
use mesh_types::{Mesh, MeshResult, MeshTopology, TriangleSource, Vector3};
use tracing::info;

/// Owns a [`Mesh`] and, once built, a [`SpatialIndex`] over it.
///
/// The index is a cache keyed to the mesh's geometry. Loading a new mesh or
/// applying an orientation drops it; call
/// [`build_spatial_index`](Self::build_spatial_index) again before asking
/// for thin-wall counts.
///
/// # Example
///
/// ```
/// use mesh::Analyzer;
/// use mesh::types::primitives;
///
/// let mut analyzer = Analyzer::new();
/// analyzer.load(&mut primitives::thin_plate(10.0, 10.0, 0.1)).unwrap();
///
/// assert_eq!(analyzer.printability_report(45.0, 0.2).thin_wall_vertex_count, 0);
///
/// analyzer.build_spatial_index();
/// assert!(analyzer.printability_report(45.0, 0.2).thin_wall_vertex_count > 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    mesh: Mesh,
    index: Option<SpatialIndex>,
    config: PrinterConfig,
}

impl Analyzer {
    /// An analyzer holding an empty mesh and the FDM defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An analyzer for an already loaded mesh.
    #[must_use]
    pub fn from_mesh(mesh: Mesh) -> Self {
        Self {
            mesh,
            ..Self::default()
        }
    }

    /// Replace the printer configuration.
    #[must_use]
    pub fn with_config(mut self, config: PrinterConfig) -> Self {
        self.config = config;
        self
    }

    /// Load a new mesh from `source`.
    ///
    /// On success the spatial index is dropped. On failure the previous mesh
    /// and index are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is missing, truncated or empty.
    pub fn load<S: TriangleSource + ?Sized>(&mut self, source: &mut S) -> MeshResult<()> {
        self.mesh.load(source)?;
        self.index = None;
        Ok(())
    }

    /// Load a binary or ASCII STL file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_stl<P: AsRef<Path>>(&mut self, path: P) -> MeshResult<()> {
        self.load(&mut StlReader::from_path(path))
    }

    /// Write the current mesh as binary STL.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_stl<P: AsRef<Path>>(&self, path: P) -> IoResult<()> {
        save_stl(&self.mesh, path)
    }

    /// The current mesh.
    #[must_use]
    pub const fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// The printer configuration.
    #[must_use]
    pub const fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// The spatial index, if built for the current mesh.
    #[must_use]
    pub fn spatial_index(&self) -> Option<&SpatialIndex> {
        self.index.as_ref().filter(|index| !index.is_stale(&self.mesh))
    }

    /// Whether a current spatial index exists.
    #[must_use]
    pub fn has_spatial_index(&self) -> bool {
        self.spatial_index().is_some()
    }

    /// Build (or rebuild) the spatial index for the current mesh.
    pub fn build_spatial_index(&mut self) -> &SpatialIndex {
        self.index.insert(SpatialIndex::build(&self.mesh))
    }

    /// Overhang, thin-wall and score report for the current orientation.
    ///
    /// Thin walls are counted only if the spatial index has been built.
    #[must_use]
    pub fn printability_report(&self, critical_angle_deg: f64, min_wall_thickness: f64) -> PrintabilityReport {
        printability_report(
            &self.mesh,
            self.index.as_ref(),
            critical_angle_deg,
            min_wall_thickness,
        )
    }

    /// [`printability_report`](Self::printability_report) using the configured tunables.
    #[must_use]
    pub fn report(&self) -> PrintabilityReport {
        self.printability_report(self.config.max_overhang_angle, self.config.min_wall_thickness)
    }

    /// Search `samples` build directions for the least overhang area.
    ///
    /// The mesh is not modified; see [`apply_orientation`](Self::apply_orientation).
    #[must_use]
    pub fn auto_orient(&self, samples: usize, critical_angle_deg: f64) -> OrientationResult {
        find_optimal_orientation(&self.mesh, samples, critical_angle_deg)
    }

    /// [`auto_orient`](Self::auto_orient) using the configured tunables.
    #[must_use]
    pub fn auto_orient_configured(&self) -> OrientationResult {
        find_optimal_orientation_with(&self.mesh, &OrientationParams::from_config(&self.config))
    }

    /// Rotate the mesh so the result's up-vector becomes +Z.
    ///
    /// Drops the spatial index.
    pub fn apply_orientation(&mut self, result: &OrientationResult) {
        let up = result.optimal_up_vector;
        self.mesh.reorient(&result.rotation());
        self.index = None;
        info!(
            up_x = up.x,
            up_y = up.y,
            up_z = up.z,
            "Applied orientation; spatial index invalidated"
        );
    }

    /// Number of unique vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    /// Enclosed volume (mm³); meaningful for closed meshes.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.mesh.volume()
    }

    /// Total surface area (mm²).
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.mesh.surface_area()
    }

    /// Whether every edge is shared by exactly two faces.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.mesh.is_watertight()
    }

    /// Bounding-box extents.
    #[must_use]
    pub fn dimensions(&self) -> Vector3<f64> {
        self.mesh.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{MeshError, SoupSource, primitives};

    fn cylinder() -> Analyzer {
        let mut analyzer = Analyzer::new();
        analyzer.load(&mut primitives::cylinder(5.0, 20.0, 16)).unwrap();
        analyzer
    }

    #[test]
    fn empty_analyzer() {
        let analyzer = Analyzer::new();
        assert_eq!(analyzer.vertex_count(), 0);
        assert_eq!(analyzer.report(), PrintabilityReport::default());
        assert!(!analyzer.has_spatial_index());
    }

    #[test]
    fn failed_load_keeps_state() {
        let mut analyzer = cylinder();
        analyzer.build_spatial_index();
        let revision = analyzer.mesh().revision();

        let err = analyzer.load(&mut SoupSource::default()).unwrap_err();
        assert!(matches!(err, MeshError::EmptySource));
        assert_eq!(analyzer.mesh().revision(), revision);
        assert!(analyzer.has_spatial_index());
    }

    #[test]
    fn load_drops_index() {
        let mut analyzer = cylinder();
        analyzer.build_spatial_index();
        analyzer.load(&mut primitives::thin_plate(1.0, 1.0, 0.1)).unwrap();
        assert!(!analyzer.has_spatial_index());
    }

    #[test]
    fn apply_orientation_realizes_result() {
        let mut analyzer = cylinder();
        analyzer.build_spatial_index();
        let result = analyzer.auto_orient(26, 50.0);
        assert!(result.is_improvement());

        analyzer.apply_orientation(&result);
        assert!(!analyzer.has_spatial_index());

        let report = analyzer.printability_report(50.0, 0.8);
        assert_relative_eq!(report.overhang_area, result.optimized_overhang_area, epsilon = 1e-6);
        assert_relative_eq!(analyzer.volume(), cylinder().volume(), epsilon = 1e-9);
    }

    #[test]
    fn configured_defaults() {
        let analyzer = cylinder().with_config(PrinterConfig::sls_default());
        assert_relative_eq!(analyzer.report().overhang_area, 0.0);
        assert_eq!(analyzer.auto_orient_configured().candidates_evaluated, 26);
    }

    #[test]
    fn measurements() {
        let analyzer = cylinder();
        assert_eq!(analyzer.triangle_count(), 64);
        assert_eq!(analyzer.vertex_count(), 34);
        assert!(analyzer.is_watertight());
        assert_relative_eq!(analyzer.dimensions().z, 20.0, epsilon = 1e-12);
        assert!(analyzer.surface_area() > 0.0);
    }
}
