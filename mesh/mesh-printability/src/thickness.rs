//! Per-vertex wall thickness.
//!
//! Each vertex casts a ray along its inward normal (the negated, unweighted
//! average of adjacent face normals) and records the distance to the
//! nearest opposing surface found by the [`SpatialIndex`].

// Vertex counts fit comfortably in f64 mantissas.
#![allow(clippy::cast_precision_loss)]

use mesh_spatial::SpatialIndex;
use mesh_types::Mesh;
use rayon::prelude::*;
use tracing::{info, warn};

/// Result of wall thickness analysis.
///
/// # Example
///
/// ```
/// use mesh_printability::ThicknessAnalysis;
///
/// let result = ThicknessAnalysis::empty(0.8);
/// assert!(!result.has_thin_walls());
/// assert_eq!(result.thin_count(), 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ThicknessAnalysis {
    /// Per-vertex thickness (`f64::INFINITY` where nothing opposing was found).
    pub vertex_thickness: Vec<f64>,
    /// Smallest finite thickness.
    pub min_thickness: f64,
    /// Largest finite thickness.
    pub max_thickness: f64,
    /// Mean of the finite thicknesses.
    pub avg_thickness: f64,
    /// Vertices thinner than the threshold, ascending.
    pub thin_vertices: Vec<usize>,
    /// Threshold used, in mm.
    pub min_wall_thickness: f64,
    /// Number of vertices that were sampled.
    pub vertices_analyzed: usize,
    /// Number of vertices whose ray found an opposing surface.
    pub vertices_with_hits: usize,
}

impl ThicknessAnalysis {
    /// A result with nothing measured.
    #[must_use]
    pub const fn empty(min_wall_thickness: f64) -> Self {
        Self {
            vertex_thickness: Vec::new(),
            min_thickness: f64::INFINITY,
            max_thickness: f64::NEG_INFINITY,
            avg_thickness: 0.0,
            thin_vertices: Vec::new(),
            min_wall_thickness,
            vertices_analyzed: 0,
            vertices_with_hits: 0,
        }
    }

    /// Number of vertices below the threshold.
    #[must_use]
    pub fn thin_count(&self) -> usize {
        self.thin_vertices.len()
    }

    /// Whether any vertex is below the threshold.
    #[must_use]
    pub fn has_thin_walls(&self) -> bool {
        !self.thin_vertices.is_empty()
    }

    /// Percentage of sampled vertices with a measured thickness.
    #[must_use]
    pub fn coverage_percent(&self) -> f64 {
        if self.vertices_analyzed == 0 {
            0.0
        } else {
            100.0 * (self.vertices_with_hits as f64) / (self.vertices_analyzed as f64)
        }
    }
}

impl std::fmt::Display for ThicknessAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Wall Thickness Analysis:")?;
        writeln!(f, "  Vertices analyzed: {}", self.vertices_analyzed)?;
        writeln!(f, "  Coverage: {:.1}%", self.coverage_percent())?;
        writeln!(f, "  Min thickness: {:.3}", self.min_thickness)?;
        writeln!(f, "  Max thickness: {:.3}", self.max_thickness)?;
        writeln!(f, "  Avg thickness: {:.3}", self.avg_thickness)?;
        writeln!(
            f,
            "  Thin vertices (< {:.3}): {}",
            self.min_wall_thickness,
            self.thin_count()
        )
    }
}

/// Measure wall thickness at every vertex.
///
/// Vertices are processed in parallel. A stale `index` (built for another
/// mesh revision) measures nothing and yields [`ThicknessAnalysis::empty`].
/// A vertex is thin when its thickness is strictly below
/// `min_wall_thickness`; vertices with no opposing surface never are.
#[must_use]
pub fn analyze_thickness(
    mesh: &Mesh,
    index: &SpatialIndex,
    min_wall_thickness: f64,
) -> ThicknessAnalysis {
    if index.is_stale(mesh) {
        warn!(
            index_revision = index.revision(),
            mesh_revision = mesh.revision(),
            "Spatial index is stale; skipping thickness analysis"
        );
        return ThicknessAnalysis::empty(min_wall_thickness);
    }

    let normals = mesh.vertex_normals();
    let vertex_thickness: Vec<f64> = mesh
        .vertices()
        .par_iter()
        .zip(normals.par_iter())
        .map(|(point, normal)| {
            index
                .nearest_opposing_surface(mesh, point, normal)
                .unwrap_or(f64::INFINITY)
        })
        .collect();

    let thin_vertices: Vec<usize> = vertex_thickness
        .iter()
        .enumerate()
        .filter(|&(_, &t)| t < min_wall_thickness)
        .map(|(i, _)| i)
        .collect();

    let (count, sum, min, max) = vertex_thickness
        .iter()
        .filter(|t| t.is_finite())
        .fold((0usize, 0.0, f64::INFINITY, f64::NEG_INFINITY), |(n, s, lo, hi), &t| {
            (n + 1, s + t, lo.min(t), hi.max(t))
        });
    let avg = if count == 0 { 0.0 } else { sum / count as f64 };

    if thin_vertices.is_empty() {
        info!(
            vertices = vertex_thickness.len(),
            with_hits = count,
            "Wall thickness analysis complete"
        );
    } else {
        warn!(
            thin_count = thin_vertices.len(),
            min_thickness = format!("{min:.3}"),
            "Found vertices below minimum wall thickness"
        );
    }

    ThicknessAnalysis {
        vertices_analyzed: vertex_thickness.len(),
        vertex_thickness,
        min_thickness: min,
        max_thickness: max,
        avg_thickness: avg,
        thin_vertices,
        min_wall_thickness,
        vertices_with_hits: count,
    }
}
