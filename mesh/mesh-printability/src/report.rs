//! The printability report value and its score.

// Vertex counts fit comfortably in f64 mantissas.
#![allow(clippy::cast_precision_loss)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Score of a mesh with no overhangs and no thin walls.
pub const PERFECT_SCORE: f64 = 100.0;

/// Largest deduction either penalty can make.
const MAX_PENALTY: f64 = 50.0;

/// Points deducted per percent of overhanging area.
const OVERHANG_WEIGHT: f64 = 0.5;

/// Summary of how printable a mesh is in its current orientation.
///
/// Constructed fresh per query. The default value describes an empty mesh:
/// every area and count is zero and the score is [`PERFECT_SCORE`].
///
/// # Example
///
/// ```
/// use mesh_printability::PrintabilityReport;
///
/// let report = PrintabilityReport::default();
/// assert_eq!(report.score, 100.0);
/// assert_eq!(report.thin_wall_vertex_count, 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrintabilityReport {
    /// Area of overhanging faces (mm²).
    pub overhang_area: f64,
    /// Area of all non-degenerate faces (mm²).
    pub total_surface_area: f64,
    /// `overhang_area / total_surface_area * 100`, or 0 for zero total area.
    pub overhang_percentage: f64,
    /// Vertices whose measured wall thickness is below the minimum.
    pub thin_wall_vertex_count: usize,
    /// Printability in `[0, 100]`, higher is better.
    pub score: f64,
}

impl Default for PrintabilityReport {
    fn default() -> Self {
        Self {
            overhang_area: 0.0,
            total_surface_area: 0.0,
            overhang_percentage: 0.0,
            thin_wall_vertex_count: 0,
            score: PERFECT_SCORE,
        }
    }
}

impl PrintabilityReport {
    /// Whether the report found neither overhangs nor thin walls.
    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.overhang_area <= 0.0 && self.thin_wall_vertex_count == 0
    }

    /// Whether any face would need support.
    #[must_use]
    pub fn needs_supports(&self) -> bool {
        self.overhang_area > 0.0
    }
}

impl std::fmt::Display for PrintabilityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Printability Report:")?;
        writeln!(
            f,
            "  Overhang: {:.2} / {:.2} mm² ({:.1}%)",
            self.overhang_area, self.total_surface_area, self.overhang_percentage
        )?;
        writeln!(f, "  Thin-wall vertices: {}", self.thin_wall_vertex_count)?;
        write!(f, "  Score: {:.1}", self.score)
    }
}

/// Combine overhang and thin-wall severity into a score.
///
/// `100 - min(0.5 * pct, 50) - min(50 * thin / vertex_count, 50)`, floored
/// at 0. Each penalty is strictly increasing over its valid range: a
/// percentage in `[0, 100]` and a thin count no larger than `vertex_count`.
/// A non-zero thin count with no vertices takes the full thin-wall penalty.
#[must_use]
pub fn compute_score(overhang_percentage: f64, thin_wall_vertex_count: usize, vertex_count: usize) -> f64 {
    let overhang_penalty = (overhang_percentage.max(0.0) * OVERHANG_WEIGHT).min(MAX_PENALTY);

    let thin_penalty = match (thin_wall_vertex_count, vertex_count) {
        (0, _) => 0.0,
        (_, 0) => MAX_PENALTY,
        (thin, total) => (MAX_PENALTY * thin as f64 / total as f64).min(MAX_PENALTY),
    };

    (PERFECT_SCORE - overhang_penalty - thin_penalty).max(0.0)
}
