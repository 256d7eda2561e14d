//! Automatic print orientation search.
//!
//! Candidate build directions are scored by overhang area without moving
//! any geometry: each candidate up-vector is passed straight to the overhang
//! classifier, so a search costs O(candidates × faces). Candidates are
//! evaluated in parallel and reduced in generation order, which keeps the
//! result deterministic.

// Candidate counts fit comfortably in f64 mantissas.
#![allow(clippy::cast_precision_loss)]

use std::f64::consts::PI;

use mesh_types::{Mesh, Vector3};
use nalgebra::{Unit, UnitQuaternion};
use rayon::prelude::*;
use tracing::info;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_CRITICAL_ANGLE, DEFAULT_ORIENTATION_SAMPLES, PrinterConfig};
use crate::overhang::overhang_stats;

/// Relative tolerance under which two overhang areas count as tied.
const TIE_TOLERANCE: f64 = 1e-9;

/// Number of canonical directions (axes, edge and corner diagonals of a cube).
pub const CANONICAL_DIRECTIONS: usize = 26;

/// Candidates scored per parallel batch.
const BATCH_SIZE: usize = 1024;

/// Parameters for [`find_optimal_orientation_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrientationParams {
    /// Number of candidate up-vectors to generate.
    pub samples: usize,
    /// Critical overhang angle in degrees.
    pub critical_angle: f64,
    /// Evaluate at most this many candidates, in generation order.
    pub max_candidates: Option<usize>,
}

impl Default for OrientationParams {
    fn default() -> Self {
        Self {
            samples: DEFAULT_ORIENTATION_SAMPLES,
            critical_angle: DEFAULT_CRITICAL_ANGLE,
            max_candidates: None,
        }
    }
}

impl OrientationParams {
    /// Parameters matching a printer configuration.
    #[must_use]
    pub const fn from_config(config: &PrinterConfig) -> Self {
        Self {
            samples: config.orientation_samples,
            critical_angle: config.max_overhang_angle,
            max_candidates: None,
        }
    }

    /// Set the number of candidates.
    #[must_use]
    pub const fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Set the critical angle (degrees).
    #[must_use]
    pub const fn with_critical_angle(mut self, angle: f64) -> Self {
        self.critical_angle = angle;
        self
    }

    /// Cap how many candidates are evaluated.
    #[must_use]
    pub const fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = Some(max);
        self
    }
}

/// Outcome of an orientation search.
///
/// The mesh is never modified by the search. To print in the suggested
/// orientation, reorient the mesh with [`OrientationResult::rotation`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrientationResult {
    /// Overhang area with the current +Z as build direction (mm²).
    pub original_overhang_area: f64,
    /// Smallest overhang area found (mm²).
    pub optimized_overhang_area: f64,
    /// Percent reduction from the original area; 0 when the original is 0.
    pub improvement_percent: f64,
    /// Build direction that achieved the optimized area.
    pub optimal_up_vector: Unit<Vector3<f64>>,
    /// Number of candidates scored, not counting the baseline.
    pub candidates_evaluated: usize,
}

impl OrientationResult {
    /// Rotation that maps [`Self::optimal_up_vector`] onto +Z.
    #[must_use]
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        build_axis_rotation(&self.optimal_up_vector)
    }

    /// Whether a better orientation than the current one was found.
    #[must_use]
    pub fn is_improvement(&self) -> bool {
        self.optimized_overhang_area < self.original_overhang_area
    }
}

impl std::fmt::Display for OrientationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let up = &self.optimal_up_vector;
        writeln!(f, "Orientation Result:")?;
        writeln!(f, "  Candidates: {}", self.candidates_evaluated)?;
        writeln!(f, "  Original overhang: {:.2} mm²", self.original_overhang_area)?;
        writeln!(f, "  Optimized overhang: {:.2} mm²", self.optimized_overhang_area)?;
        writeln!(f, "  Improvement: {:.1}%", self.improvement_percent)?;
        write!(f, "  Up vector: ({:.3}, {:.3}, {:.3})", up.x, up.y, up.z)
    }
}

/// Generate `n` candidate up-vectors.
///
/// With at least 26 candidates the list opens with the canonical directions:
/// the six axes (starting with +Z), then the twelve edge diagonals, then the
/// eight corner diagonals. The remaining `n - 26` are a Fibonacci sphere.
/// Fewer than 26 candidates are all taken from an `n`-point Fibonacci sphere,
/// since any prefix of the canonical list is lopsided.
#[must_use]
pub fn generate_candidates(n: usize) -> Vec<Unit<Vector3<f64>>> {
    candidate_directions(n).collect()
}

fn candidate_directions(n: usize) -> impl Iterator<Item = Unit<Vector3<f64>>> {
    let canonical = if n < CANONICAL_DIRECTIONS {
        0
    } else {
        CANONICAL_DIRECTIONS
    };
    canonical_directions()
        .take(canonical)
        .chain(fibonacci_sphere(n - canonical))
}

fn canonical_directions() -> impl Iterator<Item = Unit<Vector3<f64>>> {
    const AXES: [[f64; 3]; 6] = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    let steps = [1.0, -1.0];
    let edges = steps.into_iter().flat_map(move |a| {
        steps.into_iter().flat_map(move |b| {
            [[a, b, 0.0], [a, 0.0, b], [0.0, a, b]]
        })
    });
    let corners = steps.into_iter().flat_map(move |a| {
        steps
            .into_iter()
            .flat_map(move |b| steps.into_iter().map(move |c| [a, b, c]))
    });

    AXES.into_iter()
        .chain(edges)
        .chain(corners)
        .map(|[x, y, z]| Unit::new_normalize(Vector3::new(x, y, z)))
}

fn fibonacci_sphere(count: usize) -> impl Iterator<Item = Unit<Vector3<f64>>> {
    let golden_angle = PI * (3.0 - 5.0_f64.sqrt());

    (0..count).map(move |i| {
        let z = 1.0 - 2.0 * (i as f64 + 0.5) / count as f64;
        let radius = (1.0 - z * z).max(0.0).sqrt();
        let theta = golden_angle * i as f64;
        Unit::new_normalize(Vector3::new(radius * theta.cos(), radius * theta.sin(), z))
    })
}

/// Rotation that maps `up` onto the build axis +Z.
///
/// An up-vector pointing straight down maps via a half turn about X. A zero
/// vector yields the identity.
#[must_use]
pub fn build_axis_rotation(up: &Vector3<f64>) -> UnitQuaternion<f64> {
    let Some(up) = Unit::try_new(*up, f64::EPSILON) else {
        return UnitQuaternion::identity();
    };

    UnitQuaternion::rotation_between_axis(&up, &Vector3::z_axis())
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI))
}

/// Find the build direction with the least overhang area.
///
/// Scores `samples` candidates from [`generate_candidates`] against the
/// current +Z. A candidate only wins if it beats the best so far by more than
/// a small tolerance, so the current orientation is kept on ties and earlier
/// candidates beat later ones.
///
/// # Example
///
/// ```
/// use mesh_printability::find_optimal_orientation;
/// use mesh_types::{Mesh, primitives};
///
/// let mesh = Mesh::from_source(&mut primitives::cylinder(5.0, 20.0, 16)).unwrap();
/// let result = find_optimal_orientation(&mesh, 26, 45.0);
/// assert!(result.optimized_overhang_area <= result.original_overhang_area);
/// ```
#[must_use]
pub fn find_optimal_orientation(mesh: &Mesh, samples: usize, critical_angle_deg: f64) -> OrientationResult {
    find_optimal_orientation_with(
        mesh,
        &OrientationParams::default()
            .with_samples(samples)
            .with_critical_angle(critical_angle_deg),
    )
}

/// [`find_optimal_orientation`] with full parameters.
///
/// Candidates are produced lazily and scored in batches, so only the first
/// `max_candidates` of the `samples` list are ever generated.
#[must_use]
pub fn find_optimal_orientation_with(mesh: &Mesh, params: &OrientationParams) -> OrientationResult {
    let budget = params
        .max_candidates
        .map_or(params.samples, |max| params.samples.min(max));
    let mut candidates = candidate_directions(params.samples).take(budget);

    let baseline = overhang_stats(mesh, &Vector3::z_axis(), params.critical_angle);
    let tolerance = TIE_TOLERANCE * baseline.total_area.max(1.0);

    let mut best = (Vector3::z_axis(), baseline.overhang_area);
    let mut evaluated = 0usize;
    loop {
        let batch: Vec<_> = candidates.by_ref().take(BATCH_SIZE).collect();
        if batch.is_empty() {
            break;
        }
        evaluated += batch.len();

        let areas: Vec<f64> = batch
            .par_iter()
            .map(|up| overhang_stats(mesh, up, params.critical_angle).overhang_area)
            .collect();

        // In generation order, so ties resolve the same way on every run.
        best = batch
            .into_iter()
            .zip(areas)
            .fold(best, |(best_up, best_area), (up, area)| {
                if area < best_area - tolerance {
                    (up, area)
                } else {
                    (best_up, best_area)
                }
            });
    }
    let (optimal_up_vector, optimized_overhang_area) = best;

    let original_overhang_area = baseline.overhang_area;
    let improvement_percent = if original_overhang_area > 0.0 {
        (original_overhang_area - optimized_overhang_area) / original_overhang_area * 100.0
    } else {
        0.0
    };

    info!(
        candidates = evaluated,
        original_overhang_area,
        optimized_overhang_area,
        improvement_percent,
        "Orientation search complete"
    );

    OrientationResult {
        original_overhang_area,
        optimized_overhang_area,
        improvement_percent,
        optimal_up_vector,
        candidates_evaluated: evaluated,
    }
}
