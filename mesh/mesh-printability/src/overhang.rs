//! Overhang classification.
//!
//! A face is an overhang when its normal leans further than the critical
//! angle away from vertical toward the build plate: `dot(n, up) < -sin(θ)`.
//! At θ = 0 every downward-tilted face counts; at θ = 90 none do.

use mesh_types::{Mesh, Vector3};
use nalgebra::Unit;

use crate::config::DEFAULT_CRITICAL_ANGLE;

/// Area totals for one up-vector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverhangStats {
    /// Summed area of overhang faces.
    pub overhang_area: f64,
    /// Summed area of all non-degenerate faces.
    pub total_area: f64,
    /// Number of overhang faces.
    pub overhang_faces: usize,
}

impl OverhangStats {
    /// Overhang area as a percentage of total area; 0 when the total is 0.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total_area > 0.0 {
            (self.overhang_area / self.total_area * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}

/// `dot(n, up)` threshold for a critical angle in degrees.
///
/// The angle is clamped to [0, 90]; NaN falls back to the default angle.
#[must_use]
pub fn overhang_threshold(critical_angle_deg: f64) -> f64 {
    let angle = if critical_angle_deg.is_nan() {
        DEFAULT_CRITICAL_ANGLE
    } else {
        critical_angle_deg.clamp(0.0, 90.0)
    };
    -angle.to_radians().sin()
}

#[inline]
fn is_overhang(normal: &Vector3<f64>, up: &Unit<Vector3<f64>>, threshold: f64) -> bool {
    normal.dot(up.as_ref()) < threshold
}

/// Overhang and total areas of `mesh` when printed with `up` as the build direction.
///
/// Degenerate faces are skipped. `up` is evaluated directly, the mesh is not
/// rotated.
#[must_use]
pub fn overhang_stats(mesh: &Mesh, up: &Unit<Vector3<f64>>, critical_angle_deg: f64) -> OverhangStats {
    let threshold = overhang_threshold(critical_angle_deg);

    mesh.faces()
        .iter()
        .filter(|f| !f.is_degenerate())
        .fold(OverhangStats::default(), |mut acc, face| {
            acc.total_area += face.area;
            if is_overhang(&face.normal, up, threshold) {
                acc.overhang_area += face.area;
                acc.overhang_faces += 1;
            }
            acc
        })
}

/// Indices of the overhang faces for `up`, in face order.
#[must_use]
pub fn overhang_faces(mesh: &Mesh, up: &Unit<Vector3<f64>>, critical_angle_deg: f64) -> Vec<usize> {
    let threshold = overhang_threshold(critical_angle_deg);

    mesh.faces()
        .iter()
        .enumerate()
        .filter(|(_, f)| !f.is_degenerate() && is_overhang(&f.normal, up, threshold))
        .map(|(i, _)| i)
        .collect()
}
