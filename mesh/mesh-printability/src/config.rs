//! Process presets: which technology, how steep an unsupported face may be,
//! how thin a wall may get.
//!
//! Holds the tunables every analysis takes at the boundary: the critical
//! overhang angle, the minimum wall thickness and the orientation sample
//! count, with presets for common technologies.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{PrintabilityError, PrintabilityResult};

/// Default critical overhang angle in degrees.
pub const DEFAULT_CRITICAL_ANGLE: f64 = 45.0;

/// Default minimum wall thickness in mm.
pub const DEFAULT_MIN_WALL_THICKNESS: f64 = 0.8;

/// Default number of orientation candidates.
pub const DEFAULT_ORIENTATION_SAMPLES: usize = 26;

/// Additive process family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PrintTechnology {
    /// Extruded filament.
    Fdm,
    /// Cured resin.
    Sla,
    /// Laser-sintered powder.
    Sls,
    /// Any other process. Overhangs are assumed to need support.
    Other,
}

impl PrintTechnology {
    /// Short display label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fdm => "FDM",
            Self::Sla => "SLA",
            Self::Sls => "SLS",
            Self::Other => "Other",
        }
    }

    /// Whether overhangs need printed supports. Powder beds support themselves.
    #[must_use]
    pub const fn requires_supports(&self) -> bool {
        !matches!(self, Self::Sls)
    }
}

impl std::fmt::Display for PrintTechnology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunables for one machine and material.
///
/// # Example
///
/// ```
/// use mesh_printability::{PrinterConfig, PrintTechnology};
///
/// let config = PrinterConfig::fdm_default().with_min_wall_thickness(1.2);
/// assert_eq!(config.technology, PrintTechnology::Fdm);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrinterConfig {
    /// Printer technology.
    pub technology: PrintTechnology,

    /// Critical overhang angle in degrees, measured from vertical.
    ///
    /// 0 flags every downward-facing face; 90 flags none.
    pub max_overhang_angle: f64,

    /// Walls thinner than this (mm) are flagged.
    pub min_wall_thickness: f64,

    /// Number of up-vector candidates for orientation search.
    pub orientation_samples: usize,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::fdm_default()
    }
}

impl PrinterConfig {
    /// Filament preset: 45° overhangs.
    #[must_use]
    pub const fn fdm_default() -> Self {
        Self {
            technology: PrintTechnology::Fdm,
            max_overhang_angle: DEFAULT_CRITICAL_ANGLE,
            min_wall_thickness: DEFAULT_MIN_WALL_THICKNESS,
            orientation_samples: DEFAULT_ORIENTATION_SAMPLES,
        }
    }

    /// Resin preset: 30° overhangs.
    ///
    /// Resin peels off unsupported faces sooner, so the angle is stricter.
    #[must_use]
    pub const fn sla_default() -> Self {
        Self {
            technology: PrintTechnology::Sla,
            max_overhang_angle: 30.0,
            min_wall_thickness: 0.4,
            orientation_samples: DEFAULT_ORIENTATION_SAMPLES,
        }
    }

    /// Powder preset: overhangs never need support.
    ///
    /// The powder bed supports the part, so no face is an overhang.
    #[must_use]
    pub const fn sls_default() -> Self {
        Self {
            technology: PrintTechnology::Sls,
            max_overhang_angle: 90.0,
            min_wall_thickness: 0.7,
            orientation_samples: DEFAULT_ORIENTATION_SAMPLES,
        }
    }

    /// Set the critical overhang angle (degrees).
    #[must_use]
    pub const fn with_max_overhang_angle(mut self, angle: f64) -> Self {
        self.max_overhang_angle = angle;
        self
    }

    /// Set the minimum wall thickness (mm).
    #[must_use]
    pub const fn with_min_wall_thickness(mut self, thickness: f64) -> Self {
        self.min_wall_thickness = thickness;
        self
    }

    /// Set the number of orientation candidates.
    #[must_use]
    pub const fn with_orientation_samples(mut self, samples: usize) -> Self {
        self.orientation_samples = samples;
        self
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`PrintabilityError::InvalidConfig`] if the overhang angle is
    /// not within [0, 90] or the wall thickness is negative or not finite.
    pub fn validate(&self) -> PrintabilityResult<()> {
        if !(0.0..=90.0).contains(&self.max_overhang_angle) {
            return Err(PrintabilityError::invalid_config(format!(
                "max_overhang_angle must be within [0, 90] degrees, got {}",
                self.max_overhang_angle
            )));
        }
        if !self.min_wall_thickness.is_finite() || self.min_wall_thickness < 0.0 {
            return Err(PrintabilityError::invalid_config(format!(
                "min_wall_thickness must be finite and non-negative, got {}",
                self.min_wall_thickness
            )));
        }
        Ok(())
    }
}
