//! STEP (ISO 10303) CAD import boundary.
//!
//! Turning a B-rep solid into triangles needs a solid-modeling kernel to
//! tessellate its surfaces. None is linked into this crate, so
//! [`StepImporter`] checks that the file exists and then reports
//! [`IoError::CadUnavailable`]. Callers treat that as a clean load failure.

use std::path::{Path, PathBuf};

use mesh_types::{MeshResult, TriangleRecord, TriangleSource};
use tracing::warn;

use crate::error::{IoError, IoResult};

/// Default maximum chord deviation for tessellation, in mm.
pub const DEFAULT_LINEAR_DEFLECTION: f64 = 0.1;

/// Default maximum angle between adjacent facet normals, in radians.
pub const DEFAULT_ANGULAR_DEFLECTION: f64 = 0.5;

/// A [`TriangleSource`] for STEP files.
///
/// ```
/// use mesh_io::StepImporter;
///
/// let importer = StepImporter::new("missing.step").with_linear_deflection(0.05);
/// assert!(!StepImporter::is_available());
/// assert!(importer.import().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StepImporter {
    path: PathBuf,
    linear_deflection: f64,
    angular_deflection: f64,
}

impl StepImporter {
    /// Importer for the given file with default tessellation tolerances.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            linear_deflection: DEFAULT_LINEAR_DEFLECTION,
            angular_deflection: DEFAULT_ANGULAR_DEFLECTION,
        }
    }

    /// Set the linear deflection (mm).
    #[must_use]
    pub const fn with_linear_deflection(mut self, deflection: f64) -> Self {
        self.linear_deflection = deflection;
        self
    }

    /// Set the angular deflection (radians).
    #[must_use]
    pub const fn with_angular_deflection(mut self, deflection: f64) -> Self {
        self.angular_deflection = deflection;
        self
    }

    /// Linear deflection (mm).
    #[must_use]
    pub const fn linear_deflection(&self) -> f64 {
        self.linear_deflection
    }

    /// Angular deflection (radians).
    #[must_use]
    pub const fn angular_deflection(&self) -> f64 {
        self.angular_deflection
    }

    /// Whether a tessellation kernel is linked.
    #[must_use]
    pub const fn is_available() -> bool {
        false
    }

    /// Tessellate the file into triangle records.
    ///
    /// # Errors
    ///
    /// [`IoError::FileNotFound`] if the file does not exist, otherwise
    /// [`IoError::CadUnavailable`].
    pub fn import(&self) -> IoResult<Vec<TriangleRecord>> {
        if !self.path.exists() {
            return Err(IoError::FileNotFound {
                path: self.path.clone(),
            });
        }

        warn!(
            path = %self.path.display(),
            linear_deflection = self.linear_deflection,
            angular_deflection = self.angular_deflection,
            "STEP import requested but no CAD kernel is available"
        );
        Err(IoError::CadUnavailable {
            path: self.path.clone(),
        })
    }
}

impl TriangleSource for StepImporter {
    fn read_triangles(&mut self) -> MeshResult<Vec<TriangleRecord>> {
        Ok(self.import()?)
    }
}
