//! Error types for mesh construction.

use thiserror::Error;

/// Result type for mesh construction.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors that can occur while building a mesh from a triangle source.
///
/// A failed load never modifies the target mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The source declared or produced zero triangles.
    #[error("triangle source is empty")]
    EmptySource,

    /// The source ended before delivering every declared triangle.
    #[error("triangle source truncated: expected {expected} triangles, got {got}")]
    Truncated {
        /// Number of triangles the source declared.
        expected: u64,
        /// Number of complete triangles actually available.
        got: u64,
    },

    /// The source could not be read (missing file, parse failure, unavailable importer).
    #[error("triangle source failed: {message}")]
    Source {
        /// Description of the failure.
        message: String,
    },

    /// The mesh would need more vertices than `u32` indices can address.
    #[error("mesh exceeds {max} vertices")]
    TooManyVertices {
        /// Maximum supported vertex count.
        max: u64,
    },
}

impl MeshError {
    /// Create a `Source` error with the given message.
    #[must_use]
    pub fn source_failed(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert!(MeshError::EmptySource.to_string().contains("empty"));

        let err = MeshError::Truncated {
            expected: 12,
            got: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains('3'));

        let err = MeshError::source_failed("no such file");
        assert!(err.to_string().contains("no such file"));
    }
}
