//! Failures while reading or writing triangle files.

use std::path::PathBuf;

use mesh_types::MeshError;
use thiserror::Error;

/// Result alias for this crate.
pub type IoResult<T> = Result<T, IoError>;

/// Why a file could not be turned into triangles, or written back out.
///
/// Loading through [`TriangleSource`](mesh_types::TriangleSource) folds these
/// into [`MeshError`]; a short binary STL becomes [`MeshError::Truncated`].
#[derive(Debug, Error)]
pub enum IoError {
    /// Nothing exists at the path.
    #[error("no such file: {path}")]
    FileNotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// Text STL that does not follow the facet/vertex grammar.
    #[error("malformed STL: {message}")]
    InvalidContent {
        /// What the parser tripped on.
        message: String,
    },

    /// Binary STL shorter than its fixed header.
    #[error("STL header needs {expected} bytes, file has {got}")]
    InvalidHeader {
        /// Header plus count field.
        expected: usize,
        /// Actual number of bytes available.
        got: usize,
    },

    /// Binary STL holding fewer triangles than its header declares.
    #[error("STL declares {expected} triangles but holds {got}")]
    InvalidFaceCount {
        /// Number of triangles declared in the header.
        expected: u32,
        /// Number of complete triangles present.
        got: u32,
    },

    /// No CAD kernel is linked, so the file cannot be tessellated.
    #[error("CAD import unavailable for {path}: no solid-modeling kernel linked")]
    CadUnavailable {
        /// File that was requested.
        path: PathBuf,
    },

    /// Read or write failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Text STL with bytes that are not UTF-8.
    #[error("text STL is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// A coordinate that is not a number.
    #[error("bad coordinate in text STL: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
}

impl IoError {
    /// Shorthand for [`IoError::InvalidContent`].
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }

    /// Map a failed `File::open` onto `FileNotFound` where appropriate.
    pub(crate) fn from_open(err: std::io::Error, path: PathBuf) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::Io(err)
        }
    }
}

impl From<IoError> for MeshError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::InvalidFaceCount { expected, got } => Self::Truncated {
                expected: u64::from(expected),
                got: u64::from(got),
            },
            other => Self::source_failed(other.to_string()),
        }
    }
}
