//! Error types for printability analysis.

use thiserror::Error;

/// Result type for printability operations.
pub type PrintabilityResult<T> = Result<T, PrintabilityError>;

/// Errors from printability configuration.
///
/// Analysis itself never fails; degenerate input degrades to limiting
/// values instead.
#[derive(Debug, Error)]
pub enum PrintabilityError {
    /// Invalid configuration parameter.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },
}

impl PrintabilityError {
    /// Create an `InvalidConfig` error with the given message.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
