//! Error types for easel-canvas
//!
//! Validation failures are detected before the scene store is touched, so any
//! error returned from a store operation leaves the scene unchanged.

use thiserror::Error;

/// Canvas error type
#[derive(Debug, Error)]
pub enum Error {
    /// Canvas width or height missing or out of range
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// A required element field was absent or empty
    #[error("missing field: {0}")]
    MissingField(String),

    /// A field was present but out of range or malformed
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Offending field name
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// An image could not be fetched or decoded
    #[error("image load failed: {0}")]
    ImageLoad(String),

    /// Building the export document failed
    #[error("export failed: {0}")]
    Export(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid dimension error
    #[must_use]
    pub fn invalid_dimension(msg: impl Into<String>) -> Self {
        Self::InvalidDimension(msg.into())
    }

    /// Create a missing field error
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Create an invalid value error
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an image load error
    #[must_use]
    pub fn image_load(msg: impl Into<String>) -> Self {
        Self::ImageLoad(msg.into())
    }

    /// Create an export error
    #[must_use]
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Whether the error came from caller input rather than the server
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidDimension(_) | Self::MissingField(_) | Self::InvalidValue { .. }
        )
    }

    /// Image failures are always replaced by the fallback placeholder
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ImageLoad(_))
    }

    /// Get error code for API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDimension(_) => "invalid_dimension",
            Self::MissingField(_) => "missing_field",
            Self::InvalidValue { .. } => "invalid_value",
            Self::ImageLoad(_) => "image_load_failure",
            Self::Export(_) => "export_failure",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::ImageLoad(err.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Result type alias for canvas operations
pub type Result<T> = std::result::Result<T, Error>;
