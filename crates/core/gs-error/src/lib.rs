//! Error types for globstream.
//!
//! This crate provides:
//! - [`GsError`] - Top-level error enum shared by the library and CLI
//! - [`ErrorCategory`] for telling construction failures apart from runtime ones

use thiserror::Error;

/// Top-level error type for globstream.
#[derive(Error, Debug)]
pub enum GsError {
    /// Invalid patterns or options, raised before a stream exists
    #[error("Validation error: {0}")]
    Validation(String),

    /// Failure reported by the listing client, passed through as-is
    #[error("Listing error: {0}")]
    Listing(String),

    /// Output encoding failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GsError {
    /// Shorthand for a [`GsError::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for a [`GsError::Listing`] error.
    pub fn listing(message: impl Into<String>) -> Self {
        Self::Listing(message.into())
    }

    /// Shorthand for a [`GsError::Serialization`] error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        classify_error(self)
    }
}

/// When an error can occur in a stream's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Raised while building a stream; no listing call was made.
    ///
    /// Examples: empty pattern list, missing bucket, unknown format
    Construction,

    /// Raised while the stream was producing entries; terminal for that stream.
    ///
    /// Examples: AccessDenied, NoSuchBucket, connection reset
    Runtime,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Construction => write!(f, "Construction"),
            Self::Runtime => write!(f, "Runtime"),
        }
    }
}

/// Classifies an error by the phase it belongs to.
pub fn classify_error(error: &GsError) -> ErrorCategory {
    match error {
        GsError::Validation(_) => ErrorCategory::Construction,
        GsError::Listing(_) | GsError::Serialization(_) | GsError::Other(_) => {
            ErrorCategory::Runtime
        }
    }
}

/// Result type alias using GsError.
pub type Result<T> = std::result::Result<T, GsError>;
