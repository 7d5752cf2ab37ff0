//! Shared primitives for all Rust crates in Runlens.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Result type used across Runlens crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Text could not be parsed into a structured value.
    #[error("parse error: {0}")]
    Parse(String),

    /// Upstream reporting API call failed.
    #[error("remote error: {0}")]
    Remote(String),

    /// Record store operation failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns whether retrying the operation later may succeed.
    ///
    /// Remote and storage failures are transient by nature; validation and
    /// parse failures will fail the same way on every retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote(_) | Self::Storage(_))
    }
}
