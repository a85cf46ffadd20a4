//! # AppError
//!
//! Centralized error handling for Tellls.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all tl-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Telll, User, Community)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., telll too short)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// No usable session
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed (e.g., deleting someone else's telll)
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Infrastructure failure, carrying the wrapping message of the operation
    #[error("internal service error: {0}")]
    Internal(String),

    /// Resource already exists (e.g., duplicate username)
    #[error("conflict: {0}")]
    Conflict(String),
}

impl AppError {
    pub fn not_found(kind: &str, id: impl ToString) -> Self {
        AppError::NotFound(kind.to_string(), id.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(..))
    }
}

/// A specialized Result type for Tellls logic.
pub type Result<T> = std::result::Result<T, AppError>;
