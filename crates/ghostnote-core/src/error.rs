//! Error types for Ghostnote core operations.
//!
//! Only genuinely exceptional conditions live here. The expected outcomes of
//! reading a note (not found, expired, password required, wrong password)
//! are variants of the outcome enums in [`crate::storage::types`], not errors.

use thiserror::Error;

/// Result type alias for Ghostnote operations.
pub type Result<T> = std::result::Result<T, GhostError>;

/// Core error type for Ghostnote operations.
#[derive(Debug, Error)]
pub enum GhostError {
    /// Malformed create input (rejected immediately, not retryable)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unexpected failure, e.g. the hashing primitive or id generator.
    ///
    /// The message is meant for logs; boundary layers should surface a
    /// generic message instead.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GhostError {
    /// Returns true for errors caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(self, GhostError::Validation(_))
    }
}

impl From<argon2::password_hash::Error> for GhostError {
    fn from(err: argon2::password_hash::Error) -> Self {
        GhostError::Internal(format!("password hashing failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GhostError::Validation("Content cannot be empty".to_string());
        assert_eq!(err.to_string(), "Validation error: Content cannot be empty");
        assert!(err.is_validation());

        let err = GhostError::Internal("boom".to_string());
        assert!(!err.is_validation());
    }
}
