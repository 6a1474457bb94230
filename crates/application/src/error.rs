//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The persisted cache store could not be reached or answered with an
    /// error. Callers treat this as a cache miss, never as a failure.
    #[error("Cache store unavailable: {0}")]
    StoreUnavailable(String),

    /// Insert hit the `(user_id, request_hash)` uniqueness constraint.
    /// Recoverable: the caller already holds the freshly generated response.
    #[error("Duplicate cache entry for user {user_id}, hash {request_hash}")]
    DuplicateEntry {
        user_id: String,
        request_hash: String,
    },

    /// The external generator failed
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Generation(_))
    }

    /// True for the uniqueness-violation insert outcome
    #[must_use]
    pub const fn is_duplicate_entry(&self) -> bool {
        matches!(self, Self::DuplicateEntry { .. })
    }
}
