//! Domain-level errors

use thiserror::Error;

/// Errors produced by domain validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// User identifier failed validation
    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    /// Unknown prompt type string
    #[error("Unknown prompt type: {0}")]
    UnknownPromptType(String),

    /// Unknown season name
    #[error("Unknown season: {0}")]
    UnknownSeason(String),

    /// Unknown cache strategy name
    #[error("Unknown cache strategy: {0}")]
    UnknownStrategy(String),
}
