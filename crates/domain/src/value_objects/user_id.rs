//! User identifier owning cache entries

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// An opaque user identifier
///
/// Every cache read and write is scoped by this value. The backing string
/// comes from the auth provider and is treated as opaque; only a short
/// prefix of it ever appears inside cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a user ID, rejecting empty or whitespace-only input
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidUserId(
                "must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the underlying identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take up to `len` leading characters, for embedding in cache keys
    #[must_use]
    pub fn prefix(&self, len: usize) -> String {
        self.0.chars().take(len).collect()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_id() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("   ").is_err());
    }

    #[test]
    fn accepts_opaque_strings() {
        let id = UserId::new("auth0|64afc91d").unwrap();
        assert_eq!(id.as_str(), "auth0|64afc91d");
    }

    #[test]
    fn prefix_is_bounded() {
        let id = UserId::new("user-12345678").unwrap();
        assert_eq!(id.prefix(8), "user-123");
    }

    #[test]
    fn prefix_of_short_id_is_whole_id() {
        let id = UserId::new("u1").unwrap();
        assert_eq!(id.prefix(8), "u1");
    }

    #[test]
    fn prefix_respects_char_boundaries() {
        let id = UserId::new("ü-abcdefgh").unwrap();
        assert_eq!(id.prefix(2), "ü-");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = UserId::new("u1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"u1\"");
    }
}
