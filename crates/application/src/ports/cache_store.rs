//! Cache store port - the persisted key-value table the cache rides on
//!
//! The store holds one row per (user, fingerprint) and exposes single-row
//! operations plus bulk age-based deletion. Per-user isolation is part of
//! the interface: every operation takes the owning user and must never
//! touch another user's rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{CacheEntry, UserId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for the persisted cache table
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CacheStorePort: Send + Sync {
    /// Fetch the entry for `(user_id, request_hash)`, if any
    ///
    /// A missing row is `Ok(None)`, not an error.
    async fn fetch(
        &self,
        user_id: &UserId,
        request_hash: &str,
    ) -> Result<Option<CacheEntry>, ApplicationError>;

    /// Insert a new entry
    ///
    /// Fails with [`ApplicationError::DuplicateEntry`] when a live row for
    /// the same `(user_id, request_hash)` already exists. The storage layer
    /// enforces this constraint so concurrent duplicate generations are
    /// detected deterministically.
    async fn insert(&self, entry: &CacheEntry) -> Result<(), ApplicationError>;

    /// Atomically bump `access_count` and set `last_accessed_at`
    async fn record_access(
        &self,
        user_id: &UserId,
        request_hash: &str,
        accessed_at: DateTime<Utc>,
    ) -> Result<(), ApplicationError>;

    /// Delete the entry for `(user_id, request_hash)`
    ///
    /// Deleting a missing row succeeds.
    async fn delete(&self, user_id: &UserId, request_hash: &str)
    -> Result<(), ApplicationError>;

    /// Bulk-delete rows created before `cutoff`, across all users
    ///
    /// With `only_unused` set, restricts deletion to rows never read
    /// (`access_count == 0`). Returns the number of deleted rows.
    async fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
        only_unused: bool,
    ) -> Result<u64, ApplicationError>;
}
