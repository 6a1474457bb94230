//! Cache entry entity - one persisted AI response per (user, fingerprint)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::value_objects::UserId;

/// A persisted cache row
///
/// Invariants the store and services maintain:
/// - `(user_id, request_hash)` has at most one live row
/// - `created_at <= last_accessed_at`
/// - `access_count >= 0`, bumped exactly once per validated hit
/// - `response` and `request_data` are write-once; the only mutations after
///   insert are the access bookkeeping and full deletion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Surrogate row id
    pub id: Uuid,
    /// Owner; all reads and writes are scoped by this
    pub user_id: UserId,
    /// Composed cache key, 32 hex characters
    pub request_hash: String,
    /// Snapshot of the inputs that produced the response, for diagnostics
    /// and invalidation
    pub request_data: Value,
    /// The generated payload, opaque to the cache
    pub response: Value,
    /// First write; immutable
    pub created_at: DateTime<Utc>,
    /// Most recent validated read
    pub last_accessed_at: DateTime<Utc>,
    /// Number of validated reads
    pub access_count: i64,
}

impl CacheEntry {
    /// Create a fresh entry at the given instant
    #[must_use]
    pub fn new(
        user_id: UserId,
        request_hash: impl Into<String>,
        request_data: Value,
        response: Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            request_hash: request_hash.into(),
            request_data,
            response,
            created_at,
            last_accessed_at: created_at,
            access_count: 0,
        }
    }

    /// Age of the entry at the given instant
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.created_at)
    }

    /// Record a validated read
    pub fn record_access(&mut self, at: DateTime<Utc>) {
        self.access_count += 1;
        self.last_accessed_at = at;
    }

    /// Season stored in the request snapshot at write time, if any
    #[must_use]
    pub fn stored_season(&self) -> Option<&str> {
        self.request_data
            .get("seasonal_context")
            .and_then(|ctx| ctx.get("season"))
            .and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn entry_at(hour: u32) -> CacheEntry {
        CacheEntry::new(
            UserId::new("u1").unwrap(),
            "a".repeat(32),
            json!({"seasonal_context": {"season": "summer"}}),
            json!({"name": "Look A"}),
            Utc.with_ymd_and_hms(2026, 8, 6, hour, 0, 0).unwrap(),
        )
    }

    #[test]
    fn new_entry_starts_unaccessed() {
        let entry = entry_at(8);
        assert_eq!(entry.access_count, 0);
        assert_eq!(entry.created_at, entry.last_accessed_at);
    }

    #[test]
    fn record_access_bumps_count_and_timestamp() {
        let mut entry = entry_at(8);
        let later = Utc.with_ymd_and_hms(2026, 8, 6, 9, 0, 0).unwrap();
        entry.record_access(later);
        entry.record_access(later);

        assert_eq!(entry.access_count, 2);
        assert_eq!(entry.last_accessed_at, later);
        assert!(entry.created_at <= entry.last_accessed_at);
    }

    #[test]
    fn age_is_measured_from_creation() {
        let entry = entry_at(8);
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 8, 0, 0).unwrap();
        assert_eq!(entry.age(now), chrono::Duration::hours(24));
    }

    #[test]
    fn stored_season_reads_the_snapshot() {
        let entry = entry_at(8);
        assert_eq!(entry.stored_season(), Some("summer"));
    }

    #[test]
    fn stored_season_is_none_without_snapshot_field() {
        let mut entry = entry_at(8);
        entry.request_data = json!({});
        assert_eq!(entry.stored_season(), None);
    }
}
