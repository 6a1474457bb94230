//! Sqlx-backed cache store
//!
//! Implements the cache store port against the `ai_response_cache` table.
//! The `(user_id, request_hash)` uniqueness constraint lives in the schema,
//! so duplicate inserts fail deterministically regardless of how many
//! server instances are writing.

use application::{error::ApplicationError, ports::CacheStorePort};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{CacheEntry, UserId};
use sqlx::SqlitePool;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Cache store over a SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteCacheStore {
    pool: SqlitePool,
}

impl SqliteCacheStore {
    /// Create a store on the given pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheStorePort for SqliteCacheStore {
    #[instrument(skip(self), fields(user = %user_id))]
    async fn fetch(
        &self,
        user_id: &UserId,
        request_hash: &str,
    ) -> Result<Option<CacheEntry>, ApplicationError> {
        let row: Option<CacheRow> = sqlx::query_as(
            r"
            SELECT id, user_id, request_hash, request_data, response,
                   created_at, last_accessed_at, access_count
            FROM ai_response_cache
            WHERE user_id = $1 AND request_hash = $2
            ",
        )
        .bind(user_id.as_str())
        .bind(request_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(CacheRow::into_entry).transpose()
    }

    #[instrument(skip(self, entry), fields(user = %entry.user_id, key = %entry.request_hash))]
    async fn insert(&self, entry: &CacheEntry) -> Result<(), ApplicationError> {
        let result = sqlx::query(
            r"
            INSERT INTO ai_response_cache
                (id, user_id, request_hash, request_data, response,
                 created_at, last_accessed_at, access_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(entry.id.to_string())
        .bind(entry.user_id.as_str())
        .bind(&entry.request_hash)
        .bind(entry.request_data.to_string())
        .bind(entry.response.to_string())
        .bind(entry.created_at.to_rfc3339())
        .bind(entry.last_accessed_at.to_rfc3339())
        .bind(entry.access_count)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!("Cache entry inserted");
                Ok(())
            },
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(ApplicationError::DuplicateEntry {
                    user_id: entry.user_id.to_string(),
                    request_hash: entry.request_hash.clone(),
                })
            },
            Err(e) => Err(map_sqlx_error(e)),
        }
    }

    #[instrument(skip(self), fields(user = %user_id))]
    async fn record_access(
        &self,
        user_id: &UserId,
        request_hash: &str,
        accessed_at: DateTime<Utc>,
    ) -> Result<(), ApplicationError> {
        // Single-statement increment keeps the counter correct under
        // concurrent hits.
        sqlx::query(
            r"
            UPDATE ai_response_cache
            SET access_count = access_count + 1, last_accessed_at = $1
            WHERE user_id = $2 AND request_hash = $3
            ",
        )
        .bind(accessed_at.to_rfc3339())
        .bind(user_id.as_str())
        .bind(request_hash)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(user = %user_id))]
    async fn delete(
        &self,
        user_id: &UserId,
        request_hash: &str,
    ) -> Result<(), ApplicationError> {
        sqlx::query("DELETE FROM ai_response_cache WHERE user_id = $1 AND request_hash = $2")
            .bind(user_id.as_str())
            .bind(request_hash)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        debug!("Cache entry deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
        only_unused: bool,
    ) -> Result<u64, ApplicationError> {
        let query = if only_unused {
            "DELETE FROM ai_response_cache WHERE created_at < $1 AND access_count = 0"
        } else {
            "DELETE FROM ai_response_cache WHERE created_at < $1"
        };

        let result = sqlx::query(query)
            .bind(cutoff.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let deleted = result.rows_affected();
        if deleted > 0 {
            debug!(deleted, cutoff = %cutoff, "Expired cache entries deleted");
        }
        Ok(deleted)
    }
}

/// Row type for cache queries
#[derive(sqlx::FromRow)]
struct CacheRow {
    id: String,
    user_id: String,
    request_hash: String,
    request_data: String,
    response: String,
    created_at: String,
    last_accessed_at: String,
    access_count: i64,
}

impl CacheRow {
    fn into_entry(self) -> Result<CacheEntry, ApplicationError> {
        Ok(CacheEntry {
            id: parse_uuid(&self.id)?,
            user_id: UserId::new(self.user_id)?,
            request_hash: self.request_hash,
            request_data: parse_json(&self.request_data)?,
            response: parse_json(&self.response)?,
            created_at: parse_datetime(&self.created_at)?,
            last_accessed_at: parse_datetime(&self.last_accessed_at)?,
            access_count: self.access_count,
        })
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, ApplicationError> {
    Uuid::parse_str(s).map_err(|e| ApplicationError::Internal(format!("Invalid UUID: {e}")))
}

fn parse_json(s: &str) -> Result<serde_json::Value, ApplicationError> {
    serde_json::from_str(s).map_err(|e| ApplicationError::Internal(format!("Invalid JSON: {e}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, ApplicationError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ApplicationError::Internal(format!("Invalid datetime: {e}")))
}

/// Map sqlx errors to application errors
fn map_sqlx_error(e: sqlx::Error) -> ApplicationError {
    ApplicationError::StoreUnavailable(e.to_string())
}
