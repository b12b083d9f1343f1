//! Generic key/value offline cache with TTL reads.
//!
//! Arbitrary JSON payloads keyed by namespaced strings. Expiry is lazy: a
//! read past the caller's `max_age` deletes the row and reports a miss; no
//! background sweeper runs.

use crate::error::Result;
use crate::models::CacheEntry;
use async_trait::async_trait;
use sqlx::{query_as, SqlitePool};
use std::time::Duration;
use tracing::debug;

/// Key/value cache repository interface.
#[async_trait]
pub trait KeyValueRepository: Send + Sync {
    /// Store a payload under a key, stamping it with the current time.
    async fn set(&self, key: &str, payload: &serde_json::Value) -> Result<()>;

    /// Fetch a payload if it is younger than `max_age`; stale rows are
    /// deleted on read and reported as a miss.
    async fn get(&self, key: &str, max_age: Duration) -> Result<Option<CacheEntry>>;

    /// Remove a single key. Returns whether a row existed.
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Drop every entry.
    async fn clear(&self) -> Result<()>;
}

/// SQLite implementation of [`KeyValueRepository`].
pub struct SqliteKeyValueRepository {
    pool: SqlitePool,
}

impl SqliteKeyValueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a payload with an explicit timestamp. Exposed for expiry tests.
    pub async fn set_at(
        &self,
        key: &str,
        payload: &serde_json::Value,
        stored_at: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO offline_cache (key, payload, stored_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                stored_at = excluded.stored_at
            "#,
        )
        .bind(key)
        .bind(serde_json::to_string(payload)?)
        .bind(stored_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueRepository for SqliteKeyValueRepository {
    async fn set(&self, key: &str, payload: &serde_json::Value) -> Result<()> {
        self.set_at(key, payload, chrono::Utc::now().timestamp()).await
    }

    async fn get(&self, key: &str, max_age: Duration) -> Result<Option<CacheEntry>> {
        let row: Option<(String, String, i64)> =
            query_as("SELECT key, payload, stored_at FROM offline_cache WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        let Some((key, payload, stored_at)) = row else {
            return Ok(None);
        };

        let age = chrono::Utc::now().timestamp().saturating_sub(stored_at);
        if age > max_age.as_secs() as i64 {
            debug!(key = %key, age_secs = age, "Evicting expired cache entry");
            sqlx::query("DELETE FROM offline_cache WHERE key = ?")
                .bind(&key)
                .execute(&self.pool)
                .await?;
            return Ok(None);
        }

        Ok(Some(CacheEntry {
            key,
            payload: serde_json::from_str(&payload)?,
            stored_at,
        }))
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM offline_cache WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM offline_cache").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use serde_json::json;

    #[tokio::test]
    async fn fresh_entry_round_trips() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteKeyValueRepository::new(pool);

        let payload = json!({"items": [1, 2, 3]});
        repo.set("home:feed", &payload).await.unwrap();

        let entry = repo
            .get("home:feed", Duration::from_secs(3600))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.payload, payload);
    }

    #[tokio::test]
    async fn stale_entry_is_evicted_on_read() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteKeyValueRepository::new(pool);

        let two_hours_ago = chrono::Utc::now().timestamp() - 7200;
        repo.set_at("home:feed", &json!({"v": 1}), two_hours_ago)
            .await
            .unwrap();

        let miss = repo.get("home:feed", Duration::from_secs(3600)).await.unwrap();
        assert!(miss.is_none());

        // Row is gone even for a permissive follow-up read.
        let still_miss = repo
            .get("home:feed", Duration::from_secs(86_400))
            .await
            .unwrap();
        assert!(still_miss.is_none());
    }

    #[tokio::test]
    async fn set_overwrites_and_refreshes_timestamp() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteKeyValueRepository::new(pool);

        repo.set_at("k", &json!(1), chrono::Utc::now().timestamp() - 7200)
            .await
            .unwrap();
        repo.set("k", &json!(2)).await.unwrap();

        let entry = repo
            .get("k", Duration::from_secs(3600))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.payload, json!(2));
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteKeyValueRepository::new(pool);

        repo.set("a", &json!(1)).await.unwrap();
        repo.set("b", &json!(2)).await.unwrap();

        assert!(repo.remove("a").await.unwrap());
        assert!(!repo.remove("a").await.unwrap());

        repo.clear().await.unwrap();
        assert!(repo
            .get("b", Duration::from_secs(3600))
            .await
            .unwrap()
            .is_none());
    }
}
