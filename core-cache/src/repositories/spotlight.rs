//! Spotlight repository trait and implementation.
//!
//! Same merge rule as songs: `video_path`, `thumbnail_path`, and
//! `downloaded_at` are locally owned and survive metadata refreshes.

use crate::error::{CacheError, Result};
use crate::models::Spotlight;
use async_trait::async_trait;
use sqlx::{query_as, SqlitePool};
use tracing::debug;

/// Spotlight repository interface.
#[async_trait]
pub trait SpotlightRepository: Send + Sync {
    /// Insert or merge-update a batch of spotlight rows. Returns the number
    /// of rows written.
    async fn upsert_metadata(&self, spotlights: &[Spotlight]) -> Result<u64>;

    /// Find a spotlight by its ID.
    async fn find_by_id(&self, id: &str) -> Result<Option<Spotlight>>;

    /// All cached spotlights, newest first.
    async fn find_all(&self) -> Result<Vec<Spotlight>>;

    /// Record a completed video download.
    async fn set_video_path(
        &self,
        id: &str,
        video_path: &str,
        thumbnail_path: Option<&str>,
    ) -> Result<()>;

    /// Forget a local video download; metadata is retained.
    async fn clear_video_path(&self, id: &str) -> Result<()>;
}

/// SQLite implementation of [`SpotlightRepository`].
pub struct SqliteSpotlightRepository {
    pool: SqlitePool,
}

impl SqliteSpotlightRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpotlightRepository for SqliteSpotlightRepository {
    async fn upsert_metadata(&self, spotlights: &[Spotlight]) -> Result<u64> {
        if spotlights.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut written = 0u64;

        for spotlight in spotlights {
            sqlx::query(
                r#"
                INSERT INTO spotlights (
                    id, title, author, description, genre,
                    original_video_path, original_thumbnail_path,
                    video_path, thumbnail_path, created_at, downloaded_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    author = excluded.author,
                    description = excluded.description,
                    genre = excluded.genre,
                    original_video_path = excluded.original_video_path,
                    original_thumbnail_path = excluded.original_thumbnail_path,
                    created_at = excluded.created_at,
                    video_path = COALESCE(excluded.video_path, spotlights.video_path),
                    thumbnail_path = COALESCE(excluded.thumbnail_path, spotlights.thumbnail_path),
                    downloaded_at = CASE
                        WHEN excluded.video_path IS NULL THEN spotlights.downloaded_at
                        ELSE excluded.downloaded_at
                    END
                "#,
            )
            .bind(&spotlight.id)
            .bind(&spotlight.title)
            .bind(&spotlight.author)
            .bind(&spotlight.description)
            .bind(&spotlight.genre)
            .bind(&spotlight.original_video_path)
            .bind(&spotlight.original_thumbnail_path)
            .bind(&spotlight.video_path)
            .bind(&spotlight.thumbnail_path)
            .bind(&spotlight.created_at)
            .bind(spotlight.downloaded_at)
            .execute(&mut *tx)
            .await?;

            written += 1;
        }

        tx.commit().await?;
        debug!(count = written, "Upserted spotlight metadata");
        Ok(written)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Spotlight>> {
        let spotlight = query_as::<_, Spotlight>("SELECT * FROM spotlights WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(spotlight)
    }

    async fn find_all(&self) -> Result<Vec<Spotlight>> {
        let spotlights =
            query_as::<_, Spotlight>("SELECT * FROM spotlights ORDER BY created_at DESC, id")
                .fetch_all(&self.pool)
                .await?;

        Ok(spotlights)
    }

    async fn set_video_path(
        &self,
        id: &str,
        video_path: &str,
        thumbnail_path: Option<&str>,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query(
            r#"
            UPDATE spotlights
            SET video_path = ?,
                thumbnail_path = COALESCE(?, thumbnail_path),
                downloaded_at = ?
            WHERE id = ?
            "#,
        )
        .bind(video_path)
        .bind(thumbnail_path)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CacheError::NotFound {
                entity_type: "Spotlight".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn clear_video_path(&self, id: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE spotlights SET video_path = NULL, thumbnail_path = NULL, downloaded_at = NULL WHERE id = ?",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CacheError::NotFound {
                entity_type: "Spotlight".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
