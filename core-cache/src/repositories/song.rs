//! Song repository trait and implementation.
//!
//! The upsert merges instead of replacing: `content_path`, `image_path`,
//! `downloaded_at`, and `last_played_at` are locally owned, so a metadata
//! refresh with those fields absent keeps the stored values. Only the
//! transfer layer clears them.

use crate::error::{CacheError, Result};
use crate::models::Song;
use crate::repositories::{Page, PageRequest};
use async_trait::async_trait;
use sqlx::{query_as, SqlitePool};
use tracing::debug;

/// Song repository interface for data access operations.
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Insert or merge-update a batch of song rows.
    ///
    /// Idempotent: applying the same batch twice leaves the table unchanged.
    /// Returns the number of rows written.
    async fn upsert_metadata(&self, songs: &[Song]) -> Result<u64>;

    /// Find a song by its ID.
    async fn find_by_id(&self, id: &str) -> Result<Option<Song>>;

    /// Find songs by a set of IDs, preserving the order of `ids`.
    ///
    /// IDs with no cached row are silently omitted.
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Song>>;

    /// Query songs with pagination, newest first.
    async fn find_page(&self, request: PageRequest) -> Result<Page<Song>>;

    /// Count total cached songs.
    async fn count(&self) -> Result<i64>;

    /// Record a completed download: set the local resource pointers and the
    /// download timestamp.
    async fn set_content_path(
        &self,
        id: &str,
        content_path: &str,
        image_path: Option<&str>,
    ) -> Result<()>;

    /// Forget a local download: clear the resource pointers and timestamp.
    /// Metadata for the song is retained.
    async fn clear_content_path(&self, id: &str) -> Result<()>;

    /// Record a playback event: bump `play_count` and stamp `last_played_at`.
    async fn record_play(&self, id: &str, played_at: i64) -> Result<()>;
}

/// SQLite implementation of [`SongRepository`].
pub struct SqliteSongRepository {
    pool: SqlitePool,
}

impl SqliteSongRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SongRepository for SqliteSongRepository {
    async fn upsert_metadata(&self, songs: &[Song]) -> Result<u64> {
        if songs.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut written = 0u64;

        for song in songs {
            song.validate().map_err(|msg| CacheError::InvalidInput {
                field: "song".to_string(),
                message: msg,
            })?;

            // COALESCE keeps the stored local pointer when the incoming row
            // has none; downloaded_at follows content_path.
            sqlx::query(
                r#"
                INSERT INTO songs (
                    id, owner_id, title, author,
                    content_path, original_content_path, original_image_path, image_path,
                    duration, genre, lyrics, created_at,
                    downloaded_at, last_played_at, play_count, like_count
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    owner_id = excluded.owner_id,
                    title = excluded.title,
                    author = excluded.author,
                    original_content_path = excluded.original_content_path,
                    original_image_path = excluded.original_image_path,
                    duration = excluded.duration,
                    genre = excluded.genre,
                    lyrics = excluded.lyrics,
                    created_at = excluded.created_at,
                    play_count = excluded.play_count,
                    like_count = excluded.like_count,
                    content_path = COALESCE(excluded.content_path, songs.content_path),
                    downloaded_at = CASE
                        WHEN excluded.content_path IS NULL THEN songs.downloaded_at
                        ELSE excluded.downloaded_at
                    END,
                    image_path = COALESCE(excluded.image_path, songs.image_path),
                    last_played_at = COALESCE(excluded.last_played_at, songs.last_played_at)
                "#,
            )
            .bind(&song.id)
            .bind(&song.owner_id)
            .bind(&song.title)
            .bind(&song.author)
            .bind(&song.content_path)
            .bind(&song.original_content_path)
            .bind(&song.original_image_path)
            .bind(&song.image_path)
            .bind(song.duration)
            .bind(&song.genre)
            .bind(&song.lyrics)
            .bind(&song.created_at)
            .bind(song.downloaded_at)
            .bind(song.last_played_at)
            .bind(song.play_count)
            .bind(song.like_count)
            .execute(&mut *tx)
            .await?;

            written += 1;
        }

        tx.commit().await?;
        debug!(count = written, "Upserted song metadata");
        Ok(written)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Song>> {
        let song = query_as::<_, Song>("SELECT * FROM songs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(song)
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Song>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT * FROM songs WHERE id IN ({placeholders})");

        let mut query = query_as::<_, Song>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        // Reorder to match the caller's id list; curated section ordering
        // is remote-owned.
        let mut by_id: std::collections::HashMap<String, Song> =
            rows.into_iter().map(|s| (s.id.clone(), s)).collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn find_page(&self, request: PageRequest) -> Result<Page<Song>> {
        let total: (i64,) = query_as("SELECT COUNT(*) FROM songs")
            .fetch_one(&self.pool)
            .await?;

        let items = query_as::<_, Song>(
            "SELECT * FROM songs ORDER BY created_at DESC, id LIMIT ? OFFSET ?",
        )
        .bind(request.limit)
        .bind(request.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, total.0 as u64, request))
    }

    async fn count(&self) -> Result<i64> {
        let result: (i64,) = query_as("SELECT COUNT(*) FROM songs")
            .fetch_one(&self.pool)
            .await?;
        Ok(result.0)
    }

    async fn set_content_path(
        &self,
        id: &str,
        content_path: &str,
        image_path: Option<&str>,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query(
            r#"
            UPDATE songs
            SET content_path = ?,
                image_path = COALESCE(?, image_path),
                downloaded_at = ?
            WHERE id = ?
            "#,
        )
        .bind(content_path)
        .bind(image_path)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CacheError::NotFound {
                entity_type: "Song".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn clear_content_path(&self, id: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE songs SET content_path = NULL, image_path = NULL, downloaded_at = NULL WHERE id = ?",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CacheError::NotFound {
                entity_type: "Song".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn record_play(&self, id: &str, played_at: i64) -> Result<()> {
        let result = sqlx::query(
            "UPDATE songs SET play_count = play_count + 1, last_played_at = ? WHERE id = ?",
        )
        .bind(played_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CacheError::NotFound {
                entity_type: "Song".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn song(id: &str) -> Song {
        Song {
            id: id.to_string(),
            owner_id: "user-1".to_string(),
            title: format!("Title {id}"),
            author: "Artist".to_string(),
            content_path: None,
            original_content_path: format!("https://cdn.example/{id}.mp3"),
            original_image_path: None,
            image_path: None,
            duration: 120,
            genre: Some("pop".to_string()),
            lyrics: None,
            created_at: format!("2024-01-0{}T00:00:00Z", (id.len() % 9) + 1),
            downloaded_at: None,
            last_played_at: None,
            play_count: 0,
            like_count: 0,
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteSongRepository::new(pool);

        let batch = vec![song("a"), song("b")];
        repo.upsert_metadata(&batch).await.unwrap();
        repo.upsert_metadata(&batch).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 2);
        let cached = repo.find_by_id("a").await.unwrap().unwrap();
        assert_eq!(cached.title, "Title a");
    }

    #[tokio::test]
    async fn metadata_sync_preserves_local_download_fields() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteSongRepository::new(pool);

        repo.upsert_metadata(&[song("a")]).await.unwrap();
        repo.set_content_path("a", "/media/a.mp3", Some("/media/a.jpg"))
            .await
            .unwrap();

        // Metadata refresh arrives without local pointers.
        let mut refreshed = song("a");
        refreshed.title = "New Title".to_string();
        refreshed.play_count = 3;
        repo.upsert_metadata(&[refreshed]).await.unwrap();

        let cached = repo.find_by_id("a").await.unwrap().unwrap();
        assert_eq!(cached.title, "New Title");
        assert_eq!(cached.play_count, 3);
        assert_eq!(cached.content_path.as_deref(), Some("/media/a.mp3"));
        assert_eq!(cached.image_path.as_deref(), Some("/media/a.jpg"));
        assert!(cached.downloaded_at.is_some());
    }

    #[tokio::test]
    async fn clear_content_path_keeps_metadata() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteSongRepository::new(pool);

        repo.upsert_metadata(&[song("a")]).await.unwrap();
        repo.set_content_path("a", "/media/a.mp3", None).await.unwrap();
        repo.clear_content_path("a").await.unwrap();

        let cached = repo.find_by_id("a").await.unwrap().unwrap();
        assert!(cached.content_path.is_none());
        assert!(cached.downloaded_at.is_none());
        assert_eq!(cached.title, "Title a");
    }

    #[tokio::test]
    async fn find_by_ids_preserves_requested_order() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteSongRepository::new(pool);

        repo.upsert_metadata(&[song("a"), song("b"), song("c")])
            .await
            .unwrap();

        let ids = vec!["c".to_string(), "a".to_string(), "missing".to_string()];
        let found = repo.find_by_ids(&ids).await.unwrap();
        let found_ids: Vec<&str> = found.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(found_ids, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn record_play_bumps_count_and_timestamp() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteSongRepository::new(pool);

        repo.upsert_metadata(&[song("a")]).await.unwrap();
        repo.record_play("a", 1_700_000_000).await.unwrap();
        repo.record_play("a", 1_700_000_100).await.unwrap();

        let cached = repo.find_by_id("a").await.unwrap().unwrap();
        assert_eq!(cached.play_count, 2);
        assert_eq!(cached.last_played_at, Some(1_700_000_100));
    }

    #[tokio::test]
    async fn set_content_path_on_missing_song_fails() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteSongRepository::new(pool);

        let err = repo
            .set_content_path("nope", "/media/x.mp3", None)
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::NotFound { .. }));
    }

    #[tokio::test]
    async fn find_page_windows_results() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteSongRepository::new(pool);

        let batch: Vec<Song> = ["a", "b", "c", "d", "e"].iter().map(|id| song(id)).collect();
        repo.upsert_metadata(&batch).await.unwrap();

        let page = repo.find_page(PageRequest::new(0, 2)).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
        assert!(page.has_more());

        let last = repo.find_page(PageRequest::new(4, 2)).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(!last.has_more());
    }
}
