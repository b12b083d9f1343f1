//! Curated-section cache repository.
//!
//! Sections are remote-materialized ordered ID lists (e.g. "trending",
//! "recently added"). The list is cached verbatim as JSON; reads hydrate it
//! against the entity tables, preserving order.

use crate::error::Result;
use crate::models::{Playlist, SectionCache, Song};
use crate::repositories::{PlaylistRepository, SongRepository};
use async_trait::async_trait;
use bridge_traits::dto::SectionKind;
use sqlx::{query_as, SqlitePool};
use tracing::debug;

/// Curated-section repository interface.
#[async_trait]
pub trait SectionRepository: Send + Sync {
    /// Store a section's ordered ID list, replacing any previous list.
    async fn put(&self, key: &str, kind: SectionKind, item_ids: &[String]) -> Result<()>;

    /// Load a section's raw cached entry, if present.
    async fn get(&self, key: &str) -> Result<Option<SectionCache>>;

    /// Hydrate a songs section against the song table, preserving the cached
    /// order. IDs without a cached row are omitted.
    async fn get_song_items(&self, key: &str, songs: &dyn SongRepository) -> Result<Vec<Song>>;

    /// Hydrate a playlists section against the playlist table.
    async fn get_playlist_items(
        &self,
        key: &str,
        playlists: &dyn PlaylistRepository,
    ) -> Result<Vec<Playlist>>;
}

/// SQLite implementation of [`SectionRepository`].
pub struct SqliteSectionRepository {
    pool: SqlitePool,
}

impl SqliteSectionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SectionRepository for SqliteSectionRepository {
    async fn put(&self, key: &str, kind: SectionKind, item_ids: &[String]) -> Result<()> {
        let payload = serde_json::to_string(item_ids)?;
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO section_cache (key, kind, item_ids, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                kind = excluded.kind,
                item_ids = excluded.item_ids,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(kind.as_str())
        .bind(&payload)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, kind = %kind, count = item_ids.len(), "Cached section");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<SectionCache>> {
        let row: Option<(String, String, String, i64)> = query_as(
            "SELECT key, kind, item_ids, updated_at FROM section_cache WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((key, kind, item_ids, updated_at)) => Ok(Some(SectionCache {
                key,
                kind,
                item_ids: serde_json::from_str(&item_ids)?,
                updated_at,
            })),
            None => Ok(None),
        }
    }

    async fn get_song_items(&self, key: &str, songs: &dyn SongRepository) -> Result<Vec<Song>> {
        match self.get(key).await? {
            Some(section) => songs.find_by_ids(&section.item_ids).await,
            None => Ok(Vec::new()),
        }
    }

    async fn get_playlist_items(
        &self,
        key: &str,
        playlists: &dyn PlaylistRepository,
    ) -> Result<Vec<Playlist>> {
        match self.get(key).await? {
            Some(section) => playlists.find_by_ids(&section.item_ids).await,
            None => Ok(Vec::new()),
        }
    }
}
