//! Playlist repository trait and implementation.

use crate::error::{CacheError, Result};
use crate::models::Playlist;
use async_trait::async_trait;
use sqlx::{query_as, SqlitePool};
use tracing::debug;

/// Playlist repository interface for data access operations.
#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    /// Replace the owner's playlist set with the given remote snapshot.
    ///
    /// Rows are upserted; the owner's cached playlists absent from the
    /// snapshot are deleted (relaying a remote deletion), and membership
    /// rows cascade with them. Playlists of other owners are untouched.
    /// Returns the number of rows upserted.
    async fn sync_for_owner(&self, owner_id: &str, playlists: &[Playlist]) -> Result<u64>;

    /// Find a playlist by its ID.
    async fn find_by_id(&self, id: &str) -> Result<Option<Playlist>>;

    /// Find playlists by a set of IDs, preserving the order of `ids`.
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Playlist>>;

    /// All cached playlists for an owner, newest first.
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Playlist>>;

    /// Count total cached playlists.
    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of [`PlaylistRepository`].
pub struct SqlitePlaylistRepository {
    pool: SqlitePool,
}

impl SqlitePlaylistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaylistRepository for SqlitePlaylistRepository {
    async fn sync_for_owner(&self, owner_id: &str, playlists: &[Playlist]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0u64;

        for playlist in playlists {
            playlist
                .validate()
                .map_err(|msg| CacheError::InvalidInput {
                    field: "playlist".to_string(),
                    message: msg,
                })?;

            sqlx::query(
                r#"
                INSERT INTO playlists (id, owner_id, title, image_path, is_public, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    owner_id = excluded.owner_id,
                    title = excluded.title,
                    image_path = excluded.image_path,
                    is_public = excluded.is_public,
                    created_at = excluded.created_at
                "#,
            )
            .bind(&playlist.id)
            .bind(&playlist.owner_id)
            .bind(&playlist.title)
            .bind(&playlist.image_path)
            .bind(playlist.is_public)
            .bind(&playlist.created_at)
            .execute(&mut *tx)
            .await?;

            written += 1;
        }

        // Drop the owner's rows the remote no longer reports. Membership
        // rows cascade via the foreign key.
        if playlists.is_empty() {
            sqlx::query("DELETE FROM playlists WHERE owner_id = ?")
                .bind(owner_id)
                .execute(&mut *tx)
                .await?;
        } else {
            let placeholders = vec!["?"; playlists.len()].join(", ");
            let sql = format!(
                "DELETE FROM playlists WHERE owner_id = ? AND id NOT IN ({placeholders})"
            );
            let mut query = sqlx::query(&sql).bind(owner_id);
            for playlist in playlists {
                query = query.bind(&playlist.id);
            }
            query.execute(&mut *tx).await?;
        }

        tx.commit().await?;
        debug!(owner_id = %owner_id, count = written, "Synced playlists for owner");
        Ok(written)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Playlist>> {
        let playlist = query_as::<_, Playlist>("SELECT * FROM playlists WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(playlist)
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Playlist>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT * FROM playlists WHERE id IN ({placeholders})");

        let mut query = query_as::<_, Playlist>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut by_id: std::collections::HashMap<String, Playlist> =
            rows.into_iter().map(|p| (p.id.clone(), p)).collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Playlist>> {
        let playlists = query_as::<_, Playlist>(
            "SELECT * FROM playlists WHERE owner_id = ? ORDER BY created_at DESC, id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(playlists)
    }

    async fn count(&self) -> Result<i64> {
        let result: (i64,) = query_as("SELECT COUNT(*) FROM playlists")
            .fetch_one(&self.pool)
            .await?;
        Ok(result.0)
    }
}
