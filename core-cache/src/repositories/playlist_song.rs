//! Playlist membership repository trait and implementation.

use crate::error::Result;
use crate::models::{PlaylistSong, Song};
use async_trait::async_trait;
use sqlx::{query_as, SqlitePool};
use tracing::debug;

/// Playlist membership repository interface.
#[async_trait]
pub trait PlaylistSongRepository: Send + Sync {
    /// Replace the membership rows for one playlist with the remote snapshot.
    ///
    /// Songs referenced by the entries must already be cached (the
    /// synchronizer upserts them first). Returns the number of rows written.
    async fn replace_for_playlist(
        &self,
        playlist_id: &str,
        entries: &[PlaylistSong],
    ) -> Result<u64>;

    /// Membership rows for a playlist, in added order.
    async fn find_by_playlist(&self, playlist_id: &str) -> Result<Vec<PlaylistSong>>;

    /// The playlist's songs joined through the membership table, in added order.
    async fn find_songs(&self, playlist_id: &str) -> Result<Vec<Song>>;
}

/// SQLite implementation of [`PlaylistSongRepository`].
pub struct SqlitePlaylistSongRepository {
    pool: SqlitePool,
}

impl SqlitePlaylistSongRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaylistSongRepository for SqlitePlaylistSongRepository {
    async fn replace_for_playlist(
        &self,
        playlist_id: &str,
        entries: &[PlaylistSong],
    ) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ?")
            .bind(playlist_id)
            .execute(&mut *tx)
            .await?;

        let mut written = 0u64;
        for entry in entries {
            sqlx::query(
                "INSERT INTO playlist_songs (id, playlist_id, song_id, added_at) VALUES (?, ?, ?, ?)",
            )
            .bind(&entry.id)
            .bind(playlist_id)
            .bind(&entry.song_id)
            .bind(&entry.added_at)
            .execute(&mut *tx)
            .await?;
            written += 1;
        }

        tx.commit().await?;
        debug!(playlist_id = %playlist_id, count = written, "Replaced playlist membership");
        Ok(written)
    }

    async fn find_by_playlist(&self, playlist_id: &str) -> Result<Vec<PlaylistSong>> {
        let rows = query_as::<_, PlaylistSong>(
            "SELECT * FROM playlist_songs WHERE playlist_id = ? ORDER BY added_at, id",
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_songs(&self, playlist_id: &str) -> Result<Vec<Song>> {
        let songs = query_as::<_, Song>(
            r#"
            SELECT s.* FROM songs s
            JOIN playlist_songs ps ON ps.song_id = s.id
            WHERE ps.playlist_id = ?
            ORDER BY ps.added_at, ps.id
            "#,
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(songs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::models::Playlist;
    use crate::repositories::{
        PlaylistRepository, SongRepository, SqlitePlaylistRepository, SqliteSongRepository,
    };

    fn song(id: &str) -> Song {
        Song {
            id: id.to_string(),
            owner_id: "u1".to_string(),
            title: format!("Song {id}"),
            author: "Artist".to_string(),
            content_path: None,
            original_content_path: format!("https://cdn.example/{id}.mp3"),
            original_image_path: None,
            image_path: None,
            duration: 90,
            genre: None,
            lyrics: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            downloaded_at: None,
            last_played_at: None,
            play_count: 0,
            like_count: 0,
        }
    }

    fn entry(id: &str, song_id: &str, added_at: &str) -> PlaylistSong {
        PlaylistSong {
            id: id.to_string(),
            playlist_id: "p1".to_string(),
            song_id: song_id.to_string(),
            added_at: added_at.to_string(),
        }
    }

    async fn seed(pool: &SqlitePool) {
        let songs = SqliteSongRepository::new(pool.clone());
        songs
            .upsert_metadata(&[song("a"), song("b"), song("c")])
            .await
            .unwrap();

        let playlists = SqlitePlaylistRepository::new(pool.clone());
        playlists
            .sync_for_owner(
                "u1",
                &[Playlist {
                    id: "p1".to_string(),
                    owner_id: "u1".to_string(),
                    title: "Mix".to_string(),
                    image_path: None,
                    is_public: true,
                    created_at: "2024-02-01T00:00:00Z".to_string(),
                }],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn replace_swaps_membership() {
        let pool = create_test_pool().await.unwrap();
        seed(&pool).await;
        let repo = SqlitePlaylistSongRepository::new(pool);

        repo.replace_for_playlist(
            "p1",
            &[
                entry("e1", "a", "2024-02-01T01:00:00Z"),
                entry("e2", "b", "2024-02-01T02:00:00Z"),
            ],
        )
        .await
        .unwrap();

        repo.replace_for_playlist("p1", &[entry("e3", "c", "2024-02-01T03:00:00Z")])
            .await
            .unwrap();

        let rows = repo.find_by_playlist("p1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].song_id, "c");
    }

    #[tokio::test]
    async fn find_songs_joins_in_added_order() {
        let pool = create_test_pool().await.unwrap();
        seed(&pool).await;
        let repo = SqlitePlaylistSongRepository::new(pool);

        repo.replace_for_playlist(
            "p1",
            &[
                entry("e1", "b", "2024-02-01T02:00:00Z"),
                entry("e2", "a", "2024-02-01T01:00:00Z"),
            ],
        )
        .await
        .unwrap();

        let songs = repo.find_songs("p1").await.unwrap();
        let ids: Vec<&str> = songs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn membership_cascades_with_playlist_delete() {
        let pool = create_test_pool().await.unwrap();
        seed(&pool).await;
        let repo = SqlitePlaylistSongRepository::new(pool.clone());

        repo.replace_for_playlist("p1", &[entry("e1", "a", "2024-02-01T01:00:00Z")])
            .await
            .unwrap();

        let playlists = SqlitePlaylistRepository::new(pool);
        playlists.sync_for_owner("u1", &[]).await.unwrap();

        assert_eq!(repo.find_by_playlist("p1").await.unwrap().len(), 0);
    }
}
