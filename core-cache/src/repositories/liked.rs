//! Liked-songs repository trait and implementation.

use crate::error::Result;
use crate::models::{LikedSong, Song};
use async_trait::async_trait;
use sqlx::{query_as, SqlitePool};
use tracing::debug;

/// Liked-songs repository interface.
#[async_trait]
pub trait LikedSongRepository: Send + Sync {
    /// Replace a user's liked set with the remote snapshot.
    ///
    /// Songs referenced by the rows must already be cached. Returns the
    /// number of rows written.
    async fn replace_for_user(&self, user_id: &str, likes: &[LikedSong]) -> Result<u64>;

    /// The user's liked songs joined through the likes table, most recently
    /// liked first.
    async fn find_songs(&self, user_id: &str) -> Result<Vec<Song>>;

    /// Whether the user has liked the given song.
    async fn is_liked(&self, user_id: &str, song_id: &str) -> Result<bool>;
}

/// SQLite implementation of [`LikedSongRepository`].
pub struct SqliteLikedSongRepository {
    pool: SqlitePool,
}

impl SqliteLikedSongRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikedSongRepository for SqliteLikedSongRepository {
    async fn replace_for_user(&self, user_id: &str, likes: &[LikedSong]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM liked_songs WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let mut written = 0u64;
        for like in likes {
            sqlx::query("INSERT INTO liked_songs (user_id, song_id, liked_at) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(&like.song_id)
                .bind(&like.liked_at)
                .execute(&mut *tx)
                .await?;
            written += 1;
        }

        tx.commit().await?;
        debug!(user_id = %user_id, count = written, "Replaced liked songs");
        Ok(written)
    }

    async fn find_songs(&self, user_id: &str) -> Result<Vec<Song>> {
        let songs = query_as::<_, Song>(
            r#"
            SELECT s.* FROM songs s
            JOIN liked_songs ls ON ls.song_id = s.id
            WHERE ls.user_id = ?
            ORDER BY ls.liked_at DESC, s.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(songs)
    }

    async fn is_liked(&self, user_id: &str, song_id: &str) -> Result<bool> {
        let result: (i64,) = query_as(
            "SELECT COUNT(*) FROM liked_songs WHERE user_id = ? AND song_id = ?",
        )
        .bind(user_id)
        .bind(song_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0 > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::repositories::{SongRepository, SqliteSongRepository};

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

    fn like(song_id: &str, liked_at: &str) -> LikedSong {
        LikedSong {
            user_id: "u1".to_string(),
            song_id: song_id.to_string(),
            liked_at: liked_at.to_string(),
        }
    }

    #[tokio::test]
    async fn replace_swaps_liked_set() {
        let pool = create_test_pool().await.unwrap();
        let songs = SqliteSongRepository::new(pool.clone());
        songs.upsert_metadata(&[song("a"), song("b")]).await.unwrap();

        let repo = SqliteLikedSongRepository::new(pool);
        repo.replace_for_user("u1", &[like("a", "2024-03-01T00:00:00Z")])
            .await
            .unwrap();
        repo.replace_for_user("u1", &[like("b", "2024-03-02T00:00:00Z")])
            .await
            .unwrap();

        assert!(!repo.is_liked("u1", "a").await.unwrap());
        assert!(repo.is_liked("u1", "b").await.unwrap());
    }

    #[tokio::test]
    async fn find_songs_orders_newest_like_first() {
        let pool = create_test_pool().await.unwrap();
        let songs = SqliteSongRepository::new(pool.clone());
        songs.upsert_metadata(&[song("a"), song("b")]).await.unwrap();

        let repo = SqliteLikedSongRepository::new(pool);
        repo.replace_for_user(
            "u1",
            &[
                like("a", "2024-03-01T00:00:00Z"),
                like("b", "2024-03-05T00:00:00Z"),
            ],
        )
        .await
        .unwrap();

        let liked = repo.find_songs("u1").await.unwrap();
        let ids: Vec<&str> = liked.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn likes_are_scoped_per_user() {
        let pool = create_test_pool().await.unwrap();
        let songs = SqliteSongRepository::new(pool.clone());
        songs.upsert_metadata(&[song("a")]).await.unwrap();

        let repo = SqliteLikedSongRepository::new(pool);
        repo.replace_for_user("u1", &[like("a", "2024-03-01T00:00:00Z")])
            .await
            .unwrap();
        repo.replace_for_user("u2", &[]).await.unwrap();

        assert!(repo.is_liked("u1", "a").await.unwrap());
        assert!(!repo.is_liked("u2", "a").await.unwrap());
    }
}
