//! Cached entity models.
//!
//! Rows mirror remote entities plus locally-owned fields. Remote timestamps
//! (`created_at`, `added_at`, `liked_at`) are cached verbatim as strings;
//! local bookkeeping (`downloaded_at`, `last_played_at`, `updated_at`,
//! `stored_at`) uses unix epoch seconds.

use bridge_traits::dto::{RemoteLikedSong, RemotePlaylist, RemotePlaylistEntry, RemoteSong, RemoteSpotlight};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A song row.
///
/// `content_path`, `image_path`, and `downloaded_at` are locally owned: a
/// metadata-only sync must never clear them. Only the media transfer layer
/// writes them.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Song {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub author: String,
    /// Local resource pointer set once the media has been downloaded.
    pub content_path: Option<String>,
    /// Remote content URL; always retained.
    pub original_content_path: String,
    /// Remote image URL; always retained.
    pub original_image_path: Option<String>,
    pub image_path: Option<String>,
    pub duration: i64,
    pub genre: Option<String>,
    pub lyrics: Option<String>,
    pub created_at: String,
    pub downloaded_at: Option<i64>,
    pub last_played_at: Option<i64>,
    pub play_count: i64,
    pub like_count: i64,
}

impl Song {
    pub fn is_downloaded(&self) -> bool {
        self.content_path.is_some()
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("song id must not be empty".to_string());
        }
        if self.title.trim().is_empty() {
            return Err("song title must not be empty".to_string());
        }
        Ok(())
    }
}

impl From<RemoteSong> for Song {
    fn from(remote: RemoteSong) -> Self {
        Self {
            id: remote.id,
            owner_id: remote.owner_id,
            title: remote.title,
            author: remote.author,
            content_path: remote.content_path,
            original_content_path: remote.original_content_path,
            original_image_path: remote.original_image_path,
            image_path: remote.image_path,
            duration: remote.duration,
            genre: remote.genre,
            lyrics: remote.lyrics,
            created_at: remote.created_at,
            downloaded_at: None,
            last_played_at: None,
            play_count: remote.play_count,
            like_count: remote.like_count,
        }
    }
}

/// A playlist row, owned one-to-many by a user.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub image_path: Option<String>,
    pub is_public: bool,
    pub created_at: String,
}

impl Playlist {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("playlist id must not be empty".to_string());
        }
        if self.owner_id.trim().is_empty() {
            return Err("playlist owner_id must not be empty".to_string());
        }
        Ok(())
    }
}

impl From<RemotePlaylist> for Playlist {
    fn from(remote: RemotePlaylist) -> Self {
        Self {
            id: remote.id,
            owner_id: remote.owner_id,
            title: remote.title,
            image_path: remote.image_path,
            is_public: remote.is_public,
            created_at: remote.created_at,
        }
    }
}

/// A playlist membership row. Cascade-deletes with either parent.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct PlaylistSong {
    pub id: String,
    pub playlist_id: String,
    pub song_id: String,
    pub added_at: String,
}

impl PlaylistSong {
    pub fn from_remote(playlist_id: &str, entry: &RemotePlaylistEntry) -> Self {
        Self {
            id: entry.id.clone(),
            playlist_id: playlist_id.to_string(),
            song_id: entry.song.id.clone(),
            added_at: entry.added_at.clone(),
        }
    }
}

/// A liked-song row; composite primary key (user_id, song_id).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct LikedSong {
    pub user_id: String,
    pub song_id: String,
    pub liked_at: String,
}

impl LikedSong {
    pub fn from_remote(user_id: &str, like: &RemoteLikedSong) -> Self {
        Self {
            user_id: user_id.to_string(),
            song_id: like.song.id.clone(),
            liked_at: like.liked_at.clone(),
        }
    }
}

/// A spotlight (curated video highlight) row.
///
/// `video_path`, `thumbnail_path`, and `downloaded_at` follow the same
/// locally-owned merge rule as [`Song::content_path`].
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Spotlight {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub original_video_path: String,
    pub original_thumbnail_path: Option<String>,
    pub video_path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub created_at: String,
    pub downloaded_at: Option<i64>,
}

impl From<RemoteSpotlight> for Spotlight {
    fn from(remote: RemoteSpotlight) -> Self {
        Self {
            id: remote.id,
            title: remote.title,
            author: remote.author,
            description: remote.description,
            genre: remote.genre,
            original_video_path: remote.original_video_path,
            original_thumbnail_path: remote.original_thumbnail_path,
            video_path: None,
            thumbnail_path: None,
            created_at: remote.created_at,
            downloaded_at: None,
        }
    }
}

/// A curated section materialized by the remote store, cached verbatim.
///
/// `item_ids` ordering is remote-owned and order-sensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionCache {
    pub key: String,
    pub kind: String,
    pub item_ids: Vec<String>,
    pub updated_at: i64,
}

/// A generic offline cache entry with a stored-at timestamp for TTL reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub payload: serde_json::Value,
    pub stored_at: i64,
}
