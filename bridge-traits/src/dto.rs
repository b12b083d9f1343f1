//! Wire DTOs for the remote catalog boundary.
//!
//! The remote store sends loosely-typed rows over an inter-process channel;
//! each DTO validates its shape at the boundary so synchronizers can assume
//! well-formed data past this point.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};

/// A song row as reported by the remote store.
///
/// `content_path` and `image_path` are local resource pointers and are almost
/// always absent on the wire; the `original_*` URLs are remote-owned and
/// always present for playable songs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSong {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub content_path: Option<String>,
    pub original_content_path: String,
    #[serde(default)]
    pub original_image_path: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    /// Duration in seconds.
    pub duration: i64,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub lyrics: Option<String>,
    /// Remote creation timestamp, cached verbatim.
    pub created_at: String,
    #[serde(default)]
    pub play_count: i64,
    #[serde(default)]
    pub like_count: i64,
}

impl RemoteSong {
    pub fn validate(&self) -> Result<()> {
        require_non_empty("song.id", &self.id)?;
        require_non_empty("song.title", &self.title)?;
        require_non_empty("song.original_content_path", &self.original_content_path)?;
        Ok(())
    }
}

/// A playlist row as reported by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePlaylist {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    pub created_at: String,
}

impl RemotePlaylist {
    pub fn validate(&self) -> Result<()> {
        require_non_empty("playlist.id", &self.id)?;
        require_non_empty("playlist.owner_id", &self.owner_id)?;
        require_non_empty("playlist.title", &self.title)?;
        Ok(())
    }
}

/// A playlist membership row joined with its song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePlaylistEntry {
    pub id: String,
    pub added_at: String,
    pub song: RemoteSong,
}

impl RemotePlaylistEntry {
    pub fn validate(&self) -> Result<()> {
        require_non_empty("playlist_entry.id", &self.id)?;
        self.song.validate()
    }
}

/// A liked-song row joined with its song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteLikedSong {
    pub liked_at: String,
    pub song: RemoteSong,
}

impl RemoteLikedSong {
    pub fn validate(&self) -> Result<()> {
        self.song.validate()
    }
}

/// A spotlight (curated video highlight) row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSpotlight {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    pub original_video_path: String,
    #[serde(default)]
    pub original_thumbnail_path: Option<String>,
    pub created_at: String,
}

impl RemoteSpotlight {
    pub fn validate(&self) -> Result<()> {
        require_non_empty("spotlight.id", &self.id)?;
        require_non_empty("spotlight.original_video_path", &self.original_video_path)?;
        Ok(())
    }
}

/// The entity family a curated section lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    Songs,
    Playlists,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Songs => "songs",
            SectionKind::Playlists => "playlists",
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BridgeError::InvalidPayload {
            field: field.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song() -> RemoteSong {
        RemoteSong {
            id: "song-1".to_string(),
            owner_id: "user-1".to_string(),
            title: "Test Song".to_string(),
            author: "Test Artist".to_string(),
            content_path: None,
            original_content_path: "https://cdn.example/song-1.mp3".to_string(),
            original_image_path: None,
            image_path: None,
            duration: 180,
            genre: Some("rock".to_string()),
            lyrics: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            play_count: 0,
            like_count: 0,
        }
    }

    #[test]
    fn valid_song_passes() {
        assert!(song().validate().is_ok());
    }

    #[test]
    fn blank_id_is_rejected() {
        let mut s = song();
        s.id = "  ".to_string();
        let err = s.validate().unwrap_err();
        assert!(matches!(err, BridgeError::InvalidPayload { ref field, .. } if field == "song.id"));
    }

    #[test]
    fn entry_validation_covers_nested_song() {
        let mut entry = RemotePlaylistEntry {
            id: "entry-1".to_string(),
            added_at: "2024-01-02T00:00:00Z".to_string(),
            song: song(),
        };
        entry.song.title = String::new();
        assert!(entry.validate().is_err());
    }

    #[test]
    fn section_kind_round_trips_as_str() {
        assert_eq!(SectionKind::Songs.as_str(), "songs");
        assert_eq!(SectionKind::Playlists.to_string(), "playlists");
    }
}
