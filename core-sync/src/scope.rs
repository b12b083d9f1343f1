//! Sync scopes: one reconcilable unit of remote state.

use bridge_traits::SectionKind;

/// What a single synchronizer run reconciles.
///
/// The guard table and the event stream key off [`SyncScope::key`], so two
/// scopes with the same key coalesce and two with different keys run
/// independently (e.g. two different playlists).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SyncScope {
    /// A user's playlist set.
    Playlists { owner_id: String },
    /// One playlist's membership rows (with their songs).
    PlaylistEntries { playlist_id: String },
    /// A user's liked-song set.
    LikedSongs { user_id: String },
    /// The spotlight list.
    Spotlights,
    /// One curated section's ordered id list.
    Section { key: String, kind: SectionKind },
    /// The full paginated song catalog.
    Catalog,
}

impl SyncScope {
    /// Stable key used for guard state and event payloads.
    pub fn key(&self) -> String {
        match self {
            SyncScope::Playlists { owner_id } => format!("playlists:{owner_id}"),
            SyncScope::PlaylistEntries { playlist_id } => format!("playlist-entries:{playlist_id}"),
            SyncScope::LikedSongs { user_id } => format!("liked:{user_id}"),
            SyncScope::Spotlights => "spotlights".to_string(),
            SyncScope::Section { key, .. } => format!("section:{key}"),
            SyncScope::Catalog => "catalog".to_string(),
        }
    }

    /// Query-cache prefix invalidated after a completed run.
    pub fn invalidation_prefix(&self) -> String {
        match self {
            SyncScope::Playlists { owner_id } => format!("playlists:{owner_id}"),
            SyncScope::PlaylistEntries { playlist_id } => format!("playlist-entries:{playlist_id}"),
            SyncScope::LikedSongs { user_id } => format!("liked:{user_id}"),
            SyncScope::Spotlights => "spotlights:".to_string(),
            SyncScope::Section { key, .. } => format!("section:{key}"),
            SyncScope::Catalog => "songs:".to_string(),
        }
    }

    /// The identifier field that is empty, if any.
    ///
    /// A scope with a blank identifier can never produce a meaningful remote
    /// query, so the run is skipped up front.
    pub fn missing_identifier(&self) -> Option<&'static str> {
        let blank = |s: &str| s.trim().is_empty();
        match self {
            SyncScope::Playlists { owner_id } if blank(owner_id) => Some("owner_id"),
            SyncScope::PlaylistEntries { playlist_id } if blank(playlist_id) => Some("playlist_id"),
            SyncScope::LikedSongs { user_id } if blank(user_id) => Some("user_id"),
            SyncScope::Section { key, .. } if blank(key) => Some("key"),
            _ => None,
        }
    }
}

impl std::fmt::Display for SyncScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}
