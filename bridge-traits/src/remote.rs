//! Remote catalog contract.
//!
//! The remote store is the hosted relational source of truth for metadata.
//! The core only ever issues filtered/ordered list queries through this
//! trait; it never writes remote rows directly.

use crate::dto::{RemoteLikedSong, RemotePlaylist, RemotePlaylistEntry, RemoteSong, RemoteSpotlight, SectionKind};
use crate::error::Result;

/// Read-side contract consumed by the entity synchronizers.
///
/// Implementations wrap whatever transport the host provides (HTTP, IPC
/// channel). All calls are pull-based; there is no push/subscription
/// capability on this boundary.
#[async_trait::async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// List the playlists owned by a user.
    async fn fetch_playlists(&self, owner_id: &str) -> Result<Vec<RemotePlaylist>>;

    /// List the membership rows (with songs) for one playlist, in playlist order.
    async fn fetch_playlist_entries(&self, playlist_id: &str) -> Result<Vec<RemotePlaylistEntry>>;

    /// List the songs a user has liked, most recent first.
    async fn fetch_liked_songs(&self, user_id: &str) -> Result<Vec<RemoteLikedSong>>;

    /// Fetch one page of the full song catalog.
    ///
    /// Returns fewer than `limit` items (possibly zero) on the last page.
    async fn fetch_songs_page(&self, offset: u32, limit: u32) -> Result<Vec<RemoteSong>>;

    /// List all spotlight entries.
    async fn fetch_spotlights(&self) -> Result<Vec<RemoteSpotlight>>;

    /// Fetch the ordered item ids of a curated section (e.g. "home:trends:all").
    ///
    /// The ordering is materialized by the remote store and must be cached
    /// verbatim.
    async fn fetch_section(&self, key: &str, kind: SectionKind) -> Result<Vec<String>>;
}
