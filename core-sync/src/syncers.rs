//! # Library Syncer
//!
//! One-way reconciliation of remote catalog state into the local cache.
//!
//! ## Workflow (per scope)
//!
//! 1. Precondition checks: effective connectivity, non-blank identifier
//! 2. Guard acquisition; a duplicate trigger records a coalesced follow-up
//! 3. Remote fetch through [`RemoteCatalog`]
//! 4. DTO validation: malformed rows are logged and skipped, never persisted
//! 5. Merge upsert into the cache repositories
//! 6. Targeted query-cache invalidation for the scope
//! 7. Guard release; one follow-up run if a retry was coalesced
//!
//! The full-catalog scope pages through the remote song list and checks
//! connectivity between pages: an offline edge halts the run successfully
//! with the partial count reconciled so far.

use crate::error::Result;
use crate::guard::ScopeGuards;
use crate::outcome::{SkipReason, SyncOutcome};
use crate::scope::SyncScope;
use bridge_traits::RemoteCatalog;
use core_cache::models::{LikedSong, Playlist, PlaylistSong, Song, Spotlight};
use core_cache::repositories::{
    LikedSongRepository, PlaylistRepository, PlaylistSongRepository, SectionRepository,
    SongRepository, SpotlightRepository,
};
use core_net::NetworkStateMonitor;
use core_query::QueryCache;
use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Pages fetched per catalog request.
pub const CATALOG_PAGE_SIZE: u32 = 100;

/// Consecutive failed catalog pages tolerated before the run gives up.
const MAX_CONSECUTIVE_PAGE_FAILURES: u32 = 3;

/// Entity synchronizer for every sync scope.
pub struct LibrarySyncer {
    remote: Arc<dyn RemoteCatalog>,
    monitor: Arc<NetworkStateMonitor>,
    songs: Arc<dyn SongRepository>,
    playlists: Arc<dyn PlaylistRepository>,
    playlist_songs: Arc<dyn PlaylistSongRepository>,
    liked: Arc<dyn LikedSongRepository>,
    spotlights: Arc<dyn SpotlightRepository>,
    sections: Arc<dyn SectionRepository>,
    query: Arc<QueryCache>,
    events: EventBus,
    guards: ScopeGuards,
    page_size: u32,
}

impl LibrarySyncer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        remote: Arc<dyn RemoteCatalog>,
        monitor: Arc<NetworkStateMonitor>,
        songs: Arc<dyn SongRepository>,
        playlists: Arc<dyn PlaylistRepository>,
        playlist_songs: Arc<dyn PlaylistSongRepository>,
        liked: Arc<dyn LikedSongRepository>,
        spotlights: Arc<dyn SpotlightRepository>,
        sections: Arc<dyn SectionRepository>,
        query: Arc<QueryCache>,
        events: EventBus,
    ) -> Self {
        Self {
            remote,
            monitor,
            songs,
            playlists,
            playlist_songs,
            liked,
            spotlights,
            sections,
            query,
            events,
            guards: ScopeGuards::new(),
            page_size: CATALOG_PAGE_SIZE,
        }
    }

    /// Override the catalog page size (tests use small pages).
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Run one reconciliation for the scope.
    ///
    /// Skips (offline, blank identifier, duplicate trigger) are reported as
    /// [`SyncOutcome::Skipped`]; a duplicate trigger also requests exactly
    /// one follow-up run on the in-flight sync.
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn sync(&self, scope: &SyncScope) -> Result<SyncOutcome> {
        if !self.monitor.is_online() {
            return Ok(self.skip(scope, SkipReason::Offline));
        }
        if let Some(field) = scope.missing_identifier() {
            debug!(field, "Sync scope has a blank identifier");
            return Ok(self.skip(scope, SkipReason::MissingIdentifier));
        }

        let key = scope.key();
        if !self.guards.try_begin(&key) {
            self.guards.request_retry(&key);
            return Ok(self.skip(scope, SkipReason::AlreadyRunning));
        }

        self.events
            .emit(CoreEvent::Sync(SyncEvent::Started { scope: key.clone() }))
            .ok();

        let mut result = self.run_scope(scope).await;
        while self.guards.finish(&key) {
            if !self.monitor.is_online() {
                // Drop the coalesced run; the reconnect trigger covers it.
                self.guards.finish(&key);
                break;
            }
            debug!(scope = %key, "Running coalesced follow-up sync");
            result = self.run_scope(scope).await;
        }

        match &result {
            Ok(count) => {
                self.query.invalidate(&scope.invalidation_prefix()).await;
                self.events
                    .emit(CoreEvent::Sync(SyncEvent::Completed {
                        scope: key,
                        count: *count,
                    }))
                    .ok();
                info!(count, "Sync completed");
            }
            Err(e) => {
                self.events
                    .emit(CoreEvent::Sync(SyncEvent::Failed {
                        scope: key,
                        message: e.to_string(),
                    }))
                    .ok();
                warn!(error = %e, "Sync failed");
            }
        }

        result.map(|count| SyncOutcome::Completed { count })
    }

    fn skip(&self, scope: &SyncScope, reason: SkipReason) -> SyncOutcome {
        debug!(scope = %scope, reason = %reason, "Sync skipped");
        self.events
            .emit(CoreEvent::Sync(SyncEvent::Skipped {
                scope: scope.key(),
                reason: reason.as_str().to_string(),
            }))
            .ok();
        SyncOutcome::Skipped(reason)
    }

    async fn run_scope(&self, scope: &SyncScope) -> Result<u64> {
        match scope {
            SyncScope::Playlists { owner_id } => self.sync_playlists(owner_id).await,
            SyncScope::PlaylistEntries { playlist_id } => {
                self.sync_playlist_entries(playlist_id).await
            }
            SyncScope::LikedSongs { user_id } => self.sync_liked_songs(user_id).await,
            SyncScope::Spotlights => self.sync_spotlights().await,
            SyncScope::Section { key, kind } => self.sync_section(key, *kind).await,
            SyncScope::Catalog => self.sync_catalog().await,
        }
    }

    async fn sync_playlists(&self, owner_id: &str) -> Result<u64> {
        let remote_playlists = self.remote.fetch_playlists(owner_id).await?;

        let playlists: Vec<Playlist> = remote_playlists
            .into_iter()
            .filter(|p| match p.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Dropping malformed playlist row");
                    false
                }
            })
            .map(Playlist::from)
            .collect();

        self.playlists.sync_for_owner(owner_id, &playlists).await?;
        Ok(playlists.len() as u64)
    }

    async fn sync_playlist_entries(&self, playlist_id: &str) -> Result<u64> {
        let remote_entries = self.remote.fetch_playlist_entries(playlist_id).await?;

        let mut songs = Vec::with_capacity(remote_entries.len());
        let mut entries = Vec::with_capacity(remote_entries.len());
        for entry in &remote_entries {
            if let Err(e) = entry.validate() {
                warn!(error = %e, "Dropping malformed playlist entry");
                continue;
            }
            songs.push(Song::from(entry.song.clone()));
            entries.push(PlaylistSong::from_remote(playlist_id, entry));
        }

        // Songs first so the membership foreign keys resolve.
        self.songs.upsert_metadata(&songs).await?;
        let count = self
            .playlist_songs
            .replace_for_playlist(playlist_id, &entries)
            .await?;
        Ok(count)
    }

    async fn sync_liked_songs(&self, user_id: &str) -> Result<u64> {
        let remote_likes = self.remote.fetch_liked_songs(user_id).await?;

        let mut songs = Vec::with_capacity(remote_likes.len());
        let mut likes = Vec::with_capacity(remote_likes.len());
        for like in &remote_likes {
            if let Err(e) = like.validate() {
                warn!(error = %e, "Dropping malformed liked-song row");
                continue;
            }
            songs.push(Song::from(like.song.clone()));
            likes.push(LikedSong::from_remote(user_id, like));
        }

        self.songs.upsert_metadata(&songs).await?;
        let count = self.liked.replace_for_user(user_id, &likes).await?;
        Ok(count)
    }

    async fn sync_spotlights(&self) -> Result<u64> {
        let remote_spotlights = self.remote.fetch_spotlights().await?;

        let spotlights: Vec<Spotlight> = remote_spotlights
            .into_iter()
            .filter(|s| match s.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Dropping malformed spotlight row");
                    false
                }
            })
            .map(Spotlight::from)
            .collect();

        let count = self.spotlights.upsert_metadata(&spotlights).await?;
        Ok(count)
    }

    async fn sync_section(&self, key: &str, kind: bridge_traits::SectionKind) -> Result<u64> {
        let item_ids = self.remote.fetch_section(key, kind).await?;
        self.sections.put(key, kind, &item_ids).await?;
        Ok(item_ids.len() as u64)
    }

    /// Page through the full song catalog.
    ///
    /// Between pages the effective connectivity is re-checked; an offline
    /// edge halts the run without error, keeping the rows reconciled so far.
    /// A failed page is skipped and the run continues, up to a bound of
    /// consecutive failures.
    async fn sync_catalog(&self) -> Result<u64> {
        let mut offset = 0u32;
        let mut total = 0u64;
        let mut consecutive_failures = 0u32;

        loop {
            if !self.monitor.is_online() {
                info!(count = total, "Catalog sync halted by offline edge");
                break;
            }

            match self.remote.fetch_songs_page(offset, self.page_size).await {
                Ok(page) => {
                    consecutive_failures = 0;
                    if page.is_empty() {
                        break;
                    }
                    let page_len = page.len();

                    let songs: Vec<Song> = page
                        .into_iter()
                        .filter(|s| match s.validate() {
                            Ok(()) => true,
                            Err(e) => {
                                warn!(error = %e, "Dropping malformed song row");
                                false
                            }
                        })
                        .map(Song::from)
                        .collect();

                    total += self.songs.upsert_metadata(&songs).await?;
                    debug!(offset, page_len, total, "Catalog page reconciled");

                    if (page_len as u32) < self.page_size {
                        break;
                    }
                    offset += self.page_size;
                }
                Err(e) => {
                    consecutive_failures += 1;
                    warn!(offset, error = %e, "Catalog page failed, skipping");
                    if consecutive_failures >= MAX_CONSECUTIVE_PAGE_FAILURES {
                        warn!("Too many consecutive page failures, halting catalog sync");
                        break;
                    }
                    offset += self.page_size;
                }
            }
        }

        Ok(total)
    }
}
