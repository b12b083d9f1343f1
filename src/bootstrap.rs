//! Host-facing assembly of the core.
//!
//! Builds every member crate's moving parts from one validated
//! [`CoreConfig`]: the cache pool from the database path, the event bus from
//! the buffer capacity, the syncer from the catalog page size, and the query
//! layer restored from the snapshot path. Hosts supply the two bridge
//! implementations and a mutation executor; everything else is wired here.

use bridge_traits::{MediaStore, RemoteCatalog};
use core_cache::{
    create_pool, DatabaseConfig, KeyValueRepository, SqliteKeyValueRepository,
    SqliteLikedSongRepository, SqlitePlaylistRepository, SqlitePlaylistSongRepository,
    SqliteSectionRepository, SqliteSongRepository, SqliteSpotlightRepository,
};
use core_net::NetworkStateMonitor;
use core_query::{load_snapshot, save_snapshot, MutationExecutor, QueryCache};
use core_runtime::config::CoreConfig;
use core_runtime::events::EventBus;
use core_sync::{LibrarySyncer, SyncOrchestrator};
use core_transfer::BulkTransferManager;
use std::sync::Arc;
use tracing::{info, warn};

/// Errors surfaced while assembling or persisting the core.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("cache store error: {0}")]
    Cache(#[from] core_cache::CacheError),

    #[error("query snapshot error: {0}")]
    Query(#[from] core_query::QueryError),
}

/// The assembled core, handed to the host after [`bootstrap`].
pub struct CoreHandle {
    config: CoreConfig,
    pub events: EventBus,
    pub monitor: Arc<NetworkStateMonitor>,
    pub query: Arc<QueryCache>,
    pub syncer: Arc<LibrarySyncer>,
    pub orchestrator: Arc<SyncOrchestrator>,
    pub transfers: Arc<BulkTransferManager>,
    kv: Arc<dyn KeyValueRepository>,
}

impl CoreHandle {
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Persist the query cache (entries plus the queued offline mutations)
    /// to the configured snapshot path.
    pub async fn save_query_snapshot(&self) -> Result<(), BootstrapError> {
        save_snapshot(&self.query, &self.config.query_cache_path).await?;
        Ok(())
    }

    /// Read a generic cached value, pruned at the configured max age.
    pub async fn cached_value(&self, key: &str) -> Result<Option<serde_json::Value>, BootstrapError> {
        let entry = self.kv.get(key, self.config.generic_cache_max_age).await?;
        Ok(entry.map(|e| e.payload))
    }

    /// Store a generic cached value under a namespaced key.
    pub async fn cache_value(&self, key: &str, payload: &serde_json::Value) -> Result<(), BootstrapError> {
        self.kv.set(key, payload).await?;
        Ok(())
    }
}

/// Assemble the core from a validated configuration and the host's bridge
/// implementations.
///
/// An unreadable or foreign query snapshot is logged and skipped; it never
/// blocks startup.
pub async fn bootstrap(
    config: CoreConfig,
    remote: Arc<dyn RemoteCatalog>,
    media: Arc<dyn MediaStore>,
    executor: Arc<dyn MutationExecutor>,
) -> Result<CoreHandle, BootstrapError> {
    let pool = create_pool(DatabaseConfig::new(config.database_path.clone())).await?;
    let events = EventBus::new(config.event_buffer_size);
    let monitor = Arc::new(NetworkStateMonitor::default());

    let query = Arc::new(QueryCache::new(monitor.clone()));
    match load_snapshot(&query, &config.query_cache_path).await {
        Ok(entries) => info!(entries, "Query cache snapshot loaded"),
        Err(e) => warn!(error = %e, "Query cache snapshot unusable, starting empty"),
    }

    let songs = Arc::new(SqliteSongRepository::new(pool.clone()));
    let playlists = Arc::new(SqlitePlaylistRepository::new(pool.clone()));
    let playlist_songs = Arc::new(SqlitePlaylistSongRepository::new(pool.clone()));
    let liked = Arc::new(SqliteLikedSongRepository::new(pool.clone()));
    let spotlights = Arc::new(SqliteSpotlightRepository::new(pool.clone()));
    let sections = Arc::new(SqliteSectionRepository::new(pool.clone()));
    let kv: Arc<dyn KeyValueRepository> = Arc::new(SqliteKeyValueRepository::new(pool));

    let syncer = Arc::new(
        LibrarySyncer::new(
            remote,
            monitor.clone(),
            songs.clone(),
            playlists,
            playlist_songs,
            liked,
            spotlights,
            sections,
            query.clone(),
            events.clone(),
        )
        .with_page_size(config.catalog_page_size),
    );
    let orchestrator = Arc::new(SyncOrchestrator::new(
        syncer.clone(),
        monitor.clone(),
        query.clone(),
        executor,
    ));
    let transfers = Arc::new(BulkTransferManager::new(media, songs, events.clone()));

    info!(
        database = %config.database_path.display(),
        page_size = config.catalog_page_size,
        "Core assembled"
    );

    Ok(CoreHandle {
        config,
        events,
        monitor,
        query,
        syncer,
        orchestrator,
        transfers,
        kv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{
        DownloadOutcome, DownloadRequest, MediaStatus, RemoteLikedSong, RemotePlaylist,
        RemotePlaylistEntry, RemoteSong, RemoteSpotlight, SectionKind,
    };
    use core_query::PendingMutation;
    use core_sync::{SyncOutcome, SyncScope};
    use serde_json::json;

    struct EmptyRemote;

    #[async_trait::async_trait]
    impl RemoteCatalog for EmptyRemote {
        async fn fetch_playlists(&self, _owner_id: &str) -> bridge_traits::Result<Vec<RemotePlaylist>> {
            Ok(Vec::new())
        }

        async fn fetch_playlist_entries(
            &self,
            _playlist_id: &str,
        ) -> bridge_traits::Result<Vec<RemotePlaylistEntry>> {
            Ok(Vec::new())
        }

        async fn fetch_liked_songs(&self, _user_id: &str) -> bridge_traits::Result<Vec<RemoteLikedSong>> {
            Ok(Vec::new())
        }

        async fn fetch_songs_page(&self, _offset: u32, _limit: u32) -> bridge_traits::Result<Vec<RemoteSong>> {
            Ok(Vec::new())
        }

        async fn fetch_spotlights(&self) -> bridge_traits::Result<Vec<RemoteSpotlight>> {
            Ok(Vec::new())
        }

        async fn fetch_section(&self, _key: &str, _kind: SectionKind) -> bridge_traits::Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    struct NullMedia;

    #[async_trait::async_trait]
    impl MediaStore for NullMedia {
        async fn download(&self, request: &DownloadRequest) -> bridge_traits::Result<DownloadOutcome> {
            Ok(DownloadOutcome {
                local_path: format!("/media/{}.mp3", request.song_id),
                image_path: None,
            })
        }

        async fn delete(&self, _song_id: &str) -> bridge_traits::Result<()> {
            Ok(())
        }

        async fn check_status(&self, _song_id: &str) -> bridge_traits::Result<MediaStatus> {
            Ok(MediaStatus {
                is_downloaded: false,
                local_path: None,
            })
        }
    }

    struct NullExecutor;

    #[async_trait::async_trait]
    impl MutationExecutor for NullExecutor {
        async fn execute(&self, _mutation: &PendingMutation) -> core_query::Result<()> {
            Ok(())
        }
    }

    async fn handle(dir: &tempfile::TempDir) -> CoreHandle {
        let config = CoreConfig::builder()
            .database_path(":memory:")
            .query_cache_path(dir.path().join("query-cache.json"))
            .catalog_page_size(25)
            .build()
            .unwrap();
        bootstrap(
            config,
            Arc::new(EmptyRemote),
            Arc::new(NullMedia),
            Arc::new(NullExecutor),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn assembled_core_runs_a_sync() {
        let dir = tempfile::tempdir().unwrap();
        let core = handle(&dir).await;

        let outcome = core.syncer.sync(&SyncScope::Spotlights).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Completed { count: 0 });
    }

    #[tokio::test]
    async fn generic_cache_round_trips_through_the_handle() {
        let dir = tempfile::tempdir().unwrap();
        let core = handle(&dir).await;

        core.cache_value("settings:theme", &json!("dark")).await.unwrap();
        let value = core.cached_value("settings:theme").await.unwrap();
        assert_eq!(value, Some(json!("dark")));

        assert_eq!(core.cached_value("settings:nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn snapshot_saves_to_the_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let core = handle(&dir).await;

        core.query
            .put(&core_query::QueryKey::new("songs", "list"), json!([1]))
            .await;
        core.save_query_snapshot().await.unwrap();

        assert!(dir.path().join("query-cache.json").exists());
    }

    #[tokio::test]
    async fn config_is_exposed_on_the_handle() {
        let dir = tempfile::tempdir().unwrap();
        let core = handle(&dir).await;
        assert_eq!(core.config().catalog_page_size, 25);
    }
}
