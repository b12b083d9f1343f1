//! # Local Cache Store
//!
//! Embedded SQLite database mirroring remote entities plus locally-owned
//! fields (download pointers, play bookkeeping, generic key/value blobs with
//! TTL).
//!
//! ## Overview
//!
//! - Typed upsert/read operations per entity behind repository traits
//! - Upserts are **merge, not replace**: locally-owned fields survive
//!   metadata-only syncs
//! - Reads never perform network I/O
//! - A generic namespaced key/value cache with lazy TTL pruning

pub mod db;
pub mod error;
pub mod models;
pub mod repositories;

pub use db::{create_pool, create_test_pool, DatabaseConfig};
pub use error::{CacheError, Result};
pub use models::{CacheEntry, LikedSong, Playlist, PlaylistSong, SectionCache, Song, Spotlight};
pub use repositories::{
    KeyValueRepository, LikedSongRepository, Page, PageRequest, PlaylistRepository,
    PlaylistSongRepository, SectionRepository, SongRepository, SpotlightRepository,
    SqliteKeyValueRepository, SqliteLikedSongRepository, SqlitePlaylistRepository,
    SqlitePlaylistSongRepository, SqliteSectionRepository, SqliteSongRepository,
    SqliteSpotlightRepository,
};
