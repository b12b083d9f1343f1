//! SQLite connection pool and schema for the local cache store.
//!
//! WAL mode for concurrent readers, foreign keys enforced so membership rows
//! cascade with their parents, and schema initialization via idempotent
//! `CREATE TABLE IF NOT EXISTS` batches (the schema is owned entirely by
//! this crate).

use crate::{CacheError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Database configuration for the SQLite connection pool.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database file path or `:memory:` for an in-memory database.
    pub database_url: String,

    /// Minimum number of connections in the pool.
    pub min_connections: u32,

    /// Maximum number of connections in the pool.
    pub max_connections: u32,

    /// Maximum time to wait for a connection from the pool.
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Create a configuration pointing at a database file.
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        let path = database_path.into();
        Self {
            database_url: format!("sqlite:{}", path.display()),
            min_connections: 1,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }

    /// Create a configuration for an in-memory database (useful for tests).
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            min_connections: 1,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Create a configured SQLite connection pool with the cache schema applied.
pub async fn create_pool(config: DatabaseConfig) -> Result<Pool<Sqlite>> {
    info!(
        database_url = %config.database_url,
        max_connections = config.max_connections,
        "Creating cache database pool"
    );

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(CacheError::Database)?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .create_if_missing(true)
        .pragma("cache_size", "-64000");

    let pool = SqlitePoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(connect_options)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create connection pool");
            CacheError::Database(e)
        })?;

    init_schema(&pool).await?;
    health_check(&pool).await?;

    Ok(pool)
}

/// Create an in-memory pool with the schema applied (for tests).
pub async fn create_test_pool() -> Result<Pool<Sqlite>> {
    create_pool(DatabaseConfig::in_memory()).await
}

/// Apply the cache schema. Idempotent.
async fn init_schema(pool: &SqlitePool) -> Result<()> {
    debug!("Initializing cache schema");

    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id TEXT PRIMARY KEY NOT NULL,
            owner_id TEXT NOT NULL,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            content_path TEXT,
            original_content_path TEXT NOT NULL,
            original_image_path TEXT,
            image_path TEXT,
            duration INTEGER NOT NULL,
            genre TEXT,
            lyrics TEXT,
            created_at TEXT NOT NULL,
            downloaded_at INTEGER,
            last_played_at INTEGER,
            play_count INTEGER NOT NULL DEFAULT 0,
            like_count INTEGER NOT NULL DEFAULT 0
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS playlists (
            id TEXT PRIMARY KEY NOT NULL,
            owner_id TEXT NOT NULL,
            title TEXT NOT NULL,
            image_path TEXT,
            is_public INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS playlist_songs (
            id TEXT PRIMARY KEY NOT NULL,
            playlist_id TEXT NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
            song_id TEXT NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
            added_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS liked_songs (
            user_id TEXT NOT NULL,
            song_id TEXT NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
            liked_at TEXT NOT NULL,
            PRIMARY KEY (user_id, song_id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS spotlights (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            author TEXT,
            description TEXT,
            genre TEXT,
            original_video_path TEXT NOT NULL,
            original_thumbnail_path TEXT,
            video_path TEXT,
            thumbnail_path TEXT,
            created_at TEXT NOT NULL,
            downloaded_at INTEGER
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS section_cache (
            key TEXT PRIMARY KEY NOT NULL,
            kind TEXT NOT NULL,
            item_ids TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS offline_cache (
            key TEXT PRIMARY KEY NOT NULL,
            payload TEXT NOT NULL,
            stored_at INTEGER NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_songs_created_at ON songs(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_playlists_owner ON playlists(owner_id)",
        "CREATE INDEX IF NOT EXISTS idx_playlist_songs_playlist ON playlist_songs(playlist_id)",
        "CREATE INDEX IF NOT EXISTS idx_liked_songs_user ON liked_songs(user_id)",
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await.map_err(|e| {
            warn!(error = %e, "Schema statement failed");
            CacheError::Database(e)
        })?;
    }

    debug!("Cache schema ready");
    Ok(())
}

async fn health_check(pool: &SqlitePool) -> Result<()> {
    sqlx::query("SELECT 1").fetch_one(pool).await.map_err(|e| {
        warn!(error = %e, "Database health check failed");
        CacheError::Database(e)
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_in_memory_pool() {
        let pool = create_test_pool().await;
        assert!(pool.is_ok());
    }

    #[tokio::test]
    async fn schema_init_is_idempotent() {
        let pool = create_test_pool().await.unwrap();
        init_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn foreign_keys_enabled() {
        let pool = create_test_pool().await.unwrap();
        let result: (i32,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(result.0, 1);
    }

    #[tokio::test]
    async fn tables_exist() {
        let pool = create_test_pool().await.unwrap();
        for table in [
            "songs",
            "playlists",
            "playlist_songs",
            "liked_songs",
            "spotlights",
            "section_cache",
            "offline_cache",
        ] {
            let result: (i32,) = sqlx::query_as(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name = ?",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert_eq!(result.0, 1, "missing table {}", table);
        }
    }
}
