//! # Core Configuration
//!
//! Builder for the settings the core crates share: database location, query
//! cache persistence path, catalog paging, and cache expiry. Validation is
//! fail-fast with actionable messages; a config that builds is usable.
//!
//! ```rust
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .database_path("/data/library.db")
//!     .query_cache_path("/data/query-cache.json")
//!     .build()
//!     .unwrap();
//! assert_eq!(config.catalog_page_size, 100);
//! ```

use crate::error::{Result, RuntimeError};
use std::path::PathBuf;
use std::time::Duration;

/// Default page size for full-catalog synchronization.
pub const DEFAULT_CATALOG_PAGE_SIZE: u32 = 100;

/// Default max age for generic offline cache entries (24 hours).
pub const DEFAULT_GENERIC_CACHE_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Settings shared by the core crates.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Path to the SQLite cache database, or ":memory:".
    pub database_path: PathBuf,

    /// File the query cache layer snapshots itself to across restarts.
    pub query_cache_path: PathBuf,

    /// Items per page for full-catalog sync.
    pub catalog_page_size: u32,

    /// Max age for generic offline cache entries before lazy pruning.
    pub generic_cache_max_age: Duration,

    /// Event bus buffer capacity per subscriber.
    pub event_buffer_size: usize,
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

/// Builder for [`CoreConfig`].
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    database_path: Option<PathBuf>,
    query_cache_path: Option<PathBuf>,
    catalog_page_size: Option<u32>,
    generic_cache_max_age: Option<Duration>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    pub fn query_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.query_cache_path = Some(path.into());
        self
    }

    pub fn catalog_page_size(mut self, size: u32) -> Self {
        self.catalog_page_size = Some(size);
        self
    }

    pub fn generic_cache_max_age(mut self, max_age: Duration) -> Self {
        self.generic_cache_max_age = Some(max_age);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<CoreConfig> {
        let database_path = self.database_path.ok_or_else(|| missing(
            "database_path",
            "call .database_path() with the SQLite cache location",
        ))?;

        let query_cache_path = self.query_cache_path.ok_or_else(|| missing(
            "query_cache_path",
            "call .query_cache_path() with the query cache snapshot file",
        ))?;

        let catalog_page_size = self.catalog_page_size.unwrap_or(DEFAULT_CATALOG_PAGE_SIZE);
        if catalog_page_size == 0 {
            return Err(RuntimeError::InvalidConfig {
                field: "catalog_page_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(CoreConfig {
            database_path,
            query_cache_path,
            catalog_page_size,
            generic_cache_max_age: self
                .generic_cache_max_age
                .unwrap_or(DEFAULT_GENERIC_CACHE_MAX_AGE),
            event_buffer_size: self.event_buffer_size.unwrap_or(100),
        })
    }
}

fn missing(field: &str, message: &str) -> RuntimeError {
    RuntimeError::InvalidConfig {
        field: field.to_string(),
        message: message.to_string(),
    }
}
