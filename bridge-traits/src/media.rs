//! Media storage contract.
//!
//! Per-item transfer primitives backing the bulk transfer manager. The
//! implementation owns the actual file I/O and remote object fetches; the
//! core only sees opaque local paths.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// What to materialize for one song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub song_id: String,
    pub title: String,
    /// Remote URL of the audio content.
    pub content_url: String,
    /// Remote URL of the cover image, if any.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Result of a successful download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    /// Local resource pointer for the audio content.
    pub local_path: String,
    /// Local pointer for the cover image, when one was fetched.
    #[serde(default)]
    pub image_path: Option<String>,
}

/// Materialization state of one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaStatus {
    pub is_downloaded: bool,
    #[serde(default)]
    pub local_path: Option<String>,
}

/// Per-item download/delete/status primitives.
///
/// Calls are issued strictly sequentially by the bulk transfer manager;
/// implementations do not need to support concurrent transfers.
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    /// Download one item and return its local pointers.
    async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutcome>;

    /// Remove the materialized content for one item. Deleting an item that
    /// is not materialized is a no-op.
    async fn delete(&self, song_id: &str) -> Result<()>;

    /// Report whether an item is already materialized.
    async fn check_status(&self, song_id: &str) -> Result<MediaStatus>;
}
