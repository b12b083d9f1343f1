//! Whole-cache JSON snapshot persistence.
//!
//! The cache writes a single versioned envelope to a configured path and
//! restores it on startup, so the UI can render last-known data before any
//! network I/O. Restored entries come back stale and refetch on the first
//! online read.

use crate::cache::{QueryCache, QueryEntry};
use crate::error::{QueryError, Result};
use crate::mutation::PendingMutation;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Fixed namespace stamped into every snapshot.
pub const SNAPSHOT_NAMESPACE: &str = "media-library-query-cache";

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEnvelope {
    namespace: String,
    version: u32,
    saved_at: i64,
    entries: HashMap<String, QueryEntry>,
    /// Offline mutation queue in submission order; absent in older snapshots.
    #[serde(default)]
    pending_mutations: Vec<PendingMutation>,
}

/// Write the cache's entries and its offline mutation queue to `path` as a
/// versioned JSON envelope.
pub async fn save_snapshot(cache: &QueryCache, path: &Path) -> Result<()> {
    let envelope = SnapshotEnvelope {
        namespace: SNAPSHOT_NAMESPACE.to_string(),
        version: SNAPSHOT_VERSION,
        saved_at: chrono::Utc::now().timestamp(),
        entries: cache.export_entries().await,
        pending_mutations: cache.export_pending_mutations().await,
    };

    let json = serde_json::to_string(&envelope)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, json).await?;

    debug!(
        path = %path.display(),
        entries = envelope.entries.len(),
        pending_mutations = envelope.pending_mutations.len(),
        "Saved query cache snapshot"
    );
    Ok(())
}

/// Restore a snapshot from `path` into the cache.
///
/// A missing file is a clean start, not an error. An envelope with the wrong
/// namespace or an unknown version is rejected.
pub async fn load_snapshot(cache: &QueryCache, path: &Path) -> Result<usize> {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No query cache snapshot, starting empty");
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };

    let envelope: SnapshotEnvelope = serde_json::from_str(&json)?;
    if envelope.namespace != SNAPSHOT_NAMESPACE {
        warn!(namespace = %envelope.namespace, "Snapshot namespace mismatch");
        return Err(QueryError::InvalidSnapshot(format!(
            "unexpected namespace {}",
            envelope.namespace
        )));
    }
    if envelope.version != SNAPSHOT_VERSION {
        warn!(version = envelope.version, "Snapshot version unsupported");
        return Err(QueryError::InvalidSnapshot(format!(
            "unsupported version {}",
            envelope.version
        )));
    }

    let count = envelope.entries.len();
    let pending = envelope.pending_mutations.len();
    cache.restore_entries(envelope.entries).await;
    cache.restore_pending_mutations(envelope.pending_mutations).await;
    info!(
        path = %path.display(),
        entries = count,
        pending_mutations = pending,
        "Restored query cache snapshot"
    );
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{QueryKey, QueryOutcome};
    use core_net::NetworkStateMonitor;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn cache(online: bool) -> QueryCache {
        QueryCache::new(Arc::new(NetworkStateMonitor::new(online)))
    }

    #[tokio::test]
    async fn snapshot_round_trips_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        let source = cache(true);
        source.put(&QueryKey::new("songs", "list"), json!([1, 2])).await;
        source.put(&QueryKey::new("playlists", "u1"), json!(["p1"])).await;
        save_snapshot(&source, &path).await.unwrap();

        // A fresh offline process serves restored data without any fetch.
        let restored = cache(false);
        let count = load_snapshot(&restored, &path).await.unwrap();
        assert_eq!(count, 2);

        let outcome = restored
            .read_through(&QueryKey::new("songs", "list"), Duration::from_secs(3600), || async {
                Err(crate::QueryError::Fetch("no fetch offline".to_string()))
            })
            .await
            .unwrap();
        assert_eq!(outcome, QueryOutcome::Ready(json!([1, 2])));
    }

    #[tokio::test]
    async fn restored_entries_refetch_once_online() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        let source = cache(true);
        source.put(&QueryKey::new("songs", "list"), json!("old")).await;
        save_snapshot(&source, &path).await.unwrap();

        let restored = cache(true);
        load_snapshot(&restored, &path).await.unwrap();

        let outcome = restored
            .read_through(&QueryKey::new("songs", "list"), Duration::from_secs(3600), || async {
                Ok(json!("fresh"))
            })
            .await
            .unwrap();
        assert_eq!(outcome, QueryOutcome::Ready(json!("fresh")));
    }

    #[tokio::test]
    async fn queued_mutations_survive_a_restart() {
        struct RecordingExecutor {
            calls: tokio::sync::Mutex<Vec<String>>,
        }

        #[async_trait::async_trait]
        impl crate::MutationExecutor for RecordingExecutor {
            async fn execute(&self, mutation: &crate::PendingMutation) -> crate::Result<()> {
                self.calls.lock().await.push(mutation.name.clone());
                Ok(())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let executor = RecordingExecutor {
            calls: tokio::sync::Mutex::new(Vec::new()),
        };

        let source = cache(false);
        for name in ["like-song", "rename-playlist"] {
            source
                .submit_mutation(crate::PendingMutation::new(name, json!({})), &executor)
                .await
                .unwrap();
        }
        save_snapshot(&source, &path).await.unwrap();

        // The queue comes back after a process restart and replays in order.
        let monitor = Arc::new(NetworkStateMonitor::new(false));
        let restored = QueryCache::new(monitor.clone());
        load_snapshot(&restored, &path).await.unwrap();
        assert_eq!(restored.pending_mutation_count().await, 2);

        monitor.set_link_up(true);
        let report = restored.resume(&executor).await;
        assert_eq!(report.executed, 2);
        assert_eq!(
            *executor.calls.lock().await,
            vec!["like-song", "rename-playlist"]
        );
    }

    #[tokio::test]
    async fn missing_snapshot_is_a_clean_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");

        let restored = cache(true);
        let count = load_snapshot(&restored, &path).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn foreign_namespace_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        tokio::fs::write(
            &path,
            r#"{"namespace":"something-else","version":1,"saved_at":0,"entries":{}}"#,
        )
        .await
        .unwrap();

        let restored = cache(true);
        let err = load_snapshot(&restored, &path).await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidSnapshot(_)));
    }
}
