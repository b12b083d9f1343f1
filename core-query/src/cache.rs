//! The offline-aware query cache.

use crate::error::Result;
use crate::mutation::{MutationExecutor, MutationOutcome, PendingMutation, ResumeReport};
use core_net::NetworkStateMonitor;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// A cache key: namespace plus a scope string (typically an entity id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey {
    pub namespace: String,
    pub scope: String,
}

impl QueryKey {
    pub fn new(namespace: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            scope: scope.into(),
        }
    }

    /// Flat map key; prefix invalidation matches against this form.
    pub fn storage_key(&self) -> String {
        format!("{}:{}", self.namespace, self.scope)
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.scope)
    }
}

/// One cached payload with freshness bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEntry {
    pub payload: serde_json::Value,
    /// Unix epoch seconds of the last successful fetch or restore.
    pub updated_at: i64,
    /// Marked by invalidation; a stale entry still serves offline reads.
    pub stale: bool,
}

/// Result of a read: either a payload, or a registered paused query that
/// will be re-armed on reconnect.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Ready(serde_json::Value),
    Pending,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, QueryEntry>,
    paused_queries: HashSet<String>,
    paused_mutations: VecDeque<PendingMutation>,
}

/// Offline-aware cache-aside layer.
///
/// Reads serve cached payloads when fresh and refetch when online; while
/// offline a cache miss registers a paused query instead of erroring, and
/// writes queue as [`PendingMutation`]s. [`QueryCache::resume`] drains the
/// mutation queue in submission order and invalidates every read so views
/// refetch.
pub struct QueryCache {
    monitor: Arc<NetworkStateMonitor>,
    inner: Mutex<Inner>,
}

impl QueryCache {
    pub fn new(monitor: Arc<NetworkStateMonitor>) -> Self {
        Self {
            monitor,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Cache-aside read.
    ///
    /// - Fresh cached entry: served without fetching.
    /// - Stale or missing entry while online: `fetch` runs and the result is
    ///   stored. A failed fetch falls back to the stale entry if one exists.
    /// - While offline: a cached entry is served regardless of freshness; a
    ///   miss registers a paused query and yields [`QueryOutcome::Pending`].
    pub async fn read_through<F, Fut>(
        &self,
        key: &QueryKey,
        max_age: Duration,
        fetch: F,
    ) -> Result<QueryOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value>> + Send,
    {
        let storage_key = key.storage_key();
        let now = chrono::Utc::now().timestamp();

        let cached = {
            let inner = self.inner.lock().await;
            inner.entries.get(&storage_key).cloned()
        };

        if let Some(entry) = &cached {
            let fresh = !entry.stale && now.saturating_sub(entry.updated_at) <= max_age.as_secs() as i64;
            if fresh {
                return Ok(QueryOutcome::Ready(entry.payload.clone()));
            }
        }

        if !self.monitor.is_online() {
            if let Some(entry) = cached {
                debug!(key = %key, "Serving stale entry offline");
                return Ok(QueryOutcome::Ready(entry.payload));
            }
            let mut inner = self.inner.lock().await;
            inner.paused_queries.insert(storage_key);
            debug!(key = %key, "Paused query while offline");
            return Ok(QueryOutcome::Pending);
        }

        match fetch().await {
            Ok(payload) => {
                let mut inner = self.inner.lock().await;
                inner.entries.insert(
                    storage_key,
                    QueryEntry {
                        payload: payload.clone(),
                        updated_at: now,
                        stale: false,
                    },
                );
                Ok(QueryOutcome::Ready(payload))
            }
            Err(e) => {
                if let Some(entry) = cached {
                    warn!(key = %key, error = %e, "Fetch failed, serving stale entry");
                    return Ok(QueryOutcome::Ready(entry.payload));
                }
                Err(e)
            }
        }
    }

    /// Store a payload directly, marking it fresh.
    pub async fn put(&self, key: &QueryKey, payload: serde_json::Value) {
        let mut inner = self.inner.lock().await;
        inner.entries.insert(
            key.storage_key(),
            QueryEntry {
                payload,
                updated_at: chrono::Utc::now().timestamp(),
                stale: false,
            },
        );
    }

    /// Execute a mutation now if online, otherwise queue it for replay.
    pub async fn submit_mutation(
        &self,
        mutation: PendingMutation,
        executor: &dyn MutationExecutor,
    ) -> Result<MutationOutcome> {
        if self.monitor.is_online() {
            executor.execute(&mutation).await?;
            return Ok(MutationOutcome::Executed);
        }

        let mut inner = self.inner.lock().await;
        debug!(name = %mutation.name, queued = inner.paused_mutations.len() + 1, "Queued offline mutation");
        inner.paused_mutations.push_back(mutation);
        Ok(MutationOutcome::Queued)
    }

    /// Drain the offline mutation queue in submission order, then invalidate
    /// every cached read and re-arm paused queries.
    ///
    /// Called on the offline-to-online edge, before any synchronizer runs.
    /// A failed replay is logged and dropped; the rest of the queue still
    /// drains.
    pub async fn resume(&self, executor: &dyn MutationExecutor) -> ResumeReport {
        let mut report = ResumeReport::default();

        loop {
            let mutation = {
                let mut inner = self.inner.lock().await;
                inner.paused_mutations.pop_front()
            };
            let Some(mutation) = mutation else { break };

            match executor.execute(&mutation).await {
                Ok(()) => report.executed += 1,
                Err(e) => {
                    warn!(name = %mutation.name, id = %mutation.id, error = %e, "Queued mutation replay failed");
                    report.failed += 1;
                }
            }
        }

        let mut inner = self.inner.lock().await;
        for entry in inner.entries.values_mut() {
            entry.stale = true;
        }
        inner.paused_queries.clear();
        debug!(executed = report.executed, failed = report.failed, "Resumed query layer");

        report
    }

    /// Mark every entry whose storage key starts with `prefix` as stale.
    pub async fn invalidate(&self, prefix: &str) {
        let mut inner = self.inner.lock().await;
        let mut count = 0usize;
        for (key, entry) in inner.entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.stale = true;
                count += 1;
            }
        }
        debug!(prefix = %prefix, count, "Invalidated cached queries");
    }

    /// Mark every entry as stale.
    pub async fn invalidate_all(&self) {
        let mut inner = self.inner.lock().await;
        for entry in inner.entries.values_mut() {
            entry.stale = true;
        }
    }

    pub async fn pending_mutation_count(&self) -> usize {
        self.inner.lock().await.paused_mutations.len()
    }

    pub async fn paused_query_count(&self) -> usize {
        self.inner.lock().await.paused_queries.len()
    }

    /// Export every entry for snapshot persistence.
    pub async fn export_entries(&self) -> HashMap<String, QueryEntry> {
        self.inner.lock().await.entries.clone()
    }

    /// Replace the entry map from a restored snapshot. Restored entries are
    /// marked stale so the first online read refetches.
    pub async fn restore_entries(&self, entries: HashMap<String, QueryEntry>) {
        let mut inner = self.inner.lock().await;
        inner.entries = entries;
        for entry in inner.entries.values_mut() {
            entry.stale = true;
        }
    }

    /// Export the offline mutation queue in submission order for snapshot
    /// persistence.
    pub async fn export_pending_mutations(&self) -> Vec<PendingMutation> {
        self.inner.lock().await.paused_mutations.iter().cloned().collect()
    }

    /// Re-queue mutations restored from a snapshot, behind anything already
    /// queued in this process.
    pub async fn restore_pending_mutations(&self, mutations: Vec<PendingMutation>) {
        let mut inner = self.inner.lock().await;
        inner.paused_mutations.extend(mutations);
    }
}
