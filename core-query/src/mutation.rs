//! Pending mutations and their executor contract.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A write captured while offline, replayed verbatim on reconnect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingMutation {
    pub id: String,
    /// Operation name the executor dispatches on (e.g. "like-song").
    pub name: String,
    pub payload: serde_json::Value,
    /// Unix epoch seconds at submission; queue order is authoritative.
    pub enqueued_at: i64,
}

impl PendingMutation {
    pub fn new(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            payload,
            enqueued_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Executes mutations against the remote store.
///
/// The cache layer owns ordering and queueing; the executor only knows how
/// to perform one named operation.
#[async_trait::async_trait]
pub trait MutationExecutor: Send + Sync {
    async fn execute(&self, mutation: &PendingMutation) -> crate::Result<()>;
}

/// How a submitted mutation was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Executed against the remote immediately.
    Executed,
    /// Captured in the offline queue for later replay.
    Queued,
}

/// Result of draining the offline queue on reconnect.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResumeReport {
    pub executed: usize,
    pub failed: usize,
}
