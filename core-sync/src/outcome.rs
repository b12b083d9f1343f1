//! Tagged sync results.
//!
//! A skipped run is a normal, observable outcome, not an error: callers
//! branch on the reason (show an offline banner, ignore a duplicate
//! trigger) instead of unwinding.

use serde_json::json;

/// Why a sync run was skipped without side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Effective connectivity was offline at the precondition check.
    Offline,
    /// The scope's identifier (owner, playlist, user) was empty.
    MissingIdentifier,
    /// Another run for the same scope is in flight; a follow-up run was
    /// requested.
    AlreadyRunning,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Offline => "offline",
            SkipReason::MissingIdentifier => "missing_identifier",
            SkipReason::AlreadyRunning => "already_syncing",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a synchronizer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The run reconciled `count` rows. A catalog sync halted by an offline
    /// edge still completes, with the partial count.
    Completed { count: u64 },
    /// The run was skipped before doing any work.
    Skipped(SkipReason),
}

impl SyncOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, SyncOutcome::Skipped(_))
    }

    /// JSON form hosts forward over the process boundary.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SyncOutcome::Completed { count } => json!({ "status": "completed", "count": count }),
            SyncOutcome::Skipped(reason) => {
                json!({ "status": "skipped", "reason": reason.as_str() })
            }
        }
    }
}
