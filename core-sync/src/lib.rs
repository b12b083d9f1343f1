//! # Entity Synchronizers and Background Sync Orchestrator
//!
//! Pulls remote catalog state into the local cache, scope by scope.
//!
//! ## Overview
//!
//! - Every sync is a one-way reconciliation: remote rows are merge-upserted
//!   into the cache, and locally-owned fields (download pointers, play
//!   bookkeeping) are never touched
//! - Precondition failures (offline, missing identifier, a run already in
//!   flight) are tagged [`SyncOutcome::Skipped`] results, never errors
//! - At most one run per scope is in flight; concurrent triggers coalesce
//!   into exactly one follow-up run
//! - The full-catalog sync pages through the remote song list and halts
//!   successfully with a partial count on an offline edge
//! - The orchestrator watches connectivity edges and, on reconnect, first
//!   replays the query layer's queued mutations, then triggers every
//!   registered scope

pub mod error;
pub mod guard;
pub mod orchestrator;
pub mod outcome;
pub mod scope;
pub mod syncers;

pub use error::{Result, SyncError};
pub use guard::ScopeGuards;
pub use orchestrator::SyncOrchestrator;
pub use outcome::{SkipReason, SyncOutcome};
pub use scope::SyncScope;
pub use syncers::LibrarySyncer;
