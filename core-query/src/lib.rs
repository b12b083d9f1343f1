//! # Query Cache Integration Layer
//!
//! Offline-aware cache-aside layer between read models and the network.
//!
//! ## Overview
//!
//! - Cached payloads keyed by namespace + scope, served before any fetch
//! - While offline, missing reads register as paused instead of erroring and
//!   mutations queue in submission order
//! - On the offline-to-online edge, paused mutations drain FIFO first, then
//!   every cached read is invalidated so views refetch
//! - The whole cache snapshots to disk as JSON so a fresh process renders
//!   from the last known state before any network I/O

pub mod cache;
pub mod error;
pub mod mutation;
pub mod persistence;

pub use cache::{QueryCache, QueryEntry, QueryKey, QueryOutcome};
pub use error::{QueryError, Result};
pub use mutation::{MutationExecutor, MutationOutcome, PendingMutation, ResumeReport};
pub use persistence::{load_snapshot, save_snapshot, SNAPSHOT_NAMESPACE};
