//! # Bulk Media Transfer Manager
//!
//! Strictly sequential batch downloads and deletions over a [`MediaStore`],
//! with skip-if-materialized dedup, per-item error collection (one failure
//! never aborts the batch), monotone progress reporting over a watch
//! channel, and cooperative cancellation checked between items.
//!
//! [`MediaStore`]: bridge_traits::MediaStore

pub mod manager;
pub mod progress;

pub use manager::{BulkTransferManager, TransferSummary};
pub use progress::TransferProgress;
