//! Batch progress snapshot published over a watch channel.

use serde::{Deserialize, Serialize};

/// Latest-value progress state; intermediate values may be skipped by slow
/// observers, the percent only ever grows within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferProgress {
    /// Items in the batch.
    pub total: u64,
    /// Items finished so far (downloaded, deleted, skipped, or failed).
    pub completed: u64,
    /// Monotone completion percent, 0-100.
    pub percent: u8,
    /// Title of the item currently being transferred.
    pub current: Option<String>,
    /// Whether this batch deletes rather than downloads.
    pub deleting: bool,
    /// Whether a batch is currently running.
    pub active: bool,
}

impl TransferProgress {
    pub fn idle() -> Self {
        Self {
            total: 0,
            completed: 0,
            percent: 0,
            current: None,
            deleting: false,
            active: false,
        }
    }

    pub(crate) fn percent_of(completed: u64, total: u64) -> u8 {
        if total == 0 {
            return 100;
        }
        ((completed * 100) / total).min(100) as u8
    }
}

impl Default for TransferProgress {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_bounded() {
        assert_eq!(TransferProgress::percent_of(0, 4), 0);
        assert_eq!(TransferProgress::percent_of(2, 4), 50);
        assert_eq!(TransferProgress::percent_of(4, 4), 100);
        assert_eq!(TransferProgress::percent_of(0, 0), 100);
    }
}
