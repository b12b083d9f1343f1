//! The bulk transfer manager.

use crate::progress::TransferProgress;
use bridge_traits::{DownloadRequest, MediaStore};
use core_cache::models::Song;
use core_cache::repositories::SongRepository;
use core_runtime::events::{CoreEvent, EventBus, TransferEvent};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Result of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransferSummary {
    /// Items that finished (downloaded, deleted, or skipped as already done).
    pub processed: u64,
    /// Titles of the items that failed; the batch continued past each.
    pub errors: Vec<String>,
    /// Whether the batch stopped early on a cancellation request.
    pub cancelled: bool,
}

/// Sequential batch downloads/deletes over a [`MediaStore`].
///
/// One item is in flight at a time. Items already materialized are skipped
/// without touching the store. Failures are collected per item; the batch
/// always runs to the end unless cancelled, and cancellation is only
/// honored between items.
pub struct BulkTransferManager {
    media: Arc<dyn MediaStore>,
    songs: Arc<dyn SongRepository>,
    events: EventBus,
    progress_tx: watch::Sender<TransferProgress>,
}

impl BulkTransferManager {
    pub fn new(media: Arc<dyn MediaStore>, songs: Arc<dyn SongRepository>, events: EventBus) -> Self {
        let (progress_tx, _) = watch::channel(TransferProgress::idle());
        Self {
            media,
            songs,
            events,
            progress_tx,
        }
    }

    /// Subscribe to latest-value progress snapshots.
    pub fn progress(&self) -> watch::Receiver<TransferProgress> {
        self.progress_tx.subscribe()
    }

    /// Download every item in order. Already-materialized items are skipped;
    /// a skipped item still counts as processed.
    #[instrument(skip_all, fields(total = items.len()))]
    pub async fn download_all(&self, items: &[Song], cancel: &CancellationToken) -> TransferSummary {
        self.run_batch(items, cancel, false).await
    }

    /// Delete the materialized content of every item in order. The cached
    /// metadata rows are kept; only local pointers are cleared.
    #[instrument(skip_all, fields(total = items.len()))]
    pub async fn delete_all(&self, items: &[Song], cancel: &CancellationToken) -> TransferSummary {
        self.run_batch(items, cancel, true).await
    }

    async fn run_batch(
        &self,
        items: &[Song],
        cancel: &CancellationToken,
        deleting: bool,
    ) -> TransferSummary {
        let total = items.len() as u64;
        let mut summary = TransferSummary::default();
        let mut completed = 0u64;

        self.events
            .emit(CoreEvent::Transfer(TransferEvent::BatchStarted { total, deleting }))
            .ok();
        self.publish(total, completed, None, deleting, true);

        for song in items {
            if cancel.is_cancelled() {
                info!(completed, total, "Transfer batch cancelled");
                summary.cancelled = true;
                break;
            }

            self.publish(total, completed, Some(song.title.clone()), deleting, true);

            let result = if deleting {
                self.delete_one(song).await
            } else {
                self.download_one(song).await
            };

            completed += 1;
            match result {
                Ok(()) => {
                    summary.processed += 1;
                    self.events
                        .emit(CoreEvent::Transfer(TransferEvent::ItemProcessed {
                            song_id: song.id.clone(),
                            title: song.title.clone(),
                            percent: TransferProgress::percent_of(completed, total),
                        }))
                        .ok();
                }
                Err(message) => {
                    warn!(song_id = %song.id, %message, "Transfer item failed, continuing");
                    self.events
                        .emit(CoreEvent::Transfer(TransferEvent::ItemFailed {
                            title: song.title.clone(),
                            message,
                        }))
                        .ok();
                    summary.errors.push(song.title.clone());
                }
            }
            self.publish(total, completed, None, deleting, true);
        }

        self.events
            .emit(CoreEvent::Transfer(TransferEvent::BatchFinished {
                processed: summary.processed,
                failed: summary.errors.len() as u64,
                cancelled: summary.cancelled,
            }))
            .ok();
        self.publish(total, completed, None, deleting, false);

        info!(
            processed = summary.processed,
            failed = summary.errors.len(),
            cancelled = summary.cancelled,
            "Transfer batch finished"
        );
        summary
    }

    async fn download_one(&self, song: &Song) -> Result<(), String> {
        // Dedup: anything the store already holds is not fetched again.
        let status = self
            .media
            .check_status(&song.id)
            .await
            .map_err(|e| e.to_string())?;
        if status.is_downloaded {
            debug!(song_id = %song.id, "Already materialized, skipping download");
            // Self-heal a missing cache pointer from the store's state.
            if song.content_path.is_none() {
                if let Some(local_path) = &status.local_path {
                    self.songs
                        .set_content_path(&song.id, local_path, None)
                        .await
                        .map_err(|e| e.to_string())?;
                }
            }
            return Ok(());
        }

        let request = DownloadRequest {
            song_id: song.id.clone(),
            title: song.title.clone(),
            content_url: song.original_content_path.clone(),
            image_url: song.original_image_path.clone(),
        };
        let outcome = self
            .media
            .download(&request)
            .await
            .map_err(|e| e.to_string())?;

        self.songs
            .set_content_path(&song.id, &outcome.local_path, outcome.image_path.as_deref())
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    async fn delete_one(&self, song: &Song) -> Result<(), String> {
        // Dedup: nothing to remove for an item the store never materialized.
        let status = self
            .media
            .check_status(&song.id)
            .await
            .map_err(|e| e.to_string())?;
        if !status.is_downloaded {
            debug!(song_id = %song.id, "Not materialized, skipping delete");
            // Self-heal a dangling cache pointer from the store's state.
            if song.content_path.is_some() {
                self.songs
                    .clear_content_path(&song.id)
                    .await
                    .map_err(|e| e.to_string())?;
            }
            return Ok(());
        }

        self.media.delete(&song.id).await.map_err(|e| e.to_string())?;
        self.songs
            .clear_content_path(&song.id)
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn publish(&self, total: u64, completed: u64, current: Option<String>, deleting: bool, active: bool) {
        // send_replace keeps the channel value current even with no
        // receivers, so a late subscriber sees the latest snapshot.
        self.progress_tx.send_replace(TransferProgress {
            total,
            completed,
            percent: TransferProgress::percent_of(completed, total),
            current,
            deleting,
            active,
        });
    }
}
