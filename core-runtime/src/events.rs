//! # Event Bus
//!
//! Typed broadcast channel for decoupled communication between the core
//! modules, built on `tokio::sync::broadcast`. Multiple producers clone the
//! [`EventBus`]; each `subscribe()` creates an independent receiver. Slow
//! subscribers receive `RecvError::Lagged` rather than blocking fast ones.
//!
//! Events are serializable so hosts can forward them over a process boundary
//! unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Connectivity transitions (edge-triggered).
    Network(NetworkEvent),
    /// Synchronizer lifecycle events.
    Sync(SyncEvent),
    /// Bulk media transfer events.
    Transfer(TransferEvent),
}

impl CoreEvent {
    /// Human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Network(e) => e.description(),
            CoreEvent::Sync(e) => e.description(),
            CoreEvent::Transfer(e) => e.description(),
        }
    }
}

/// Connectivity transition events.
///
/// These fire only on a change of the effective online value; repeated
/// identical signals from the transport layer are filtered out upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum NetworkEvent {
    /// Effective connectivity became online.
    Online,
    /// Effective connectivity became offline (link loss or simulation).
    Offline {
        /// Whether the developer simulation override caused this edge.
        simulated: bool,
    },
}

impl NetworkEvent {
    fn description(&self) -> &str {
        match self {
            NetworkEvent::Online => "Connectivity restored",
            NetworkEvent::Offline { .. } => "Connectivity lost",
        }
    }
}

/// Entity synchronizer lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SyncEvent {
    /// A synchronizer run began for a scope.
    Started {
        /// Scope key, e.g. "playlists:user-1" or "catalog".
        scope: String,
    },
    /// A synchronizer run completed.
    Completed {
        scope: String,
        /// Rows reconciled; partial for a catalog sync halted by an offline edge.
        count: u64,
    },
    /// A run was skipped without side effects (offline, missing id, already running).
    Skipped { scope: String, reason: String },
    /// A run failed after its preconditions passed.
    Failed { scope: String, message: String },
}

impl SyncEvent {
    fn description(&self) -> &str {
        match self {
            SyncEvent::Started { .. } => "Sync started",
            SyncEvent::Completed { .. } => "Sync completed",
            SyncEvent::Skipped { .. } => "Sync skipped",
            SyncEvent::Failed { .. } => "Sync failed",
        }
    }
}

/// Bulk media transfer events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum TransferEvent {
    /// A download or delete batch started.
    BatchStarted { total: u64, deleting: bool },
    /// One item finished (downloaded, deleted, or skipped as already done).
    ItemProcessed {
        song_id: String,
        title: String,
        percent: u8,
    },
    /// One item failed; the batch continues.
    ItemFailed { title: String, message: String },
    /// The batch ran to completion or was cancelled.
    BatchFinished {
        processed: u64,
        failed: u64,
        cancelled: bool,
    },
}

impl TransferEvent {
    fn description(&self) -> &str {
        match self {
            TransferEvent::BatchStarted { .. } => "Transfer batch started",
            TransferEvent::ItemProcessed { .. } => "Transfer item processed",
            TransferEvent::ItemFailed { .. } => "Transfer item failed",
            TransferEvent::BatchFinished { .. } => "Transfer batch finished",
        }
    }
}

/// Central event bus for publishing and subscribing to [`CoreEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Create a bus with the given per-subscriber buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error when there are none; callers that do not care use `.ok()`.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Create a new independent subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emit_without_subscribers_errors() {
        let bus = EventBus::new(10);
        let event = CoreEvent::Network(NetworkEvent::Online);
        assert!(bus.emit(event).is_err());
    }

    #[tokio::test]
    async fn all_subscribers_receive_the_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Sync(SyncEvent::Started {
            scope: "catalog".to_string(),
        });
        bus.emit(event.clone()).unwrap();

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn lagged_subscriber_is_reported() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for _ in 0..5 {
            bus.emit(CoreEvent::Network(NetworkEvent::Online)).ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[tokio::test]
    async fn events_serialize_round_trip() {
        let event = CoreEvent::Transfer(TransferEvent::ItemFailed {
            title: "Track A".to_string(),
            message: "transport error".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        let back: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn descriptions_are_stable() {
        let event = CoreEvent::Sync(SyncEvent::Skipped {
            scope: "liked:user-1".to_string(),
            reason: "offline".to_string(),
        });
        assert_eq!(event.description(), "Sync skipped");
    }
}
