//! Connectivity state tracking with a developer simulation override.
//!
//! The effective online value is the logical AND of the low-level link
//! signal and "not simulated offline". Transitions are edge-triggered:
//! subscribers see an event only when the effective value changes, never on
//! repeated identical signals, so downstream synchronizer triggers cannot
//! fire redundantly.
//!
//! This component only reports state; retry and backoff policy live with the
//! callers.

use core_runtime::events::NetworkEvent;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info};

const EVENT_BUFFER: usize = 16;

#[derive(Debug, Clone, Copy)]
struct MonitorState {
    link_up: bool,
    simulated_offline: bool,
}

impl MonitorState {
    fn effective_online(&self) -> bool {
        self.link_up && !self.simulated_offline
    }
}

/// Single source of truth for connectivity.
///
/// Cheap to share behind an `Arc`; all methods are synchronous and take
/// short internal locks. Dropping a receiver unsubscribes it.
pub struct NetworkStateMonitor {
    state: Mutex<MonitorState>,
    sender: broadcast::Sender<NetworkEvent>,
}

impl NetworkStateMonitor {
    /// Create a monitor with the given initial link state and no simulation.
    pub fn new(link_up: bool) -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            state: Mutex::new(MonitorState {
                link_up,
                simulated_offline: false,
            }),
            sender,
        }
    }

    /// Effective online value: link up AND not simulated offline.
    pub fn is_online(&self) -> bool {
        self.state.lock().unwrap().effective_online()
    }

    /// Whether the developer simulation override is active.
    pub fn is_simulated_offline(&self) -> bool {
        self.state.lock().unwrap().simulated_offline
    }

    /// Report the low-level connectivity signal from the transport layer.
    ///
    /// Publishes an edge event only when the effective value changes.
    pub fn set_link_up(&self, link_up: bool) {
        self.transition(|state| state.link_up = link_up);
    }

    /// Toggle the simulated-offline developer override.
    ///
    /// Returns the new override value so hosts can echo it back.
    pub fn set_simulated_offline(&self, simulated: bool) -> bool {
        self.transition(|state| state.simulated_offline = simulated);
        simulated
    }

    /// Subscribe to effective connectivity edges.
    ///
    /// Dropping the receiver unsubscribes. Only changes are delivered; the
    /// current value is read via [`is_online`](Self::is_online).
    pub fn subscribe(&self) -> broadcast::Receiver<NetworkEvent> {
        self.sender.subscribe()
    }

    fn transition(&self, apply: impl FnOnce(&mut MonitorState)) {
        let event = {
            let mut state = self.state.lock().unwrap();
            let was_online = state.effective_online();
            apply(&mut state);
            let is_online = state.effective_online();

            if was_online == is_online {
                debug!(online = is_online, "connectivity signal without edge");
                return;
            }

            if is_online {
                NetworkEvent::Online
            } else {
                NetworkEvent::Offline {
                    simulated: state.simulated_offline,
                }
            }
        };

        info!(?event, "connectivity edge");
        // No subscribers is fine; state is still queryable.
        self.sender.send(event).ok();
    }
}

impl Default for NetworkStateMonitor {
    /// Starts online, matching a freshly mounted client with connectivity.
    fn default() -> Self {
        Self::new(true)
    }
}
