//! # Background Sync Orchestrator
//!
//! Owns the "when" of synchronization: once on mount while online, and once
//! per offline-to-online edge. On reconnect the query layer's queued
//! mutations replay first (local writes win the race against the refetch),
//! then every registered scope is triggered sequentially.

use crate::scope::SyncScope;
use crate::syncers::LibrarySyncer;
use core_net::NetworkStateMonitor;
use core_query::{MutationExecutor, QueryCache};
use core_runtime::events::{NetworkEvent, RecvError};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Drives the [`LibrarySyncer`] from connectivity edges.
pub struct SyncOrchestrator {
    syncer: Arc<LibrarySyncer>,
    monitor: Arc<NetworkStateMonitor>,
    query: Arc<QueryCache>,
    executor: Arc<dyn MutationExecutor>,
    scopes: Mutex<Vec<SyncScope>>,
}

impl SyncOrchestrator {
    pub fn new(
        syncer: Arc<LibrarySyncer>,
        monitor: Arc<NetworkStateMonitor>,
        query: Arc<QueryCache>,
        executor: Arc<dyn MutationExecutor>,
    ) -> Self {
        Self {
            syncer,
            monitor,
            query,
            executor,
            scopes: Mutex::new(Vec::new()),
        }
    }

    /// Register a scope to be triggered on mount and on every reconnect.
    /// Registering the same scope twice is a no-op.
    pub fn register(&self, scope: SyncScope) {
        let mut scopes = self.scopes.lock().unwrap();
        if !scopes.contains(&scope) {
            scopes.push(scope);
        }
    }

    pub fn registered_scopes(&self) -> Vec<SyncScope> {
        self.scopes.lock().unwrap().clone()
    }

    /// One-time trigger when the client mounts. Does nothing while offline;
    /// the reconnect edge covers the catch-up in that case.
    #[instrument(skip(self))]
    pub async fn run_on_mount(&self) {
        if !self.monitor.is_online() {
            debug!("Mount while offline, deferring to reconnect trigger");
            return;
        }
        self.sync_registered().await;
    }

    /// Spawn the background task watching connectivity edges.
    ///
    /// The task ends when the monitor is dropped; abort the handle to stop
    /// it earlier.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let orchestrator = Arc::clone(self);
        let mut events = orchestrator.monitor.subscribe();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(NetworkEvent::Online) => orchestrator.on_reconnect().await,
                    Ok(NetworkEvent::Offline { simulated }) => {
                        debug!(simulated, "Connectivity lost, sync paused");
                    }
                    Err(RecvError::Lagged(missed)) => {
                        // Edges collapsed; the current state is re-read anyway.
                        warn!(missed, "Connectivity event stream lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Sync orchestrator task stopped");
        })
    }

    /// Reconnect sequence: replay queued mutations first, then reconcile
    /// every registered scope.
    async fn on_reconnect(&self) {
        info!("Connectivity restored, resuming sync");
        let report = self.query.resume(self.executor.as_ref()).await;
        if report.executed + report.failed > 0 {
            info!(
                executed = report.executed,
                failed = report.failed,
                "Replayed offline mutations"
            );
        }
        self.sync_registered().await;
    }

    async fn sync_registered(&self) {
        let scopes = self.registered_scopes();
        for scope in scopes {
            if let Err(e) = self.syncer.sync(&scope).await {
                warn!(scope = %scope, error = %e, "Scope sync failed, continuing");
            }
        }
    }
}
