//! Per-scope concurrency guards with coalesced retry.
//!
//! At most one run per scope key is in flight. A trigger that finds a run
//! already in flight records a retry request instead of starting a second
//! run; when the in-flight run finishes, `finish` reports whether exactly
//! one follow-up run should start. Any number of triggers during a run
//! collapse into that single follow-up.

use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
struct GuardState {
    running: bool,
    retry_requested: bool,
}

/// Guard table owned by the synchronizer; no ambient module state.
#[derive(Debug, Default)]
pub struct ScopeGuards {
    states: Mutex<HashMap<String, GuardState>>,
}

impl ScopeGuards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim the scope. Returns `false` if a run is already in flight.
    pub fn try_begin(&self, key: &str) -> bool {
        let mut states = self.states.lock().unwrap();
        let state = states.entry(key.to_string()).or_default();
        if state.running {
            return false;
        }
        state.running = true;
        true
    }

    /// Record that the in-flight run should be followed by one more run.
    pub fn request_retry(&self, key: &str) {
        let mut states = self.states.lock().unwrap();
        if let Some(state) = states.get_mut(key) {
            if state.running {
                state.retry_requested = true;
                debug!(scope = %key, "Coalesced follow-up run requested");
            }
        }
    }

    /// Release the scope after a run.
    ///
    /// Returns `true` when a retry was requested: the scope stays claimed
    /// and the caller runs once more. Returns `false` when the scope is now
    /// free.
    pub fn finish(&self, key: &str) -> bool {
        let mut states = self.states.lock().unwrap();
        let Some(state) = states.get_mut(key) else {
            return false;
        };
        if state.retry_requested {
            state.retry_requested = false;
            true
        } else {
            states.remove(key);
            false
        }
    }

    /// Whether a run is currently in flight for the scope.
    pub fn is_running(&self, key: &str) -> bool {
        self.states
            .lock()
            .unwrap()
            .get(key)
            .map(|s| s.running)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_fails_while_running() {
        let guards = ScopeGuards::new();
        assert!(guards.try_begin("catalog"));
        assert!(!guards.try_begin("catalog"));
        assert!(guards.is_running("catalog"));
    }

    #[test]
    fn distinct_scopes_are_independent() {
        let guards = ScopeGuards::new();
        assert!(guards.try_begin("playlists:u1"));
        assert!(guards.try_begin("playlists:u2"));
    }

    #[test]
    fn finish_without_retry_frees_the_scope() {
        let guards = ScopeGuards::new();
        guards.try_begin("catalog");
        assert!(!guards.finish("catalog"));
        assert!(!guards.is_running("catalog"));
        assert!(guards.try_begin("catalog"));
    }

    #[test]
    fn many_retry_requests_coalesce_into_one_follow_up() {
        let guards = ScopeGuards::new();
        guards.try_begin("catalog");
        guards.request_retry("catalog");
        guards.request_retry("catalog");
        guards.request_retry("catalog");

        // One follow-up run, then free.
        assert!(guards.finish("catalog"));
        assert!(guards.is_running("catalog"));
        assert!(!guards.finish("catalog"));
        assert!(!guards.is_running("catalog"));
    }

    #[test]
    fn retry_request_without_a_run_is_ignored() {
        let guards = ScopeGuards::new();
        guards.request_retry("catalog");
        assert!(!guards.finish("catalog"));
        assert!(guards.try_begin("catalog"));
    }
}
