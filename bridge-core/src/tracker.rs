//! Tracking of in-flight cancellable operations.
//!
//! The surrounding shell runs several long operations (injection, the
//! external conversion tools) and needs to abort them by id. This is the
//! structured version of that bookkeeping: one table of operation id to
//! cancellation token, guarded by a single mutex, with deterministic
//! removal on completion. The tracker holds no operation state itself.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::cancel::CancelToken;

/// Registry of in-flight operations keyed by caller-chosen id.
#[derive(Debug, Default)]
pub struct OperationTracker {
    inflight: Mutex<HashMap<String, CancelToken>>,
}

impl OperationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // The table must stay usable even if a worker panicked while holding
    // the lock; recover the guard instead of propagating the poison.
    fn table(&self) -> MutexGuard<'_, HashMap<String, CancelToken>> {
        self.inflight.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register an operation and return the token its worker should poll.
    ///
    /// Registering an id that is already in flight replaces the previous
    /// entry; the old token is cancelled so its worker winds down instead
    /// of racing the new one.
    pub fn register(&self, id: &str) -> CancelToken {
        let token = CancelToken::new();
        let mut inflight = self.table();
        if let Some(previous) = inflight.insert(id.to_string(), token.clone()) {
            log::warn!("operation id {:?} re-registered while still in flight", id);
            previous.cancel();
        }
        token
    }

    /// Request cancellation of an in-flight operation.
    ///
    /// Returns false if the id is unknown (already completed or never
    /// registered), which callers treat as a no-op rather than an error.
    pub fn cancel(&self, id: &str) -> bool {
        match self.table().get(id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Remove a completed operation from the table.
    pub fn complete(&self, id: &str) {
        self.table().remove(id);
    }

    /// Number of operations currently registered.
    pub fn in_flight(&self) -> usize {
        self.table().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_cancel_complete_lifecycle() {
        let tracker = OperationTracker::new();

        let token = tracker.register("inject-1");
        assert_eq!(tracker.in_flight(), 1);
        assert!(!token.is_cancelled());

        assert!(tracker.cancel("inject-1"));
        assert!(token.is_cancelled());

        tracker.complete("inject-1");
        assert_eq!(tracker.in_flight(), 0);
    }

    #[test]
    fn test_cancel_unknown_id_is_noop() {
        let tracker = OperationTracker::new();
        assert!(!tracker.cancel("never-registered"));
    }

    #[test]
    fn test_reregistering_cancels_previous() {
        let tracker = OperationTracker::new();
        let first = tracker.register("pack");
        let second = tracker.register("pack");

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(tracker.in_flight(), 1);
    }

    #[test]
    fn test_complete_is_deterministic_after_cancel() {
        let tracker = OperationTracker::new();
        tracker.register("op");
        tracker.cancel("op");
        tracker.complete("op");
        // A later cancel for the same id must not resurrect anything.
        assert!(!tracker.cancel("op"));
        assert_eq!(tracker.in_flight(), 0);
    }
}
