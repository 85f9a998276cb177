//! Get-or-create registry of per-session state with per-key locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A map of session id → lock-guarded state slot.
///
/// The outer map lock is held only long enough to clone the slot's `Arc`;
/// all real work happens under the per-session mutex, so two sessions never
/// contend with each other.
pub(crate) struct SessionRegistry<T> {
    slots: Mutex<HashMap<String, Arc<tokio::sync::Mutex<T>>>>,
}

impl<T: Default> SessionRegistry<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Get the slot for a session, creating it with `T::default()` on first use.
    pub(crate) fn entry(&self, session_id: &str) -> Arc<tokio::sync::Mutex<T>> {
        let mut slots = self.slots.lock().expect("session registry poisoned");
        slots
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(T::default())))
            .clone()
    }

    /// Drop a session's slot entirely.
    #[cfg(test)]
    fn remove(&self, session_id: &str) {
        let mut slots = self.slots.lock().expect("session registry poisoned");
        slots.remove(session_id);
    }
}
