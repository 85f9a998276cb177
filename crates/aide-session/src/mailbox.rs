//! Single-slot escalation mailbox.
//!
//! At most one email awaits a human decision per session. A second
//! escalation before the first is resolved overwrites it; see DESIGN.md for
//! why this data-loss edge is preserved rather than queued.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// An inbound email waiting on a human choice.
#[derive(Debug, Clone, PartialEq)]
pub struct EscalatedItem {
    pub sender_email: String,
    pub subject: String,
    pub body: String,
    pub suggested_reply: String,
}

/// Outcome of a resolve attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The pending item, removed from the slot, with the body to send.
    Resolved { item: EscalatedItem, body: String },
    /// Nothing was pending. A handled condition, not an error.
    NothingPending,
}

/// Pending escalations keyed by session id, one slot each.
#[derive(Clone, Default)]
pub struct EscalationMailbox {
    pending: Arc<Mutex<HashMap<String, EscalatedItem>>>,
}

impl EscalationMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park an item for the session, overwriting any existing one.
    pub fn put(&self, session_id: &str, item: EscalatedItem) {
        let mut pending = self.pending.lock().expect("mailbox poisoned");
        if let Some(old) = pending.insert(session_id.to_string(), item) {
            warn!(
                "session {session_id}: unresolved escalation from {} replaced",
                old.sender_email
            );
        }
    }

    /// Whether the session is in the restricted command-only input mode.
    pub fn has_pending(&self, session_id: &str) -> bool {
        let pending = self.pending.lock().expect("mailbox poisoned");
        pending.contains_key(session_id)
    }

    /// Remove and return the pending item together with the chosen reply
    /// body. `chosen_body = None` means "use the AI's suggested reply".
    pub fn resolve(&self, session_id: &str, chosen_body: Option<&str>) -> Resolution {
        let mut pending = self.pending.lock().expect("mailbox poisoned");
        match pending.remove(session_id) {
            Some(item) => {
                let body = chosen_body
                    .map(str::to_string)
                    .unwrap_or_else(|| item.suggested_reply.clone());
                Resolution::Resolved { item, body }
            }
            None => Resolution::NothingPending,
        }
    }
}
