//! # aide-session
//!
//! Shared per-session state: bounded conversation memory, the credential
//! gate, and the single-slot escalation mailbox. All three are keyed by
//! session id with per-key mutual exclusion, so work on one conversation
//! never blocks another.

pub mod credentials;
pub mod mailbox;
pub mod memory;
mod registry;

pub use credentials::{authorize_url, CredentialStore};
pub use mailbox::{EscalatedItem, EscalationMailbox, Resolution};
pub use memory::{ConversationMemory, HistoryEntry};
