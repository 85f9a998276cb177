//! Bounded per-session conversation transcript.

use crate::registry::SessionRegistry;
use aide_core::message::Speaker;
use std::sync::Arc;

/// How many transcript entries a session keeps. Oldest entries are evicted
/// first once the cap is reached.
pub const HISTORY_CAPACITY: usize = 10;

/// One line of a session transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub speaker: Speaker,
    pub text: String,
}

/// In-process conversation memory, one bounded transcript per session.
#[derive(Clone)]
pub struct ConversationMemory {
    sessions: Arc<SessionRegistry<Vec<HistoryEntry>>>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(SessionRegistry::new()),
        }
    }

    /// Append an entry, trimming to the last [`HISTORY_CAPACITY`] entries.
    pub async fn append(&self, session_id: &str, speaker: Speaker, text: &str) {
        let slot = self.sessions.entry(session_id);
        let mut history = slot.lock().await;
        history.push(HistoryEntry {
            speaker,
            text: text.to_string(),
        });
        if history.len() > HISTORY_CAPACITY {
            let overflow = history.len() - HISTORY_CAPACITY;
            history.drain(..overflow);
        }
    }

    /// Render the transcript as "Speaker: text" lines, oldest first.
    pub async fn render(&self, session_id: &str) -> String {
        let slot = self.sessions.entry(session_id);
        let history = slot.lock().await;
        history
            .iter()
            .map(|e| format!("{}: {}", e.speaker.label(), e.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Snapshot of a session's entries, for inspection and tests.
    pub async fn entries(&self, session_id: &str) -> Vec<HistoryEntry> {
        let slot = self.sessions.entry(session_id);
        let entries = slot.lock().await.clone();
        entries
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_and_render() {
        let memory = ConversationMemory::new();
        memory.append("s1", Speaker::User, "hi").await;
        memory.append("s1", Speaker::Ai, "hello").await;
        assert_eq!(memory.render("s1").await, "User: hi\nAI: hello");
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest_first() {
        let memory = ConversationMemory::new();
        for i in 0..15 {
            memory.append("s1", Speaker::User, &format!("m{i}")).await;
        }
        let entries = memory.entries("s1").await;
        assert_eq!(entries.len(), HISTORY_CAPACITY);
        assert_eq!(entries[0].text, "m5");
        assert_eq!(entries[9].text, "m14");
    }

    #[tokio::test]
    async fn test_capacity_holds_after_any_append_count() {
        let memory = ConversationMemory::new();
        for i in 0..100 {
            memory.append("s1", Speaker::Ai, &format!("m{i}")).await;
            assert!(memory.entries("s1").await.len() <= HISTORY_CAPACITY);
        }
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_history() {
        let memory = ConversationMemory::new();
        memory.append("a", Speaker::User, "for a").await;
        memory.append("b", Speaker::User, "for b").await;
        assert_eq!(memory.render("a").await, "User: for a");
        assert_eq!(memory.render("b").await, "User: for b");
    }

    #[tokio::test]
    async fn test_concurrent_appends_across_sessions() {
        let memory = ConversationMemory::new();
        let mut handles = Vec::new();
        for s in 0..8 {
            let mem = memory.clone();
            handles.push(tokio::spawn(async move {
                let sid = format!("s{s}");
                for i in 0..20 {
                    mem.append(&sid, Speaker::User, &format!("m{i}")).await;
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        for s in 0..8 {
            let entries = memory.entries(&format!("s{s}")).await;
            assert_eq!(entries.len(), HISTORY_CAPACITY);
            assert_eq!(entries.last().unwrap().text, "m19");
        }
    }
}
