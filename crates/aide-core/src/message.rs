use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where an inbound message entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Chat,
    Email,
}

/// Who produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    User,
    Ai,
}

impl Speaker {
    /// Transcript label used when rendering history into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "User",
            Speaker::Ai => "AI",
        }
    }
}

/// An inbound message delivered by a channel. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: Uuid,
    /// Channel name the message arrived on (e.g. "telegram").
    pub channel: String,
    /// Stable conversation key (e.g. a Telegram chat id rendered as a string).
    pub session_id: String,
    pub origin: Origin,
    /// Human-readable sender name, if the channel knows it.
    pub sender_name: Option<String>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    /// Build a chat-origin message with a fresh id and current timestamp.
    pub fn chat(
        channel: impl Into<String>,
        session_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.into(),
            session_id: session_id.into(),
            origin: Origin::Chat,
            sender_name: None,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A URL button attached to an outbound reply, for channels that support
/// inline actions (used for OAuth authorize links).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

/// An outbound reply to send back through a channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutboundReply {
    pub session_id: String,
    pub text: String,
    /// At most one authorization-link action per reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_button: Option<LinkButton>,
}

impl OutboundReply {
    pub fn text(session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            text: text.into(),
            link_button: None,
        }
    }

    pub fn with_button(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.link_button = Some(LinkButton {
            label: label.into(),
            url: url.into(),
        });
        self
    }
}
