use crate::{
    error::AideError,
    event::{EventPayload, ScheduledEvent},
    message::{InboundMessage, OutboundReply},
};
use async_trait::async_trait;

/// Completion collaborator — the language model behind classification.
///
/// One call per inbound message, no internal retries. The returned text is
/// expected, but never guaranteed, to be the JSON decision document.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Send a prompt and get the raw completion text.
    async fn complete(&self, prompt: &str) -> Result<String, AideError>;
}

/// Messaging channel trait — how conversations reach the router.
///
/// Every transport (Telegram today, others later) implements this trait to
/// receive inbound messages and deliver replies.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for inbound messages.
    /// Returns a receiver that yields inbound messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<InboundMessage>, AideError>;

    /// Send a reply back through this channel.
    async fn send(&self, reply: OutboundReply) -> Result<(), AideError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), AideError>;
}

/// Calendar collaborator — one implementation per provider.
#[async_trait]
pub trait Calendar: Send + Sync {
    fn name(&self) -> &str;

    /// Create an event using the session's refresh token.
    /// Errors carry the provider's failure reason verbatim.
    async fn schedule(
        &self,
        refresh_token: &str,
        payload: &EventPayload,
    ) -> Result<ScheduledEvent, AideError>;
}

/// Outbound email collaborator, used to send escalation resolutions.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        refresh_token: &str,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), AideError>;
}

/// Speech-to-text collaborator. Normalizes voice notes into plain text
/// before a message reaches the router.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, AideError>;
}
