//! Action router — the per-session state machine connecting channels,
//! memory, the classifier, and the calendar/email collaborators.

mod dispatch;
mod pipeline;

use aide_classify::Classifier;
use aide_core::{
    config::OAuthConfig,
    event::CalendarProvider,
    message::{InboundMessage, OutboundReply, Speaker},
    traits::{Calendar, Channel, Mailer},
};
use aide_session::{ConversationMemory, CredentialStore, EscalatedItem, EscalationMailbox};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Optional pipeline stages, selected at construction.
#[derive(Debug, Clone, Copy)]
pub struct Stages {
    /// Whether pending escalations intercept normal classification.
    pub escalation: bool,
}

impl Default for Stages {
    fn default() -> Self {
        Self { escalation: true }
    }
}

/// The central router. One instance serves every session.
pub struct Router {
    pub(super) classifier: Classifier,
    pub(super) memory: ConversationMemory,
    pub(super) credentials: CredentialStore,
    pub(super) mailbox: EscalationMailbox,
    pub(super) channels: HashMap<String, Arc<dyn Channel>>,
    pub(super) calendars: HashMap<CalendarProvider, Arc<dyn Calendar>>,
    pub(super) mailer: Option<Arc<dyn Mailer>>,
    pub(super) oauth: OAuthConfig,
    pub(super) stages: Stages,
}

impl Router {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        classifier: Classifier,
        memory: ConversationMemory,
        credentials: CredentialStore,
        mailbox: EscalationMailbox,
        channels: HashMap<String, Arc<dyn Channel>>,
        calendars: HashMap<CalendarProvider, Arc<dyn Calendar>>,
        mailer: Option<Arc<dyn Mailer>>,
        oauth: OAuthConfig,
        stages: Stages,
    ) -> Self {
        Self {
            classifier,
            memory,
            credentials,
            mailbox,
            channels,
            calendars,
            mailer,
            oauth,
            stages,
        }
    }

    /// Run the main event loop until ctrl-c.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Aide router running | channels: {} | calendars: {} | escalation: {}",
            self.channels.keys().cloned().collect::<Vec<_>>().join(", "),
            self.calendars
                .keys()
                .map(|p| p.name().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            if self.stages.escalation { "on" } else { "off" },
        );

        let (tx, mut rx) = mpsc::channel::<InboundMessage>(256);

        for (name, channel) in &self.channels {
            let mut channel_rx = channel
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("failed to start channel {name}: {e}"))?;
            let tx = tx.clone();
            let channel_name = name.clone();

            tokio::spawn(async move {
                while let Some(msg) = channel_rx.recv().await {
                    if tx.send(msg).await.is_err() {
                        info!("router receiver dropped, stopping {channel_name} forwarder");
                        break;
                    }
                }
            });

            info!("Channel started: {name}");
        }

        drop(tx);

        // Main event loop with graceful shutdown. One message at a time;
        // resolving an escalation ends only that message's processing,
        // never this loop.
        loop {
            tokio::select! {
                maybe_msg = rx.recv() => {
                    match maybe_msg {
                        Some(msg) => self.handle_message(msg).await,
                        None => {
                            info!("All channels closed, shutting down");
                            break;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        for (name, channel) in &self.channels {
            if let Err(e) = channel.stop().await {
                warn!("failed to stop channel {name}: {e}");
            }
        }

        Ok(())
    }

    /// Park an escalated email for a session and notify the user.
    ///
    /// Also the entry point for an external email-triage loop; overwrites
    /// any unresolved item for the session.
    pub async fn escalate(&self, msg: &InboundMessage, item: EscalatedItem) {
        let notification = format!(
            "📧 New email:\nSubject: {}\n\n{}\n\n/ai_reply — let AI answer\n/reply <your message> — send your own reply",
            item.subject, item.body
        );
        self.mailbox.put(&msg.session_id, item);
        self.send_reply(msg, OutboundReply::text(&msg.session_id, notification))
            .await;
    }

    /// Record the reply as an AI turn and deliver it through the message's
    /// channel. Delivery failures are logged, never propagated: partial
    /// turn state is acceptable and must not poison other sessions.
    pub(super) async fn send_reply(&self, msg: &InboundMessage, reply: OutboundReply) {
        self.memory
            .append(&msg.session_id, Speaker::Ai, &reply.text)
            .await;

        match self.channels.get(&msg.channel) {
            Some(channel) => {
                if let Err(e) = channel.send(reply).await {
                    error!("[{}] send failed for {}: {e}", msg.channel, msg.session_id);
                }
            }
            None => {
                error!("no channel named {} for session {}", msg.channel, msg.session_id);
            }
        }
    }
}
