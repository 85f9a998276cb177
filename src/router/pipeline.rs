//! Per-message pipeline — the main handle_message flow.

use super::Router;
use aide_classify::{Decision, ParseOutcome};
use aide_core::{
    event::CalendarProvider,
    message::{InboundMessage, OutboundReply, Speaker},
};
use aide_session::Resolution;
use chrono::Utc;
use tracing::{info, warn};

/// Fixed apology when the completion collaborator is unreachable.
pub(super) const COMPLETION_APOLOGY: &str = "Sorry, I couldn't get a response.";

impl Router {
    /// Process a single inbound message through the full pipeline.
    pub(crate) async fn handle_message(&self, msg: InboundMessage) {
        let preview = if msg.text.chars().count() > 60 {
            let truncated: String = msg.text.chars().take(60).collect();
            format!("{truncated}...")
        } else {
            msg.text.clone()
        };
        info!(
            "[{}] {} says: {}",
            msg.channel,
            msg.sender_name.as_deref().unwrap_or(&msg.session_id),
            preview
        );

        // --- 1. RECORD THE USER TURN ---
        self.memory
            .append(&msg.session_id, Speaker::User, &msg.text)
            .await;

        // --- 2. PENDING ESCALATION INTERCEPT ---
        // While an email awaits a human decision, only the two resolve
        // commands are recognized; everything else ends this message's
        // processing without touching the classifier.
        if self.stages.escalation && self.mailbox.has_pending(&msg.session_id) {
            self.handle_escalation_command(&msg).await;
            return;
        }

        // --- 3. CLASSIFY ---
        let transcript = self.memory.render(&msg.session_id).await;
        let outcome = match self.classifier.classify(&transcript, Utc::now()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("[{}] classification failed: {e}", msg.channel);
                self.send_reply(&msg, OutboundReply::text(&msg.session_id, COMPLETION_APOLOGY))
                    .await;
                return;
            }
        };

        // --- 4. DISPATCH ---
        match outcome {
            // Not the decision document at all: reply with the raw
            // completion text verbatim.
            ParseOutcome::Malformed(raw) => {
                self.send_reply(&msg, OutboundReply::text(&msg.session_id, raw))
                    .await;
            }
            ParseOutcome::Parsed(Decision::Reply { text })
            | ParseOutcome::Parsed(Decision::AskForDetails { text }) => {
                self.send_reply(&msg, OutboundReply::text(&msg.session_id, text))
                    .await;
            }
            ParseOutcome::Parsed(Decision::Ignore) => {
                info!("[{}] ignoring message for {}", msg.channel, msg.session_id);
            }
            ParseOutcome::Parsed(Decision::Escalate {
                sender_email,
                subject,
                body,
                suggested_reply,
            }) => {
                // Without the escalation stage the resolve commands are
                // never intercepted, so parking an item would strand it.
                if !self.stages.escalation {
                    info!(
                        "[{}] escalation stage disabled, dropping escalate decision for {}",
                        msg.channel, msg.session_id
                    );
                    return;
                }
                let sender_email = if sender_email.is_empty() {
                    msg.sender_name.clone().unwrap_or_default()
                } else {
                    sender_email
                };
                self.escalate(
                    &msg,
                    aide_session::EscalatedItem {
                        sender_email,
                        subject,
                        body,
                        suggested_reply,
                    },
                )
                .await;
            }
            ParseOutcome::Parsed(Decision::ScheduleMeeting(request)) => {
                let reply = self.dispatch_meeting(&msg, &request).await;
                self.send_reply(&msg, reply).await;
            }
        }
    }

    /// Restricted input mode while an escalation is pending.
    async fn handle_escalation_command(&self, msg: &InboundMessage) {
        let chosen_body = if msg.text.starts_with("/ai_reply") {
            None
        } else if let Some(custom) = msg.text.strip_prefix("/reply ") {
            Some(custom.trim().to_string())
        } else {
            // Not a resolve command; this message is done, the pending
            // item stays put.
            info!(
                "session {}: escalation pending, ignoring non-command input",
                msg.session_id
            );
            return;
        };

        // Sending the resolution goes through Gmail, which needs the
        // session's Google credential. Gate before consuming the item so
        // a missing token doesn't lose the escalation.
        let Some(token) = self
            .credentials
            .get(&msg.session_id, CalendarProvider::Google)
        else {
            let reply = self.authorization_reply(&msg.session_id, CalendarProvider::Google);
            self.send_reply(msg, reply).await;
            return;
        };

        let Some(mailer) = self.mailer.as_ref() else {
            warn!("escalation resolve requested but no mailer configured");
            self.send_reply(
                msg,
                OutboundReply::text(&msg.session_id, "Email sending is not configured."),
            )
            .await;
            return;
        };

        match self.mailbox.resolve(&msg.session_id, chosen_body.as_deref()) {
            Resolution::Resolved { item, body } => {
                let text = match mailer
                    .send(&token, &item.sender_email, &item.subject, &body)
                    .await
                {
                    Ok(()) => format!("Reply sent to {}: {body}", item.sender_email),
                    Err(e) => {
                        warn!("escalation reply send failed: {e}");
                        format!("Failed to send the reply: {e}")
                    }
                };
                self.send_reply(msg, OutboundReply::text(&msg.session_id, text))
                    .await;
            }
            Resolution::NothingPending => {
                // Raced away between has_pending and resolve; handled, not an error.
                self.send_reply(
                    msg,
                    OutboundReply::text(&msg.session_id, "No email is awaiting a reply."),
                )
                .await;
            }
        }
    }
}
