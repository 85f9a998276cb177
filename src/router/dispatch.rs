//! Scheduling dispatch: the credential gate and the calendar call.

use super::Router;
use aide_core::{
    event::{CalendarProvider, EventPayload, MeetingRequest, ScheduledEvent},
    message::{InboundMessage, OutboundReply},
};
use aide_session::credentials::authorize_url;
use tracing::{info, warn};

impl Router {
    /// Gate on the session's credential, then forward the meeting to the
    /// provider once. Always returns the reply for this turn; scheduling
    /// either happened exactly once or not at all.
    pub(super) async fn dispatch_meeting(
        &self,
        msg: &InboundMessage,
        request: &MeetingRequest,
    ) -> OutboundReply {
        let Some(token) = self.credentials.get(&msg.session_id, request.provider) else {
            info!(
                "session {}: no {} credential, deferring to authorization",
                msg.session_id, request.provider
            );
            return self.authorization_reply(&msg.session_id, request.provider);
        };

        let Some(calendar) = self.calendars.get(&request.provider) else {
            warn!("no calendar adapter registered for {}", request.provider);
            return OutboundReply::text(
                &msg.session_id,
                format!("Failed to schedule meeting: {} is not configured.", request.provider),
            );
        };

        let payload = EventPayload::from(request);
        match calendar.schedule(&token, &payload).await {
            Ok(event) => {
                info!(
                    "session {}: scheduled {:?} on {}",
                    msg.session_id, request.summary, request.provider
                );
                OutboundReply::text(
                    &msg.session_id,
                    compose_success(&request.user_message, &event),
                )
            }
            // Terminal for this turn: the adapter's reason goes back verbatim.
            Err(e) => OutboundReply::text(&msg.session_id, format!("Failed to schedule meeting: {e}")),
        }
    }

    /// The deferred-credential reply: an authorize link carrying the
    /// session id as the OAuth state parameter.
    pub(super) fn authorization_reply(
        &self,
        session_id: &str,
        provider: CalendarProvider,
    ) -> OutboundReply {
        let cfg = self.oauth.provider(provider);
        let link = authorize_url(cfg, provider, session_id);
        let (label, text) = match provider {
            CalendarProvider::Google => (
                "Authorize Google",
                "To schedule meetings or send email with Google, please authorize your Google account first.",
            ),
            CalendarProvider::Outlook => (
                "Authorize Outlook",
                "To schedule a meeting in Outlook, please authorize your Outlook account first.",
            ),
        };
        OutboundReply::text(session_id, format!("{text}\n{link}")).with_button(label, link)
    }
}

/// Success wording: the model's own confirmation plus the link when both
/// exist, otherwise sensible defaults.
fn compose_success(user_message: &str, event: &ScheduledEvent) -> String {
    match (user_message.is_empty(), event.web_link.as_deref()) {
        (false, Some(link)) => format!("{user_message}\n{link}"),
        (true, Some(link)) => {
            format!("Meeting scheduled successfully! Here is your event: {link}")
        }
        (_, None) => "Meeting scheduled, but no event link was returned.".to_string(),
    }
}
