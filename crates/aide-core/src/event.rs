//! Calendar event types shared by the classifier, router, and adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which calendar backend a meeting should be created on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarProvider {
    Google,
    Outlook,
}

impl CalendarProvider {
    pub fn name(&self) -> &'static str {
        match self {
            CalendarProvider::Google => "google",
            CalendarProvider::Outlook => "outlook",
        }
    }
}

impl std::fmt::Display for CalendarProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated meeting request produced by classification.
///
/// `start`/`end` have already passed the not-in-the-past and ordering checks;
/// anything that failed them was downgraded before this type is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRequest {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub timezone: String,
    pub attendees: Vec<String>,
    pub provider: CalendarProvider,
    /// The model's conversational confirmation text, prepended to the event
    /// link in the success reply.
    pub user_message: String,
}

/// Provider-neutral payload forwarded to a calendar adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub timezone: String,
    pub attendees: Vec<String>,
}

impl From<&MeetingRequest> for EventPayload {
    fn from(req: &MeetingRequest) -> Self {
        Self {
            summary: req.summary.clone(),
            description: req.description.clone(),
            start: req.start,
            end: req.end,
            timezone: req.timezone.clone(),
            attendees: req.attendees.clone(),
        }
    }
}

/// Result of a successful calendar insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub event_id: String,
    /// Browser link to the created event, when the provider returns one.
    pub web_link: Option<String>,
}
