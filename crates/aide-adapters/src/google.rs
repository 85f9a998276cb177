//! Google Calendar adapter.
//!
//! Inserts events on the session owner's primary calendar.
//! Docs: <https://developers.google.com/calendar/api/v3/reference/events/insert>

use crate::token::refresh_access_token;
use aide_core::{
    config::OAuthProviderConfig,
    error::AideError,
    event::{EventPayload, ScheduledEvent},
    traits::Calendar,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const EVENTS_ENDPOINT: &str = "https://www.googleapis.com/calendar/v3/calendars/primary/events";

pub struct GoogleCalendar {
    client: reqwest::Client,
    oauth: OAuthProviderConfig,
}

#[derive(Serialize)]
struct GEventTime {
    #[serde(rename = "dateTime")]
    date_time: DateTime<Utc>,
    #[serde(rename = "timeZone")]
    time_zone: String,
}

#[derive(Serialize)]
struct GAttendee {
    email: String,
}

#[derive(Serialize)]
struct GEvent {
    summary: String,
    description: String,
    start: GEventTime,
    end: GEventTime,
    attendees: Vec<GAttendee>,
}

#[derive(Deserialize)]
struct GCreatedEvent {
    id: Option<String>,
    #[serde(rename = "htmlLink")]
    html_link: Option<String>,
}

impl GoogleCalendar {
    pub fn new(oauth: OAuthProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            oauth,
        }
    }
}

#[async_trait]
impl Calendar for GoogleCalendar {
    fn name(&self) -> &str {
        "google"
    }

    async fn schedule(
        &self,
        refresh_token: &str,
        payload: &EventPayload,
    ) -> Result<ScheduledEvent, AideError> {
        let access_token =
            refresh_access_token(&self.client, TOKEN_ENDPOINT, &self.oauth, refresh_token).await?;

        let event = GEvent {
            summary: payload.summary.clone(),
            description: payload.description.clone(),
            start: GEventTime {
                date_time: payload.start,
                time_zone: payload.timezone.clone(),
            },
            end: GEventTime {
                date_time: payload.end,
                time_zone: payload.timezone.clone(),
            },
            attendees: payload
                .attendees
                .iter()
                .map(|a| GAttendee { email: a.clone() })
                .collect(),
        };

        debug!("google: inserting event {:?}", payload.summary);

        let resp = self
            .client
            .post(EVENTS_ENDPOINT)
            .query(&[("sendUpdates", "all")])
            .bearer_auth(&access_token)
            .json(&event)
            .send()
            .await
            .map_err(|e| AideError::Calendar(format!("google request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AideError::Calendar(format!(
                "google returned {status}: {body}"
            )));
        }

        let created: GCreatedEvent = resp
            .json()
            .await
            .map_err(|e| AideError::Calendar(format!("google response parse failed: {e}")))?;

        Ok(ScheduledEvent {
            event_id: created.id.unwrap_or_default(),
            web_link: created.html_link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_event_parsing() {
        let json = r#"{"id":"evt1","htmlLink":"https://calendar.google.com/event?eid=evt1","status":"confirmed"}"#;
        let created: GCreatedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(created.id.as_deref(), Some("evt1"));
        assert!(created.html_link.unwrap().contains("calendar.google.com"));
    }

    #[test]
    fn test_created_event_without_link() {
        let created: GCreatedEvent = serde_json::from_str(r#"{"id":"evt2"}"#).unwrap();
        assert!(created.html_link.is_none());
    }
}
