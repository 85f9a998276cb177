//! Outlook Calendar adapter via Microsoft Graph.
//!
//! Docs: <https://learn.microsoft.com/en-us/graph/api/user-post-events>

use crate::token::refresh_access_token;
use aide_core::{
    config::OAuthProviderConfig,
    error::AideError,
    event::{EventPayload, ScheduledEvent},
    traits::Calendar,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const TOKEN_ENDPOINT: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/token";
const EVENTS_ENDPOINT: &str = "https://graph.microsoft.com/v1.0/me/events";

pub struct OutlookCalendar {
    client: reqwest::Client,
    oauth: OAuthProviderConfig,
}

#[derive(Serialize)]
struct MsDateTime {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(rename = "timeZone")]
    time_zone: String,
}

#[derive(Serialize)]
struct MsBody {
    #[serde(rename = "contentType")]
    content_type: &'static str,
    content: String,
}

#[derive(Serialize)]
struct MsEmailAddress {
    address: String,
}

#[derive(Serialize)]
struct MsAttendee {
    #[serde(rename = "emailAddress")]
    email_address: MsEmailAddress,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct MsEvent {
    subject: String,
    body: MsBody,
    start: MsDateTime,
    end: MsDateTime,
    attendees: Vec<MsAttendee>,
}

#[derive(Deserialize)]
struct MsCreatedEvent {
    id: Option<String>,
    #[serde(rename = "webLink")]
    web_link: Option<String>,
}

impl OutlookCalendar {
    pub fn new(oauth: OAuthProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            oauth,
        }
    }
}

#[async_trait]
impl Calendar for OutlookCalendar {
    fn name(&self) -> &str {
        "outlook"
    }

    async fn schedule(
        &self,
        refresh_token: &str,
        payload: &EventPayload,
    ) -> Result<ScheduledEvent, AideError> {
        let access_token =
            refresh_access_token(&self.client, TOKEN_ENDPOINT, &self.oauth, refresh_token).await?;

        // Graph wants naive local datetimes paired with an IANA zone name.
        let event = MsEvent {
            subject: payload.summary.clone(),
            body: MsBody {
                content_type: "Text",
                content: payload.description.clone(),
            },
            start: MsDateTime {
                date_time: payload.start.format("%Y-%m-%dT%H:%M:%S").to_string(),
                time_zone: "UTC".to_string(),
            },
            end: MsDateTime {
                date_time: payload.end.format("%Y-%m-%dT%H:%M:%S").to_string(),
                time_zone: "UTC".to_string(),
            },
            attendees: payload
                .attendees
                .iter()
                .map(|a| MsAttendee {
                    email_address: MsEmailAddress { address: a.clone() },
                    kind: "required",
                })
                .collect(),
        };

        debug!("outlook: creating event {:?}", payload.summary);

        let resp = self
            .client
            .post(EVENTS_ENDPOINT)
            .bearer_auth(&access_token)
            .json(&event)
            .send()
            .await
            .map_err(|e| AideError::Calendar(format!("outlook request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AideError::Calendar(format!(
                "outlook returned {status}: {body}"
            )));
        }

        let created: MsCreatedEvent = resp
            .json()
            .await
            .map_err(|e| AideError::Calendar(format!("outlook response parse failed: {e}")))?;

        Ok(ScheduledEvent {
            event_id: created.id.unwrap_or_default(),
            web_link: created.web_link,
        })
    }
}
