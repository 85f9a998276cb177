//! Gmail send adapter, used to deliver escalation resolutions.
//!
//! Docs: <https://developers.google.com/gmail/api/reference/rest/v1/users.messages/send>

use crate::token::refresh_access_token;
use aide_core::{config::OAuthProviderConfig, error::AideError, traits::Mailer};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Serialize;
use tracing::debug;

const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const SEND_ENDPOINT: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

pub struct GmailMailer {
    client: reqwest::Client,
    oauth: OAuthProviderConfig,
}

#[derive(Serialize)]
struct SendRequest {
    raw: String,
}

impl GmailMailer {
    pub fn new(oauth: OAuthProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            oauth,
        }
    }
}

/// Assemble a minimal RFC 2822 message and encode it the way Gmail wants
/// (base64url, no padding).
fn encode_message(recipient: &str, subject: &str, body: &str) -> String {
    let rfc2822 = format!(
        "To: {recipient}\r\nSubject: {subject}\r\nContent-Type: text/plain; charset=\"UTF-8\"\r\n\r\n{body}"
    );
    URL_SAFE_NO_PAD.encode(rfc2822)
}

#[async_trait]
impl Mailer for GmailMailer {
    async fn send(
        &self,
        refresh_token: &str,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), AideError> {
        let access_token =
            refresh_access_token(&self.client, TOKEN_ENDPOINT, &self.oauth, refresh_token)
                .await
                .map_err(|e| AideError::Mail(e.to_string()))?;

        debug!("gmail: sending reply to {recipient}");

        let resp = self
            .client
            .post(SEND_ENDPOINT)
            .bearer_auth(&access_token)
            .json(&SendRequest {
                raw: encode_message(recipient, subject, body),
            })
            .send()
            .await
            .map_err(|e| AideError::Mail(format!("gmail request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AideError::Mail(format!("gmail returned {status}: {text}")));
        }

        Ok(())
    }
}
