//! Refresh-token → access-token exchange shared by all adapters.

use aide_core::{config::OAuthProviderConfig, error::AideError};
use serde::Deserialize;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Exchange a refresh token at the provider's token endpoint.
pub(crate) async fn refresh_access_token(
    client: &reqwest::Client,
    token_endpoint: &str,
    cfg: &OAuthProviderConfig,
    refresh_token: &str,
) -> Result<String, AideError> {
    let params = [
        ("client_id", cfg.client_id.as_str()),
        ("client_secret", cfg.client_secret.as_str()),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];

    let resp = client
        .post(token_endpoint)
        .form(&params)
        .send()
        .await
        .map_err(|e| AideError::Calendar(format!("token refresh failed: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(AideError::Calendar(format!(
            "token refresh returned {status}: {body}"
        )));
    }

    let parsed: TokenResponse = resp
        .json()
        .await
        .map_err(|e| AideError::Calendar(format!("token response parse failed: {e}")))?;

    parsed
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AideError::Calendar("token response had no access_token".into()))
}
