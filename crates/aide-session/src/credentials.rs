//! Credential gate: presence checks for per-session OAuth refresh tokens
//! and authorize-link construction for sessions that have none.

use aide_core::config::OAuthProviderConfig;
use aide_core::event::CalendarProvider;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use url::Url;

/// Refresh tokens keyed by (session id, provider).
///
/// The core only reads; tokens are written by the out-of-scope OAuth
/// redirect callback through [`CredentialStore::store`].
#[derive(Clone, Default)]
pub struct CredentialStore {
    tokens: Arc<RwLock<HashMap<(String, CalendarProvider), String>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, session_id: &str, provider: CalendarProvider) -> bool {
        self.get(session_id, provider).is_some()
    }

    pub fn get(&self, session_id: &str, provider: CalendarProvider) -> Option<String> {
        let tokens = self.tokens.read().expect("credential store poisoned");
        tokens
            .get(&(session_id.to_string(), provider))
            .filter(|t| !t.trim().is_empty())
            .cloned()
    }

    /// Record a token. Called by the OAuth callback handler, not the router.
    pub fn store(&self, session_id: &str, provider: CalendarProvider, token: &str) {
        let mut tokens = self.tokens.write().expect("credential store poisoned");
        tokens.insert((session_id.to_string(), provider), token.to_string());
    }
}

/// Build the provider's OAuth authorize URL for a session.
///
/// The session id rides along as the opaque `state` parameter so the
/// redirect callback can associate the token with the right conversation.
pub fn authorize_url(
    cfg: &OAuthProviderConfig,
    provider: CalendarProvider,
    session_id: &str,
) -> String {
    let mut url = Url::parse(&cfg.authorize_endpoint).unwrap_or_else(|_| {
        // A bad endpoint in config still has to produce something clickable.
        Url::parse("https://invalid.example/authorize").expect("static url")
    });

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("response_type", "code")
            .append_pair("client_id", &cfg.client_id)
            .append_pair("redirect_uri", &cfg.redirect_uri)
            .append_pair("scope", &cfg.scope);
        match provider {
            CalendarProvider::Google => {
                query
                    .append_pair("access_type", "offline")
                    .append_pair("prompt", "consent");
            }
            CalendarProvider::Outlook => {
                query.append_pair("response_mode", "query");
            }
        }
        query.append_pair("state", session_id);
    }

    url.to_string()
}
