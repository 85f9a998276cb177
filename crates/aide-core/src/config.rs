use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::AideError;
use crate::event::CalendarProvider;

/// Top-level Aide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub aide: AideConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub oauth: OAuthConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

/// General agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AideConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AideConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

/// Completion backend (OpenAI-compatible chat completions endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_completion_model")]
    pub model: String,
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_completion_model(),
            base_url: default_completion_base_url(),
        }
    }
}

/// Channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    pub telegram: Option<TelegramConfig>,
}

/// Telegram bot config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
    /// Whisper API key for voice note transcription. Empty disables the
    /// voice stage.
    #[serde(default)]
    pub transcription_api_key: String,
}

/// OAuth settings for both calendar providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    #[serde(default = "OAuthProviderConfig::google_default")]
    pub google: OAuthProviderConfig,
    #[serde(default = "OAuthProviderConfig::outlook_default")]
    pub outlook: OAuthProviderConfig,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            google: OAuthProviderConfig::google_default(),
            outlook: OAuthProviderConfig::outlook_default(),
        }
    }
}

impl OAuthConfig {
    pub fn provider(&self, provider: CalendarProvider) -> &OAuthProviderConfig {
        match provider {
            CalendarProvider::Google => &self.google,
            CalendarProvider::Outlook => &self.outlook,
        }
    }
}

/// Per-provider OAuth client settings used to build authorize links and
/// refresh access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthProviderConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub authorize_endpoint: String,
}

impl Default for OAuthProviderConfig {
    fn default() -> Self {
        Self::google_default()
    }
}

impl OAuthProviderConfig {
    pub fn google_default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            scope: "https://www.googleapis.com/auth/calendar https://www.googleapis.com/auth/gmail.send".into(),
            authorize_endpoint: "https://accounts.google.com/o/oauth2/v2/auth".into(),
        }
    }

    pub fn outlook_default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            scope: "offline_access Calendars.ReadWrite".into(),
            authorize_endpoint: "https://login.microsoftonline.com/common/oauth2/v2.0/authorize"
                .into(),
        }
    }
}

/// Outbound email settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MailConfig {
    #[serde(default)]
    pub enabled: bool,
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, AideError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config {
            aide: AideConfig::default(),
            completion: CompletionConfig::default(),
            channel: ChannelConfig::default(),
            oauth: OAuthConfig {
                google: OAuthProviderConfig::google_default(),
                outlook: OAuthProviderConfig::outlook_default(),
            },
            mail: MailConfig::default(),
        });
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| AideError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| AideError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}

fn default_name() -> String {
    "aide".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_completion_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_completion_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_defaults() {
        let cfg = CompletionConfig::default();
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert_eq!(cfg.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_oauth_defaults_per_provider() {
        let oauth = OAuthConfig {
            google: OAuthProviderConfig::google_default(),
            outlook: OAuthProviderConfig::outlook_default(),
        };
        assert!(oauth
            .provider(CalendarProvider::Google)
            .authorize_endpoint
            .contains("accounts.google.com"));
        assert!(oauth
            .provider(CalendarProvider::Outlook)
            .authorize_endpoint
            .contains("login.microsoftonline.com"));
        assert!(oauth.outlook.scope.contains("offline_access"));
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            [aide]
            name = "aide"
            log_level = "debug"

            [completion]
            api_key = "sk-test"
            model = "gpt-4o"

            [channel.telegram]
            enabled = true
            bot_token = "123:abc"

            [oauth.google]
            client_id = "cid"
            redirect_uri = "https://example.com/oauth/google"
        "#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.aide.log_level, "debug");
        assert_eq!(cfg.completion.model, "gpt-4o");
        assert!(cfg.channel.telegram.unwrap().enabled);
        assert_eq!(cfg.oauth.google.client_id, "cid");
        // Defaults fill in what the file omits.
        assert_eq!(cfg.completion.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let cfg = load("/nonexistent/aide-config.toml").unwrap();
        assert_eq!(cfg.aide.name, "aide");
        assert!(!cfg.mail.enabled);
    }
}
