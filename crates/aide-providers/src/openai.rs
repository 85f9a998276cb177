//! OpenAI-compatible completion backend.
//!
//! Works with OpenAI's API and any compatible endpoint. The classifier's
//! whole prompt travels as a single user message; one request per call,
//! no retries.

use aide_core::{config::CompletionConfig, error::AideError, traits::Completion};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Chat-completions client implementing the [`Completion`] collaborator.
pub struct OpenAiCompletion {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompletion {
    pub fn from_config(cfg: &CompletionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: cfg.base_url.clone(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub(crate) struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Option<Vec<ChatChoice>>,
}

#[derive(Deserialize)]
pub(crate) struct ChatChoice {
    pub message: Option<ChatMessage>,
}

#[async_trait]
impl Completion for OpenAiCompletion {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String, AideError> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("openai: POST {url} model={}", self.model);

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AideError::Completion(format!("openai request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AideError::Completion(format!(
                "openai returned {status}: {text}"
            )));
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| AideError::Completion(format!("openai: failed to parse response: {e}")))?;

        parsed
            .choices
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.message.as_ref())
            .map(|m| m.content.clone())
            .ok_or_else(|| AideError::Completion("openai: empty choices in response".into()))
    }
}
