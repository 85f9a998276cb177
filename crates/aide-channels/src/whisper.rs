//! Whisper transcription — the voice-to-text stage for chat channels.

use aide_core::{error::AideError, traits::Transcriber};
use async_trait::async_trait;
use serde::Deserialize;

/// Whisper API response.
#[derive(Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Transcriber backed by the OpenAI Whisper API.
pub struct WhisperTranscriber {
    client: reqwest::Client,
    api_key: String,
}

impl WhisperTranscriber {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, AideError> {
        let part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name("voice.ogg")
            .mime_str("audio/ogg")
            .map_err(|e| AideError::Channel(format!("whisper mime error: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .text("model", "whisper-1")
            .part("file", part);

        let resp = self
            .client
            .post("https://api.openai.com/v1/audio/transcriptions")
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AideError::Channel(format!("whisper request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AideError::Channel(format!(
                "whisper API error {status}: {body}"
            )));
        }

        let result: WhisperResponse = resp
            .json()
            .await
            .map_err(|e| AideError::Channel(format!("whisper response parse failed: {e}")))?;

        Ok(result.text)
    }
}
