//! Telegram Bot API channel.
//!
//! Uses long polling via `getUpdates` and `sendMessage` for responses.
//! The chat id doubles as the session id. Voice notes are transcribed
//! through an optional [`Transcriber`] before they enter the pipeline.
//! Docs: <https://core.telegram.org/bots/api>

use aide_core::{
    config::TelegramConfig,
    error::AideError,
    message::{InboundMessage, Origin, OutboundReply},
    traits::{Channel, Transcriber},
};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Telegram channel using the Bot API with long polling.
pub struct TelegramChannel {
    config: TelegramConfig,
    client: reqwest::Client,
    base_url: String,
    /// Voice-transcription stage; `None` means voice notes are skipped.
    transcriber: Option<Arc<dyn Transcriber>>,
    /// Tracks the last update_id to avoid reprocessing.
    last_update_id: Arc<Mutex<Option<i64>>>,
}

// --- Telegram API types ---

#[derive(Debug, Deserialize)]
struct TgResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgUpdate {
    update_id: i64,
    message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct TgMessage {
    message_id: i64,
    from: Option<TgUser>,
    chat: TgChat,
    text: Option<String>,
    voice: Option<TgVoice>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct TgVoice {
    file_id: String,
    duration: i64,
}

#[derive(Debug, Deserialize)]
struct TgFile {
    file_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct TgUser {
    id: i64,
    first_name: String,
    last_name: Option<String>,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgChat {
    id: i64,
}

impl TelegramChannel {
    /// Create a new Telegram channel from config.
    pub fn new(config: TelegramConfig, transcriber: Option<Arc<dyn Transcriber>>) -> Self {
        let base_url = format!("https://api.telegram.org/bot{}", config.bot_token);
        Self {
            config,
            client: reqwest::Client::new(),
            base_url,
            transcriber,
            last_update_id: Arc::new(Mutex::new(None)),
        }
    }

    /// Send a text message, optionally with one inline URL button.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        button: Option<(&str, &str)>,
    ) -> Result<(), AideError> {
        let url = format!("{}/sendMessage", self.base_url);
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some((label, link)) = button {
            body["reply_markup"] = serde_json::json!({
                "inline_keyboard": [[{ "text": label, "url": link }]],
            });
        }

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AideError::Channel(format!("telegram send failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            warn!("telegram send got {status}: {error_text}");
        }

        Ok(())
    }
}

/// Download a file's bytes via getFile + the file endpoint.
async fn download_telegram_file(
    client: &reqwest::Client,
    base_url: &str,
    bot_token: &str,
    file_id: &str,
) -> Result<Vec<u8>, AideError> {
    let resp = client
        .get(format!("{base_url}/getFile?file_id={file_id}"))
        .send()
        .await
        .map_err(|e| AideError::Channel(format!("telegram getFile failed: {e}")))?;

    let body: TgResponse<TgFile> = resp
        .json()
        .await
        .map_err(|e| AideError::Channel(format!("telegram getFile parse failed: {e}")))?;

    let file_path = body
        .result
        .and_then(|f| f.file_path)
        .ok_or_else(|| AideError::Channel("telegram getFile returned no path".into()))?;

    let file_url = format!("https://api.telegram.org/file/bot{bot_token}/{file_path}");
    let bytes = client
        .get(&file_url)
        .send()
        .await
        .map_err(|e| AideError::Channel(format!("telegram file download failed: {e}")))?
        .bytes()
        .await
        .map_err(|e| AideError::Channel(format!("telegram file read failed: {e}")))?;

    Ok(bytes.to_vec())
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<mpsc::Receiver<InboundMessage>, AideError> {
        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let bot_token = self.config.bot_token.clone();
        let transcriber = self.transcriber.clone();
        let last_update_id = self.last_update_id.clone();

        info!("Telegram channel starting long polling...");

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                let last = last_update_id.lock().await;
                let offset = last.map(|id| id + 1);
                drop(last);

                let mut url = format!("{base_url}/getUpdates?timeout=30");
                if let Some(off) = offset {
                    url.push_str(&format!("&offset={off}"));
                }

                let resp = match client
                    .get(&url)
                    .timeout(std::time::Duration::from_secs(35))
                    .send()
                    .await
                {
                    Ok(r) => r,
                    Err(e) => {
                        error!("telegram poll error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                let body: TgResponse<Vec<TgUpdate>> = match resp.json().await {
                    Ok(b) => b,
                    Err(e) => {
                        error!("telegram parse error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                if !body.ok {
                    error!(
                        "telegram API error (retry in {backoff_secs}s): {}",
                        body.description.unwrap_or_default()
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(60);
                    continue;
                }

                // Successful poll — reset backoff.
                backoff_secs = 1;

                let updates = body.result.unwrap_or_default();

                if let Some(last_update) = updates.last() {
                    *last_update_id.lock().await = Some(last_update.update_id);
                }

                for update in updates {
                    let msg = match update.message {
                        Some(m) => m,
                        None => continue,
                    };

                    let text = if let Some(t) = msg.text {
                        t
                    } else if let Some(ref voice) = msg.voice {
                        let Some(ref stage) = transcriber else {
                            debug!("skipping voice note (no transcriber configured)");
                            continue;
                        };
                        match download_telegram_file(&client, &base_url, &bot_token, &voice.file_id)
                            .await
                        {
                            Ok(bytes) => match stage.transcribe(&bytes).await {
                                Ok(transcript) => {
                                    info!("transcribed voice note ({}s)", voice.duration);
                                    transcript
                                }
                                Err(e) => {
                                    warn!("voice transcription failed: {e}");
                                    continue;
                                }
                            },
                            Err(e) => {
                                warn!("voice download failed: {e}");
                                continue;
                            }
                        }
                    } else {
                        continue;
                    };

                    let sender_name = msg.from.map(|user| {
                        if let Some(ref un) = user.username {
                            format!("@{un}")
                        } else if let Some(ref ln) = user.last_name {
                            format!("{} {ln}", user.first_name)
                        } else {
                            user.first_name.clone()
                        }
                    });

                    let inbound = InboundMessage {
                        id: Uuid::new_v4(),
                        channel: "telegram".to_string(),
                        session_id: msg.chat.id.to_string(),
                        origin: Origin::Chat,
                        sender_name,
                        text,
                        timestamp: chrono::Utc::now(),
                    };

                    if tx.send(inbound).await.is_err() {
                        info!("telegram channel receiver dropped, stopping poll");
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send(&self, reply: OutboundReply) -> Result<(), AideError> {
        let chat_id: i64 = reply.session_id.parse().map_err(|e| {
            AideError::Channel(format!("invalid telegram chat_id '{}': {e}", reply.session_id))
        })?;

        let button = reply
            .link_button
            .as_ref()
            .map(|b| (b.label.as_str(), b.url.as_str()));

        self.send_message(chat_id, &reply.text, button).await
    }

    async fn stop(&self) -> Result<(), AideError> {
        // Long polling stops when the receiver is dropped; nothing to tear down.
        Ok(())
    }
}
