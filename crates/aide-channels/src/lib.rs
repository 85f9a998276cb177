//! # aide-channels
//!
//! Messaging transports. Telegram long polling today, with Whisper-backed
//! voice note transcription as an optional stage.

pub mod telegram;
pub mod whisper;

pub use telegram::TelegramChannel;
pub use whisper::WhisperTranscriber;
