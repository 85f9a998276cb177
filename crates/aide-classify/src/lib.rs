//! # aide-classify
//!
//! Turns a conversation transcript into a typed [`Decision`] via one
//! completion call. The model offers no format guarantee, so parsing is the
//! principal failure surface: every malformed shape degrades to a safe
//! decision instead of an error.

pub mod decision;
pub mod parse;
pub mod prompt;

pub use decision::Decision;
pub use parse::ParseOutcome;

use aide_core::{error::AideError, traits::Completion};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// The intent classifier. Holds the completion collaborator and performs
/// exactly one call per inbound message, no retries.
pub struct Classifier {
    completion: Arc<dyn Completion>,
}

impl Classifier {
    pub fn new(completion: Arc<dyn Completion>) -> Self {
        Self { completion }
    }

    /// Classify the latest user turn given the rendered transcript.
    ///
    /// `Err` means the completion call itself failed; a completion that
    /// answered with garbage comes back as [`ParseOutcome::Malformed`].
    pub async fn classify(
        &self,
        transcript: &str,
        now: DateTime<Utc>,
    ) -> Result<ParseOutcome, AideError> {
        let full_prompt = prompt::build(transcript, now);
        let raw = self.completion.complete(&full_prompt).await?;
        debug!("completion ({}): {raw}", self.completion.name());
        Ok(parse::parse(&raw, now))
    }
}
