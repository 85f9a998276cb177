use thiserror::Error;

/// Top-level error type for Aide.
#[derive(Debug, Error)]
pub enum AideError {
    /// Error from the completion collaborator.
    #[error("completion error: {0}")]
    Completion(String),

    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Error from a calendar provider. Carries the provider's reason verbatim.
    #[error("calendar error: {0}")]
    Calendar(String),

    /// Error from the outbound email collaborator.
    #[error("mail error: {0}")]
    Mail(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
