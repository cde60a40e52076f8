use thiserror::Error;

/// Everything that can go wrong between a note and its creature.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Caller supplied unusable input (empty or oversized text, bad names).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The OAuth exchange failed or the re-authentication budget ran out.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The Provider answered with a non-401 error status.
    #[error("Provider returned {status}: {body}")]
    Transport { status: u16, body: String },

    /// The Provider answered 2xx but the body broke the expected contract.
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    /// True when the failure is the caller's fault rather than ours or the Provider's.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ProviderError::Validation(_))
    }
}
