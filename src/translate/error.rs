use std::time::Duration;
use thiserror::Error;

/// A request that can't be sent. Nothing went over the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid input")]
    InvalidInput,

    #[error("Text is required")]
    MissingText,

    #[error("Source language is required")]
    MissingSourceLanguage,

    #[error("Target language is required")]
    MissingTargetLanguage,
}

/// The inference service failed or answered with something unusable.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Ollama API error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("timeout: no response from Ollama within {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("Ollama request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Malformed Ollama response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl TranslateError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TranslateError::Upstream(UpstreamError::Timeout(_)))
    }

    /// Short text for end users. Upstream details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            TranslateError::Validation(e) => e.to_string(),
            TranslateError::Upstream(UpstreamError::Timeout(_)) => "Translation timed out".to_string(),
            TranslateError::Upstream(_) => "Translation failed".to_string(),
        }
    }
}
