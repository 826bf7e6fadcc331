//! Client error types.

use thiserror::Error;

use vshot_models::event::{UPLOAD_NETWORK_FAILURE_MESSAGE, UPLOAD_REJECTED_FALLBACK_MESSAGE};

pub type ClientResult<T> = Result<T, ClientError>;

/// General client failures (construction, downloads).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Upload failures. A failed upload is never retried.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// No usable answer: transport error, bad HTTP status or malformed body.
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The server answered with `success: false`.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The local video could not be opened.
    #[error("Cannot read video file: {0}")]
    File(#[from] std::io::Error),
}

impl SubmitError {
    pub fn rejected(message: Option<String>) -> Self {
        Self::Rejected(message.unwrap_or_else(|| UPLOAD_REJECTED_FALLBACK_MESSAGE.to_string()))
    }

    /// Text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::NetworkFailure(_) => UPLOAD_NETWORK_FAILURE_MESSAGE.to_string(),
            SubmitError::Rejected(message) => message.clone(),
            SubmitError::File(e) => format!("Cannot read the selected video: {}", e),
        }
    }
}

impl From<reqwest::Error> for SubmitError {
    fn from(e: reqwest::Error) -> Self {
        Self::NetworkFailure(e.to_string())
    }
}

/// A status query that produced no usable answer. Absorbed by the poller.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Status endpoint returned {0}")]
    HttpStatus(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
