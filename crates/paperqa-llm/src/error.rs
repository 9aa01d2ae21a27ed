use reqwest::StatusCode;
use thiserror::Error;

/// Errors from the chat completion endpoint. None of them are retried.
#[derive(Error, Debug)]
pub enum LlmError {
    /// 400 and other client errors
    #[error("Invalid request ({status}): {body}")]
    InvalidRequest { status: StatusCode, body: String },

    /// Missing or rejected credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// 5xx
    #[error("API server error ({status}): {body}")]
    ServerError { status: StatusCode, body: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Success status but no usable message content
    #[error("Empty completion: {0}")]
    EmptyCompletion(String),
}

impl LlmError {
    /// Maps an HTTP status and body to an error variant:
    /// - 401, 403: authentication failed
    /// - 429: rate limit exceeded
    /// - 5xx: server error
    /// - anything else: invalid request
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => Self::AuthenticationFailed(body),
            429 => Self::RateLimitExceeded,
            500..=599 => Self::ServerError { status, body },
            _ => Self::InvalidRequest { status, body },
        }
    }
}
