use reqwest::StatusCode;
use thiserror::Error;

/// Failures of the hosted embeddings endpoint. None of them are retried.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("Embedding API rejected the credentials ({0})")]
    Unauthorized(StatusCode),

    #[error("Embedding API rate limit exceeded")]
    RateLimited,

    #[error("Embedding API error ({status}): {body}")]
    Api { status: StatusCode, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed embedding response: {0}")]
    Malformed(String),
}

impl EmbedError {
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(status),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            _ => Self::Api { status, body },
        }
    }
}
