//! Error types for language model clients.

use thiserror::Error;

/// Result type alias for language model operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur while asking a language model.
#[derive(Error, Debug)]
pub enum LlmError {
    /// No credentials are configured for the backend.
    #[error("language model not configured: {0}")]
    NotConfigured(String),

    /// The backend answered with a non-success status.
    #[error("API request failed with status {status}: {body}")]
    ApiRequest { status: u16, body: String },

    /// The backend rejected the request because of rate limits.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The response did not contain an answer.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
