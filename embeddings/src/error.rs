//! Errors raised while turning text into vectors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EmbeddingError>;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// The provider cannot run, e.g. the hosted endpoint has no API key.
    #[error("embedding provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// The endpoint answered with a non-success status.
    #[error("embedding request failed: {0}")]
    ApiRequest(String),

    /// The endpoint answered, but not with what was asked for.
    #[error("unexpected embedding response: {0}")]
    InvalidResponse(String),

    /// HTTP 429. Surfaced to the caller as is.
    #[error("embedding endpoint is rate limiting, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("vector has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("failed to (de)serialize embeddings: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
