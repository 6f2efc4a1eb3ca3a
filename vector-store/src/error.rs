//! Error types for the vector store.

use docqa_embeddings::EmbeddingError;
use thiserror::Error;

/// Result type alias for vector store operations.
pub type Result<T> = std::result::Result<T, VectorStoreError>;

/// Errors that can occur in the vector store.
#[derive(Error, Debug)]
pub enum VectorStoreError {
    /// Embedding the query or the documents failed.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Reading or writing the store directory failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store was built with a different embedding function.
    #[error(
        "store was built with {stored_model} ({stored_dimension} dims), \
         but the configured embedder is {model} ({dimension} dims)"
    )]
    EmbedderMismatch {
        stored_model: String,
        stored_dimension: usize,
        model: String,
        dimension: usize,
    },

    /// The store directory holds data this version cannot read.
    #[error("corrupt store: {0}")]
    Corrupt(String),
}
