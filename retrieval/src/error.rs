//! Error types for the query pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;

/// Errors that abort a pipeline invocation.
///
/// Collaborator errors are carried unchanged so callers can inspect them.
#[derive(Error, Debug)]
pub enum RagError {
    /// The vector store failed during retrieval.
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] docqa_vector_store::VectorStoreError),

    /// The language model failed while answering.
    #[error("answer generation failed: {0}")]
    Generation(#[from] docqa_llm::LlmError),

    /// The pipeline was built without a required collaborator.
    #[error("configuration error: {0}")]
    Config(String),
}
