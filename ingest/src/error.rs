//! Error types for ingestion.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors that can occur while ingesting a document.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The file extension is not one the loader understands.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Reading the source failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Text could not be extracted from a PDF.
    #[error("pdf extraction failed: {0}")]
    Pdf(String),

    /// Splitter settings are unusable.
    #[error("invalid splitter configuration: {0}")]
    InvalidConfig(String),

    /// Storing the chunks failed.
    #[error("vector store error: {0}")]
    VectorStore(#[from] docqa_vector_store::VectorStoreError),
}
