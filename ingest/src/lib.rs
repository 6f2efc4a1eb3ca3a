//! # Ingest
//!
//! The offline job that turns a source document into a searchable store:
//!
//! ```text
//! source file ──► DocumentLoader ──► RecursiveCharacterSplitter ──► PersistentVectorStore
//!   (.pdf/.txt/.md)    one Document       overlapping chunks            embed + persist
//! ```

pub mod error;
pub mod ingestion;
pub mod loader;
pub mod splitter;

pub use error::{IngestError, Result};
pub use ingestion::{IngestReport, IngestionConfig, IngestionPipeline};
pub use loader::{DocumentFormat, DocumentLoader};
pub use splitter::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, RecursiveCharacterSplitter, SplitterConfig,
};
