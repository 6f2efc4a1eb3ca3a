//! The ingestion job: load, split, embed and persist.

use std::path::PathBuf;
use std::time::Instant;

use docqa_vector_store::PersistentVectorStore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::loader::DocumentLoader;
use crate::splitter::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, RecursiveCharacterSplitter};

/// Configuration for an ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Document to ingest.
    pub source: PathBuf,

    /// Maximum chunk length in characters.
    pub chunk_size: usize,

    /// Overlap between chunks in characters.
    pub chunk_overlap: usize,

    /// Clear the store before adding chunks. By default chunks are appended.
    pub reset: bool,
}

impl IngestionConfig {
    /// Create a configuration with default chunking for `source`.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            reset: false,
        }
    }

    /// Set chunk size and overlap.
    pub fn with_chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_overlap = chunk_overlap;
        self
    }

    /// Clear the store before adding chunks.
    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Documents read from the source.
    pub documents_loaded: usize,

    /// Chunks produced by the splitter.
    pub chunks_created: usize,

    /// Documents in the store after the run.
    pub chunks_stored: usize,

    /// Wall-clock duration of the run.
    pub elapsed_ms: u64,
}

/// One-shot ingestion of a source document into a vector store.
pub struct IngestionPipeline {
    config: IngestionConfig,
    loader: DocumentLoader,
    splitter: RecursiveCharacterSplitter,
}

impl IngestionPipeline {
    /// Create a pipeline, validating the chunking settings.
    pub fn new(config: IngestionConfig) -> Result<Self> {
        let splitter = RecursiveCharacterSplitter::new(config.chunk_size, config.chunk_overlap)?;
        Ok(Self {
            config,
            loader: DocumentLoader::new(),
            splitter,
        })
    }

    /// Load, split, embed and persist into `store`.
    pub async fn run(&self, store: &PersistentVectorStore) -> Result<IngestReport> {
        let start_time = Instant::now();

        info!("Loading {}", self.config.source.display());
        let documents = self.loader.load(&self.config.source).await?;

        info!(
            "Chunking text (size {}, overlap {})",
            self.config.chunk_size, self.config.chunk_overlap
        );
        let chunks = self.splitter.split_documents(&documents);
        let chunks_created = chunks.len();
        if chunks.is_empty() {
            warn!("{} produced no chunks", self.config.source.display());
        }

        if self.config.reset {
            info!("Clearing vector store at {}", store.location().display());
            store.clear().await;
        }

        info!("Creating embeddings for {chunks_created} chunks");
        store.add_documents(chunks).await?;

        info!("Storing in {}", store.location().display());
        store.persist().await?;

        let report = IngestReport {
            documents_loaded: documents.len(),
            chunks_created,
            chunks_stored: store.len().await,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };

        info!("Ingestion complete in {}ms", report.elapsed_ms);
        Ok(report)
    }
}
