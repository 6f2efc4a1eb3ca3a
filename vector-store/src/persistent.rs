//! On-disk vector store.
//!
//! A store lives in one directory:
//!
//! - `index.json`: embeddings in insertion order, each carrying its document
//! - `manifest.json`: format version, embedding model, dimension, counts and
//!   timestamps
//!
//! The manifest is written last, so a directory with a manifest always has a
//! complete index next to it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docqa_embeddings::{EmbeddingError, EmbeddingProvider, SimilarityIndex};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::document::Document;
use crate::error::{Result, VectorStoreError};
use crate::store::VectorStore;

/// Version of the on-disk layout.
pub const FORMAT_VERSION: u32 = 1;

const MANIFEST_FILE: &str = "manifest.json";
const INDEX_FILE: &str = "index.json";

/// Texts sent to the embedder per request while adding documents.
const EMBED_BATCH_SIZE: usize = 64;

/// Metadata describing a persisted store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreManifest {
    /// Layout version.
    pub format_version: u32,

    /// Identifier of the embedding model that built the index.
    pub embedding_model: String,

    /// Embedding dimension.
    pub dimension: usize,

    /// Number of stored documents.
    pub document_count: usize,

    /// When the store was first created.
    pub created_at: DateTime<Utc>,

    /// When the store was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Summary of a store, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    pub location: PathBuf,
    pub embedding_model: String,
    pub dimension: usize,
    pub document_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Whether the store exists on disk.
    pub persisted: bool,
}

struct StoreState {
    index: SimilarityIndex,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    persisted: bool,
}

/// Vector store backed by a directory on disk.
///
/// Changes are held in memory until [`persist`](Self::persist) is called.
pub struct PersistentVectorStore {
    /// Directory holding the store files.
    location: PathBuf,

    /// Embedding function used for documents and queries alike.
    embedder: Arc<dyn EmbeddingProvider>,

    state: RwLock<StoreState>,
}

impl PersistentVectorStore {
    /// Open the store at `location`.
    ///
    /// A directory without a manifest (or no directory at all) opens as an
    /// empty store; nothing is created until [`persist`](Self::persist).
    /// Fails with [`VectorStoreError::EmbedderMismatch`] when the store was
    /// built with a different embedding model or dimension.
    pub async fn open(
        location: impl AsRef<Path>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let location = location.as_ref().to_path_buf();
        let manifest_path = location.join(MANIFEST_FILE);

        let state = if fs::try_exists(&manifest_path)
            .await
            .map_err(|e| storage_error(&manifest_path, e))?
        {
            let manifest = read_manifest(&manifest_path).await?;
            check_compatible(&manifest, embedder.as_ref())?;

            let index_path = location.join(INDEX_FILE);
            let json = fs::read_to_string(&index_path)
                .await
                .map_err(|e| storage_error(&index_path, e))?;
            let index = SimilarityIndex::from_json(&json, manifest.dimension).map_err(|e| {
                VectorStoreError::Corrupt(format!("{}: {e}", index_path.display()))
            })?;

            if index.len() != manifest.document_count {
                warn!(
                    "Manifest lists {} documents but the index holds {}",
                    manifest.document_count,
                    index.len()
                );
            }

            info!(
                "Opened vector store at {} ({} documents)",
                location.display(),
                index.len()
            );

            StoreState {
                index,
                created_at: manifest.created_at,
                updated_at: manifest.updated_at,
                persisted: true,
            }
        } else {
            debug!("No store at {}, starting empty", location.display());
            let now = Utc::now();
            StoreState {
                index: SimilarityIndex::new(embedder.dimension()),
                created_at: now,
                updated_at: now,
                persisted: false,
            }
        };

        Ok(Self {
            location,
            embedder,
            state: RwLock::new(state),
        })
    }

    /// Directory holding the store files.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Embed and add documents, returning their new ids in input order.
    pub async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let mut embeddings = Vec::with_capacity(documents.len());
        for batch in documents.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|d| d.content.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;
            if vectors.len() != texts.len() {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    vectors.len()
                ))
                .into());
            }
            embeddings.extend(vectors);
            debug!("Embedded {}/{} documents", embeddings.len(), documents.len());
        }

        let mut state = self.state.write().await;
        let mut ids = Vec::with_capacity(documents.len());
        for (document, embedding) in documents.into_iter().zip(embeddings) {
            let id = Uuid::new_v4().to_string();
            let metadata = serde_json::to_value(&document)?;
            state
                .index
                .add(id.clone(), embedding, Some(metadata))
                .map_err(VectorStoreError::Embedding)?;
            ids.push(id);
        }
        state.updated_at = Utc::now();

        info!("Added {} documents to vector store", ids.len());
        Ok(ids)
    }

    /// Remove every document. Takes effect on disk at the next persist.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.index.clear();
        state.updated_at = Utc::now();
    }

    /// Write the store to its directory.
    pub async fn persist(&self) -> Result<()> {
        let mut state = self.state.write().await;

        fs::create_dir_all(&self.location)
            .await
            .map_err(|e| storage_error(&self.location, e))?;

        let index_json = state.index.to_json().map_err(VectorStoreError::Embedding)?;
        write_atomic(&self.location.join(INDEX_FILE), &index_json).await?;

        let manifest = StoreManifest {
            format_version: FORMAT_VERSION,
            embedding_model: self.embedder.model().to_string(),
            dimension: self.embedder.dimension(),
            document_count: state.index.len(),
            created_at: state.created_at,
            updated_at: state.updated_at,
        };
        let manifest_json = serde_json::to_string_pretty(&manifest)?;
        write_atomic(&self.location.join(MANIFEST_FILE), &manifest_json).await?;

        state.persisted = true;
        info!(
            "Persisted {} documents to {}",
            manifest.document_count,
            self.location.display()
        );
        Ok(())
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.state.read().await.index.len()
    }

    /// Whether the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.index.is_empty()
    }

    /// Summary of the store.
    pub async fn stats(&self) -> StoreStats {
        let state = self.state.read().await;
        StoreStats {
            location: self.location.clone(),
            embedding_model: self.embedder.model().to_string(),
            dimension: self.embedder.dimension(),
            document_count: state.index.len(),
            created_at: state.created_at,
            updated_at: state.updated_at,
            persisted: state.persisted,
        }
    }
}

#[async_trait]
impl VectorStore for PersistentVectorStore {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<Document>> {
        if k == 0 || self.is_empty().await {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(text).await?;

        let state = self.state.read().await;
        let results = state
            .index
            .search(&query, k, f32::NEG_INFINITY)
            .map_err(VectorStoreError::Embedding)?;

        debug!("Vector store returned {} of at most {k} documents", results.len());

        results
            .into_iter()
            .map(|result| {
                let metadata = result.metadata.ok_or_else(|| {
                    VectorStoreError::Corrupt(format!("entry {} has no document", result.id))
                })?;
                Ok(serde_json::from_value(metadata)?)
            })
            .collect()
    }
}

fn storage_error(path: &Path, e: std::io::Error) -> VectorStoreError {
    VectorStoreError::Storage(format!("{}: {e}", path.display()))
}

async fn read_manifest(path: &Path) -> Result<StoreManifest> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| storage_error(path, e))?;
    let manifest: StoreManifest = serde_json::from_str(&content)
        .map_err(|e| VectorStoreError::Corrupt(format!("{}: {e}", path.display())))?;

    if manifest.format_version != FORMAT_VERSION {
        return Err(VectorStoreError::Corrupt(format!(
            "unsupported store format version {}",
            manifest.format_version
        )));
    }
    Ok(manifest)
}

fn check_compatible(manifest: &StoreManifest, embedder: &dyn EmbeddingProvider) -> Result<()> {
    if manifest.embedding_model != embedder.model() || manifest.dimension != embedder.dimension()
    {
        return Err(VectorStoreError::EmbedderMismatch {
            stored_model: manifest.embedding_model.clone(),
            stored_dimension: manifest.dimension,
            model: embedder.model().to_string(),
            dimension: embedder.dimension(),
        });
    }
    Ok(())
}

async fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content)
        .await
        .map_err(|e| storage_error(&temp_path, e))?;

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| storage_error(path, e))?;

    debug!("Wrote {}", path.display());
    Ok(())
}
