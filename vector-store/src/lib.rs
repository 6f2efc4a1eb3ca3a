//! # Vector Store
//!
//! Document chunks and their embeddings, persisted to a directory and
//! queried by similarity.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 PersistentVectorStore                    │
//! ├──────────────────────────────────────────────────────────┤
//! │  add_documents ──► EmbeddingProvider ──► SimilarityIndex │
//! │  query(text,k) ──► EmbeddingProvider ──► top-k Documents │
//! │  persist ──► <location>/index.json + manifest.json       │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod document;
pub mod error;
pub mod persistent;
pub mod store;

pub use document::Document;
pub use error::{Result, VectorStoreError};
pub use persistent::{FORMAT_VERSION, PersistentVectorStore, StoreManifest, StoreStats};
pub use store::VectorStore;
