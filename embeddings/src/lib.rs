//! Text embeddings for docqa.
//!
//! Two [`EmbeddingProvider`]s turn text into vectors: [`OpenAIProvider`] calls
//! any OpenAI-compatible `/embeddings` endpoint, and [`HashingProvider`] works
//! offline with feature hashing. [`SimilarityIndex`] holds the vectors and
//! answers exact cosine top-k queries.
//!
//! ```text
//!   text ──► EmbeddingProvider ──► Vec<f32> ──► SimilarityIndex::add
//!                                                     │
//!   question ──► EmbeddingProvider ──► search ◄───────┘
//!                                        │
//!                                        ▼
//!                         find_top_k (cosine, stable on ties)
//! ```
//!
//! Vectors from different providers are not comparable; a corpus has to be
//! queried with the provider that indexed it.

pub mod error;
pub mod index;
pub mod provider;
pub mod similarity;

pub use error::{EmbeddingError, Result};
pub use index::{IndexEntry, SimilarityIndex};
pub use provider::{EmbeddingProvider, HashingProvider, OpenAIProvider};
pub use similarity::{SimilarityResult, cosine_similarity, find_top_k, normalize};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Dimension of the hashing embedder unless configured otherwise.
pub const DEFAULT_DIMENSION: usize = 384;
