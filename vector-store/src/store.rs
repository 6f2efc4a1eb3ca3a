//! The query-side contract of a vector store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::document::Document;
use crate::error::Result;

/// Similarity search over stored documents.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return at most `k` documents, most similar to `text` first.
    ///
    /// An empty store yields an empty vector rather than an error.
    async fn query(&self, text: &str, k: usize) -> Result<Vec<Document>>;
}

#[async_trait]
impl<T: VectorStore + ?Sized> VectorStore for Arc<T> {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<Document>> {
        (**self).query(text, k).await
    }
}
