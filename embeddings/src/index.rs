//! In-memory vector index with exact cosine search.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::similarity::{SimilarityResult, find_top_k, normalize};

/// A stored vector and the metadata returned with it on a hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    /// Unit length once inside the index.
    pub embedding: Embedding,
    pub metadata: Option<serde_json::Value>,
}

/// Brute-force similarity index of fixed dimension.
///
/// Entries keep insertion order, both in memory and in [`Self::to_json`], so
/// equal scores always come back in the order the entries were added.
#[derive(Debug)]
pub struct SimilarityIndex {
    entries: IndexMap<String, IndexEntry>,
    dimension: usize,
}

impl SimilarityIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            dimension,
        }
    }

    /// Insert a vector under `id`. An existing `id` is overwritten in place.
    pub fn add(
        &mut self,
        id: impl Into<String>,
        mut embedding: Embedding,
        metadata: Option<serde_json::Value>,
    ) -> Result<()> {
        self.check_dimension(embedding.len())?;
        normalize(&mut embedding);

        let id = id.into();
        debug!("Indexed {id}");
        self.entries.insert(
            id.clone(),
            IndexEntry {
                id,
                embedding,
                metadata,
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Up to `k` entries scoring at least `min_score` against `query`, best
    /// first, each with its stored metadata attached.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        min_score: f32,
    ) -> Result<Vec<SimilarityResult>> {
        self.check_dimension(query.len())?;

        let mut query = query.to_vec();
        normalize(&mut query);

        let candidates = self
            .entries
            .values()
            .map(|entry| (entry.id.as_str(), entry.embedding.as_slice()));
        let mut hits = find_top_k(&query, candidates, k, min_score)?;

        for hit in &mut hits {
            hit.metadata = self
                .entries
                .get(&hit.id)
                .and_then(|entry| entry.metadata.clone());
        }
        Ok(hits)
    }

    pub fn clear(&mut self) {
        info!("Dropping {} indexed vectors", self.entries.len());
        self.entries.clear();
    }

    /// Entries as a JSON array, in insertion order.
    pub fn to_json(&self) -> Result<String> {
        let entries: Vec<&IndexEntry> = self.entries.values().collect();
        Ok(serde_json::to_string(&entries)?)
    }

    /// Rebuild an index written by [`Self::to_json`]. Every vector must have
    /// `dimension` components.
    pub fn from_json(json: &str, dimension: usize) -> Result<Self> {
        let entries: Vec<IndexEntry> = serde_json::from_str(json)?;

        let mut index = Self::new(dimension);
        for entry in entries {
            index.check_dimension(entry.embedding.len())?;
            index.entries.insert(entry.id.clone(), entry);
        }

        debug!("Restored {} indexed vectors", index.len());
        Ok(index)
    }

    fn check_dimension(&self, actual: usize) -> Result<()> {
        if actual == self.dimension {
            Ok(())
        } else {
            Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual,
            })
        }
    }
}
