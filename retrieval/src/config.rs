//! Configuration for the query pipeline.

use serde::{Deserialize, Serialize};

/// Chat model asked for answers unless configured otherwise.
pub const DEFAULT_MODEL_ID: &str = "llama-3.1-8b-instant";

/// Number of chunks retrieved per question unless configured otherwise.
pub const DEFAULT_RETRIEVAL_K: usize = 4;

/// Configuration for the query pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Model identifier passed to the language model.
    pub model_id: String,

    /// How many chunks to retrieve.
    pub retrieval_k: usize,
}

impl RagConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            retrieval_k: DEFAULT_RETRIEVAL_K,
        }
    }

    /// Set the model identifier.
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Set the number of chunks to retrieve.
    pub fn with_retrieval_k(mut self, k: usize) -> Self {
        self.retrieval_k = k;
        self
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self::new()
    }
}
