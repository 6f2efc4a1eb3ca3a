//! The unit of retrieval.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A piece of text plus where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The text itself.
    pub content: String,

    /// Source metadata such as `source`, `format` or `chunk`.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Document {
    /// Create a document without metadata.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata value.
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Replace all metadata.
    pub fn with_metadata_map(mut self, metadata: BTreeMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// The `source` metadata entry, if it is a string.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(serde_json::Value::as_str)
    }
}
