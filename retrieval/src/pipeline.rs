//! The query pipeline.

use std::sync::Arc;

use docqa_llm::LanguageModel;
use docqa_vector_store::VectorStore;
use tracing::{debug, info};

use crate::config::RagConfig;
use crate::error::{RagError, Result};
use crate::stages;
use crate::state::RagState;

/// Answers questions from a vector store with a language model.
///
/// Collaborators are shared, so one pipeline can serve concurrent
/// invocations; each invocation owns its own state and runs its stages in
/// sequence.
pub struct RagPipeline {
    /// Source of context chunks.
    store: Arc<dyn VectorStore>,

    /// Model asked for answers.
    model: Arc<dyn LanguageModel>,

    /// Configuration.
    config: RagConfig,
}

impl RagPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::new()
    }

    /// Create a pipeline from its collaborators.
    pub fn new(
        store: Arc<dyn VectorStore>,
        model: Arc<dyn LanguageModel>,
        config: RagConfig,
    ) -> Self {
        Self {
            store,
            model,
            config,
        }
    }

    /// Run Retrieve, Check, Answer and Confidence for one question.
    ///
    /// Store and model failures abort the invocation and are returned as is;
    /// there is no partial result.
    pub async fn invoke(&self, question: impl Into<String>) -> Result<RagState> {
        let question = question.into();
        debug!("Processing question: {question}");

        let retrieved =
            stages::retrieve(self.store.as_ref(), question, self.config.retrieval_k).await?;
        let checked = stages::check(retrieved);
        let answered =
            stages::answer(self.model.as_ref(), &self.config.model_id, checked).await?;
        let state = stages::score(answered);

        info!(
            "Answered with {} documents, confidence {}",
            state.docs.len(),
            state.confidence
        );
        Ok(state)
    }
}

/// Builder for [`RagPipeline`].
pub struct RagPipelineBuilder {
    store: Option<Arc<dyn VectorStore>>,
    model: Option<Arc<dyn LanguageModel>>,
    config: RagConfig,
}

impl RagPipelineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            store: None,
            model: None,
            config: RagConfig::default(),
        }
    }

    /// Set the vector store.
    pub fn with_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the language model.
    pub fn with_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the whole configuration.
    pub fn with_config(mut self, config: RagConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the model identifier.
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.config.model_id = model_id.into();
        self
    }

    /// Set the number of chunks to retrieve.
    pub fn with_retrieval_k(mut self, k: usize) -> Self {
        self.config.retrieval_k = k;
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> Result<RagPipeline> {
        let store = self
            .store
            .ok_or_else(|| RagError::Config("no vector store".to_string()))?;
        let model = self
            .model
            .ok_or_else(|| RagError::Config("no language model".to_string()))?;
        Ok(RagPipeline::new(store, model, self.config))
    }
}

impl Default for RagPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
