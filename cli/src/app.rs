//! Construction of the long-lived collaborators from configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use docqa_embeddings::{EmbeddingProvider, HashingProvider, OpenAIProvider};
use docqa_llm::{ChatCompletionsClient, LanguageModel};
use docqa_retrieval::RagPipeline;
use docqa_vector_store::PersistentVectorStore;
use tracing::debug;

use crate::config::{AppConfig, EmbeddingProviderKind, EmbeddingSettings, LlmSettings};

/// Build the embedding function described by `settings`.
pub fn build_embedder(settings: &EmbeddingSettings) -> Arc<dyn EmbeddingProvider> {
    match settings.provider {
        EmbeddingProviderKind::Hashing => match settings.dimension {
            Some(dimension) => Arc::new(HashingProvider::with_dimension(dimension)),
            None => Arc::new(HashingProvider::new()),
        },
        EmbeddingProviderKind::Openai => {
            let mut provider = OpenAIProvider::new().with_base_url(&settings.base_url);
            if let Some(model) = &settings.model {
                provider = provider.with_model(model);
            }
            if let Some(dimension) = settings.dimension {
                provider = provider.with_dimension(dimension);
            }
            if let Some(api_key) = &settings.api_key {
                provider = provider.with_api_key(api_key);
            }
            Arc::new(provider)
        }
    }
}

/// Build the chat client described by `settings`.
pub fn build_model(settings: &LlmSettings) -> Arc<dyn LanguageModel> {
    let mut client = ChatCompletionsClient::new().with_base_url(&settings.base_url);
    if let Some(api_key) = &settings.api_key {
        client = client.with_api_key(api_key);
    }
    Arc::new(client)
}

/// Open the configured vector store.
pub async fn open_store(config: &AppConfig) -> Result<Arc<PersistentVectorStore>> {
    let embedder = build_embedder(&config.embedding);
    debug!(
        "Using {} embeddings ({}, {} dims)",
        embedder.name(),
        embedder.model(),
        embedder.dimension()
    );

    let store = PersistentVectorStore::open(&config.store.location, embedder)
        .await
        .with_context(|| {
            format!(
                "failed to open vector store at {}",
                config.store.location.display()
            )
        })?;
    Ok(Arc::new(store))
}

/// Open the store and wire up the query pipeline.
pub async fn build_pipeline(config: &AppConfig) -> Result<RagPipeline> {
    let store = open_store(config).await?;
    let pipeline = RagPipeline::builder()
        .with_store(store)
        .with_model(build_model(&config.llm))
        .with_config(config.retrieval.clone())
        .build()?;
    Ok(pipeline)
}
