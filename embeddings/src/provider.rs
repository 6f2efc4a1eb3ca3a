//! Embedding functions.
//!
//! [`OpenAIProvider`] posts to any OpenAI-compatible `/embeddings` endpoint
//! (OpenAI, text-embeddings-inference, Ollama). [`HashingProvider`] needs no
//! model at all: it hashes words into a fixed number of buckets.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EmbeddingError, Result};
use crate::similarity::normalize;
use crate::{DEFAULT_DIMENSION, Embedding};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const DEFAULT_OPENAI_MODEL: &str = "text-embedding-3-small";

/// Turns text into fixed-size vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Model identifier. Stores record it and refuse to open with a provider
    /// that reports a different one.
    fn model(&self) -> &str;

    /// Length of every vector this provider returns.
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// One vector per text, in input order. Calls [`Self::embed`] for each
    /// text unless the provider has a batch endpoint.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Whether a call could succeed, e.g. credentials are present.
    fn is_available(&self) -> bool;
}

/// Client for `POST {base_url}/embeddings`.
///
/// The API key is optional: it is only required when talking to
/// [`OPENAI_BASE_URL`]. Self-hosted endpoints are called without a bearer
/// token unless one is set.
pub struct OpenAIProvider {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
    model: String,
    dimension: usize,
}

impl OpenAIProvider {
    /// `text-embedding-3-small` on api.openai.com, keyed from `OPENAI_API_KEY`.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            base_url: OPENAI_BASE_URL.to_string(),
            client: reqwest::Client::new(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            dimension: known_dimension(DEFAULT_OPENAI_MODEL),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Switch model. The expected dimension is reset to the model's known
    /// size; call [`Self::with_dimension`] afterwards for anything else.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self.dimension = known_dimension(&self.model);
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.api_key.is_none() && self.base_url == OPENAI_BASE_URL {
            return Err(EmbeddingError::ProviderNotConfigured(
                "OPENAI_API_KEY is not set".to_string(),
            ));
        }
        Ok(())
    }

    /// Send `input` and return the vectors ordered by their `index` field.
    async fn request(&self, input: Input<'_>, expected: usize) -> Result<Vec<Embedding>> {
        self.ensure_configured()?;

        let body = EmbeddingsRequest {
            model: &self.model,
            input,
        };
        let mut request = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok())
                .unwrap_or(60);
            return Err(EmbeddingError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!("{status}: {text}")));
        }

        let mut payload: EmbeddingsResponse = response.json().await?;
        if payload.data.len() != expected {
            return Err(EmbeddingError::InvalidResponse(format!(
                "asked for {expected} vectors, got {}",
                payload.data.len()
            )));
        }

        payload.data.sort_by_key(|item| item.index);
        payload
            .data
            .into_iter()
            .map(|item| {
                if item.embedding.len() == self.dimension {
                    Ok(item.embedding)
                } else {
                    Err(EmbeddingError::DimensionMismatch {
                        expected: self.dimension,
                        actual: item.embedding.len(),
                    })
                }
            })
            .collect()
    }
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn known_dimension(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        "nomic-embed-text" => 768,
        m if m.ends_with("all-MiniLM-L6-v2") => 384,
        _ => 1536,
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Input<'a> {
    One(&'a str),
    Many(&'a [String]),
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: Input<'a>,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingsItem>,
}

#[derive(Deserialize)]
struct EmbeddingsItem {
    embedding: Embedding,
    #[serde(default)]
    index: usize,
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        debug!("Embedding {} chars with {}", text.len(), self.model);
        let mut vectors = self.request(Input::One(text), 1).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty data".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self.request(Input::Many(texts), texts.len()).await?;
        info!("Embedded {} texts with {}", vectors.len(), self.model);
        Ok(vectors)
    }

    fn is_available(&self) -> bool {
        self.ensure_configured().is_ok()
    }
}

/// Offline embeddings by feature hashing.
///
/// Text is split into alphanumeric words, lowercased, and each word adds
/// ±1 to the bucket picked by its FNV-1a hash (the top bit picks the sign).
/// The result is scaled to unit length, so texts sharing words score high.
/// There is no notion of synonyms; it is a lexical retriever.
pub struct HashingProvider {
    dimension: usize,
    model: String,
}

impl HashingProvider {
    pub fn new() -> Self {
        Self::with_dimension(DEFAULT_DIMENSION)
    }

    /// `dimension` buckets, at least one. The model id is `hashing-{dimension}`.
    pub fn with_dimension(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            model: format!("hashing-{dimension}"),
        }
    }
}

impl Default for HashingProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

#[async_trait]
impl EmbeddingProvider for HashingProvider {
    fn name(&self) -> &str {
        "hashing"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let mut vector = vec![0.0f32; self.dimension];
        let words = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty());

        for word in words {
            let hash = fnv1a_64(word.to_lowercase().as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            vector[bucket] += if hash >> 63 == 0 { 1.0 } else { -1.0 };
        }

        normalize(&mut vector);
        Ok(vector)
    }

    fn is_available(&self) -> bool {
        true
    }
}
