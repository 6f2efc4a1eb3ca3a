//! Layered application configuration.
//!
//! Precedence, lowest first: built-in defaults, a TOML file (`--config`, or
//! `docqa.toml` in the working directory), environment variables (including
//! a `.env` file), then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use docqa_embeddings::provider::OPENAI_BASE_URL;
use docqa_ingest::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use docqa_llm::GROQ_BASE_URL;
use docqa_retrieval::RagConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "docqa.toml";

/// Complete configuration of the `docqa` binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub embedding: EmbeddingSettings,
    pub store: StoreSettings,
    pub llm: LlmSettings,
    pub retrieval: RagConfig,
    pub ingest: IngestSettings,
}

/// Which embedding function to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderKind {
    /// Offline feature hashing.
    #[default]
    Hashing,
    /// OpenAI-compatible HTTP endpoint.
    Openai,
}

impl std::str::FromStr for EmbeddingProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hashing" => Ok(Self::Hashing),
            "openai" => Ok(Self::Openai),
            other => bail!("unknown embedding provider `{other}` (expected `hashing` or `openai`)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProviderKind,

    /// Model name; the provider's default when unset.
    pub model: Option<String>,

    /// Endpoint for the `openai` provider.
    pub base_url: String,

    pub api_key: Option<String>,

    /// Vector size. The hashing provider uses 384 when unset; the `openai`
    /// provider follows its model.
    pub dimension: Option<usize>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::Hashing,
            model: None,
            base_url: OPENAI_BASE_URL.to_string(),
            api_key: None,
            dimension: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Directory of the persisted vector store.
    pub location: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            location: PathBuf::from("vector_store"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: GROQ_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Document ingested when `docqa ingest` gets no path.
    pub source: Option<PathBuf>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            source: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl AppConfig {
    /// Load defaults, then the config file, then the process environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Overlay environment variables read through `lookup`.
    ///
    /// Empty values are ignored; malformed numbers are errors.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get("DOCQA_EMBEDDING_PROVIDER") {
            self.embedding.provider = value
                .parse()
                .context("invalid DOCQA_EMBEDDING_PROVIDER")?;
        }
        if let Some(value) = get("DOCQA_EMBEDDING_MODEL") {
            self.embedding.model = Some(value);
        }
        if let Some(value) = get("DOCQA_EMBEDDING_BASE_URL") {
            self.embedding.base_url = value;
        }
        if let Some(value) = get("DOCQA_EMBEDDING_API_KEY").or_else(|| get("OPENAI_API_KEY")) {
            self.embedding.api_key = Some(value);
        }
        if let Some(value) = get("DOCQA_EMBEDDING_DIMENSION") {
            self.embedding.dimension = Some(parse_number("DOCQA_EMBEDDING_DIMENSION", &value)?);
        }
        if let Some(value) = get("DOCQA_STORE_DIR") {
            self.store.location = PathBuf::from(value);
        }
        if let Some(value) = get("DOCQA_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = get("GROQ_API_KEY") {
            self.llm.api_key = Some(value);
        }
        if let Some(value) = get("DOCQA_MODEL") {
            self.retrieval.model_id = value;
        }
        if let Some(value) = get("DOCQA_RETRIEVAL_K") {
            self.retrieval.retrieval_k = parse_number("DOCQA_RETRIEVAL_K", &value)?;
        }
        if let Some(value) = get("DOCQA_SOURCE") {
            self.ingest.source = Some(PathBuf::from(value));
        }
        if let Some(value) = get("DOCQA_CHUNK_SIZE") {
            self.ingest.chunk_size = parse_number("DOCQA_CHUNK_SIZE", &value)?;
        }
        if let Some(value) = get("DOCQA_CHUNK_OVERLAP") {
            self.ingest.chunk_overlap = parse_number("DOCQA_CHUNK_OVERLAP", &value)?;
        }

        Ok(())
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a non-negative integer, got `{value}`"))
}
