//! # Retrieval
//!
//! The question answering pipeline over one ingested document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          RagPipeline                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  question ──► Retrieve ──► Check ──► Answer ──► Confidence      │
//! │                  │           │          │            │          │
//! │                  ▼           ▼          ▼            ▼          │
//! │            VectorStore   no docs?   LanguageModel  len(docs)    │
//! │                          fallback   (skipped on                 │
//! │                          answer      fallback)                  │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each stage consumes the previous stage's state type and produces the next
//! one (`Retrieved` -> `Checked` -> `Answered` -> [`RagState`]), so a stage
//! cannot run twice or out of order.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docqa_retrieval::RagPipeline;
//!
//! let pipeline = RagPipeline::builder()
//!     .with_store(store)
//!     .with_model(Arc::new(ChatCompletionsClient::new()))
//!     .with_retrieval_k(4)
//!     .build()?;
//!
//! let state = pipeline.invoke("What is agentic AI?").await?;
//! println!("{} ({})", state.answer, state.confidence);
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod stages;
pub mod state;

pub use config::{DEFAULT_MODEL_ID, DEFAULT_RETRIEVAL_K, RagConfig};
pub use error::{RagError, Result};
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use prompt::{FALLBACK_ANSWER, build_prompt};
pub use stages::confidence_for;
pub use state::{Answered, Checked, RagState, Retrieved};

// Re-export from dependencies for convenience
pub use docqa_llm::LanguageModel;
pub use docqa_vector_store::{Document, VectorStore};
