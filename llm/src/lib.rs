//! # LLM
//!
//! Single-turn text completion against a hosted language model.
//!
//! [`LanguageModel`] is the seam the query pipeline depends on;
//! [`ChatCompletionsClient`] implements it for any OpenAI-compatible
//! `/chat/completions` endpoint (Groq by default).

pub mod chat;
pub mod client;
pub mod error;

pub use chat::{ChatCompletionsClient, GROQ_API_KEY_ENV, GROQ_BASE_URL};
pub use client::LanguageModel;
pub use error::{LlmError, Result};
