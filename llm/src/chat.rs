//! OpenAI-compatible chat completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::LanguageModel;
use crate::error::{LlmError, Result};

/// Base URL of Groq's OpenAI-compatible API.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Environment variable holding the Groq API key.
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Client for `POST {base_url}/chat/completions`.
///
/// Each call sends exactly one user message and returns the content of the
/// first choice. There is no retry, streaming or request timeout.
pub struct ChatCompletionsClient {
    /// Checked when a request is made, not at construction.
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl ChatCompletionsClient {
    /// Create a client for Groq, reading the key from `GROQ_API_KEY`.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var(GROQ_API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty()),
            base_url: GROQ_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Point at another OpenAI-compatible server, e.g. a local vLLM.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether an API key is available.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for ChatCompletionsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl LanguageModel for ChatCompletionsClient {
    fn name(&self) -> &str {
        "chat-completions"
    }

    async fn complete(&self, model_id: &str, prompt: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            LlmError::NotConfigured(format!("{GROQ_API_KEY_ENV} is not set"))
        })?;

        let body = ChatRequest {
            model: model_id,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!("Requesting completion from {model_id} ({} prompt chars)", prompt.len());

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok())
                .unwrap_or(60);
            return Err(LlmError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiRequest {
                status: status.as_u16(),
                body,
            });
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let answer = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("no choices in response".to_string()))?
            .message
            .content
            .ok_or_else(|| LlmError::InvalidResponse("first choice has no content".to_string()))?;

        debug!("Received {} answer chars from {model_id}", answer.len());
        Ok(answer)
    }
}
