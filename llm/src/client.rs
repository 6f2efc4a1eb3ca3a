//! The language model seam.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// A remote text-completion service.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Name of the backend, for logs.
    fn name(&self) -> &str;

    /// Send `prompt` as a single user turn to `model_id` and return the text
    /// of the first answer.
    async fn complete(&self, model_id: &str, prompt: &str) -> Result<String>;
}

#[async_trait]
impl<T: LanguageModel + ?Sized> LanguageModel for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn complete(&self, model_id: &str, prompt: &str) -> Result<String> {
        (**self).complete(model_id, prompt).await
    }
}
