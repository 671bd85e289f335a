//! LLM provider trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Message, ProviderResponse};

/// Generation parameters sent with every completion request.
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub model: String,
    /// Omitted from the request when `None` so the provider default applies.
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            model: "llama-3.1-8b-instant".into(),
            temperature: None,
            max_tokens: None,
        }
    }
}

/// A hosted chat-completion backend.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name (e.g. "groq").
    fn name(&self) -> &str;

    /// Send an ordered message list and return the first generated choice.
    async fn chat(&self, messages: &[Message], params: &GenerateParams)
    -> Result<ProviderResponse>;
}
