//! # BidGPT Agent
//!
//! The two request pipelines behind the HTTP layer:
//! - chat: retrieve best knowledge line → compose prompt → LLM
//! - translate: frame translation messages → LLM
//!
//! An `Assistant` is built once at startup and is read-only afterwards, so
//! it is shared across requests behind an `Arc` without locking.

pub mod prompt;

use std::sync::Arc;

use bidgpt_core::config::BidGptConfig;
use bidgpt_core::error::{BidGptError, Result};
use bidgpt_core::traits::identity::Identity;
use bidgpt_core::traits::{GenerateParams, Provider};
use bidgpt_core::types::Message;
use bidgpt_knowledge::KnowledgeStore;

/// Retrieval-augmented assistant.
pub struct Assistant {
    identity: Identity,
    knowledge: Arc<KnowledgeStore>,
    provider: Arc<dyn Provider>,
    params: GenerateParams,
    default_target_lang: String,
}

impl Assistant {
    pub fn new(
        identity: Identity,
        knowledge: Arc<KnowledgeStore>,
        provider: Arc<dyn Provider>,
        params: GenerateParams,
    ) -> Self {
        Self {
            identity,
            knowledge,
            provider,
            params,
            default_target_lang: "hi".into(),
        }
    }

    /// Build from configuration: creates the provider from `[llm]`.
    pub fn from_config(config: &BidGptConfig, knowledge: Arc<KnowledgeStore>) -> Result<Self> {
        let provider: Arc<dyn Provider> = bidgpt_providers::create_provider(&config.llm)?.into();
        let params = bidgpt_providers::generate_params(&config.llm);
        tracing::info!(
            "✅ LLM gateway ready (provider={}, model={})",
            provider.name(),
            params.model
        );
        Ok(Self::new(config.identity.clone(), knowledge, provider, params)
            .with_default_target_lang(&config.translation.default_target_lang))
    }

    pub fn with_default_target_lang(mut self, lang: &str) -> Self {
        if !lang.trim().is_empty() {
            self.default_target_lang = lang.trim().to_string();
        }
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.params.model
    }

    pub fn knowledge(&self) -> &KnowledgeStore {
        &self.knowledge
    }

    pub fn default_target_lang(&self) -> &str {
        &self.default_target_lang
    }

    /// Messages that `answer` would send for `question`.
    pub fn chat_messages(&self, question: &str) -> Vec<Message> {
        let context = self.knowledge.context_for(question);
        prompt::chat_messages(&self.identity, context, question)
    }

    /// Answer a question using the best-matching knowledge line as context.
    pub async fn answer(&self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(BidGptError::Validation("Please ask a question.".into()));
        }
        let messages = self.chat_messages(question);
        self.complete(&messages).await
    }

    /// Translate `text` into `target_lang`, or the default language when absent.
    pub async fn translate(&self, text: &str, target_lang: Option<&str>) -> Result<String> {
        if text.trim().is_empty() {
            return Err(BidGptError::Validation("No text provided".into()));
        }
        let target = target_lang
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.default_target_lang.as_str());
        let messages = prompt::translation_messages(text, target);
        Ok(self.complete(&messages).await?.trim().to_string())
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let response = self.provider.chat(messages, &self.params).await?;
        response.content.ok_or_else(|| {
            BidGptError::Provider(format!("{} returned no message content", self.provider.name()))
        })
    }
}
