//! # BidGPT Providers
//!
//! LLM gateway clients. Every supported backend (Groq, OpenAI, OpenRouter,
//! Ollama, custom URLs) speaks the OpenAI chat-completions dialect and is
//! served by a single `OpenAiCompatibleProvider`.

pub mod openai_compatible;
pub mod provider_registry;

use bidgpt_core::config::LlmConfig;
use bidgpt_core::error::{BidGptError, Result};
use bidgpt_core::traits::{GenerateParams, Provider};

/// Create a provider from the `[llm]` configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Box<dyn Provider>> {
    match config.provider.as_str() {
        // Custom endpoint: "custom:https://my-server.com/v1"
        other if other.starts_with("custom:") => Ok(Box::new(
            openai_compatible::OpenAiCompatibleProvider::custom(other, config)?,
        )),

        name => {
            let registry = provider_registry::get_provider_config(name).ok_or_else(|| {
                BidGptError::ProviderNotFound(format!(
                    "{name} (known: {}, custom:<url>)",
                    provider_registry::all_provider_names().join(", ")
                ))
            })?;
            Ok(Box::new(
                openai_compatible::OpenAiCompatibleProvider::from_registry(registry, config)?,
            ))
        }
    }
}

/// Generation parameters derived from the `[llm]` configuration.
pub fn generate_params(config: &LlmConfig) -> GenerateParams {
    let model = if config.model.is_empty() {
        provider_registry::get_provider_config(&config.provider)
            .map(|p| p.default_model.to_string())
            .unwrap_or_else(|| GenerateParams::default().model)
    } else {
        config.model.clone()
    };
    GenerateParams {
        model,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}
