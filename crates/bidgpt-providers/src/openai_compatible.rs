//! Unified OpenAI-compatible provider.
//!
//! A single struct that handles chat completions for every OpenAI-compatible
//! API. Providers differ only by endpoint URL, auth style and API key.

use async_trait::async_trait;
use bidgpt_core::config::LlmConfig;
use bidgpt_core::error::{BidGptError, Result};
use bidgpt_core::traits::provider::{GenerateParams, Provider};
use bidgpt_core::types::{Message, ProviderResponse, Usage};
use serde_json::{Value, json};
use std::time::Duration;

use crate::provider_registry::{AuthStyle, ProviderConfig};

/// A unified provider that works with any OpenAI-compatible API.
pub struct OpenAiCompatibleProvider {
    /// Provider name (e.g., "groq", "openai").
    name: String,
    /// API key for authentication.
    api_key: String,
    /// Base URL for the API (e.g., "https://api.groq.com/openai/v1").
    base_url: String,
    /// Path for chat completions (e.g., "/chat/completions").
    chat_path: String,
    /// Authentication style.
    auth_style: AuthStyle,
    /// HTTP client with the request timeout baked in.
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    /// Create from a known provider config + LLM settings.
    ///
    /// Resolution order:
    /// - API key: `llm.api_key` > registry env vars
    /// - Base URL: `llm.endpoint` > env override > registry default
    ///
    /// A provider that needs a key and cannot resolve one is a config error.
    pub fn from_registry(registry: &ProviderConfig, config: &LlmConfig) -> Result<Self> {
        let api_key = if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            registry
                .env_keys
                .iter()
                .find_map(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()))
                .unwrap_or_default()
        };

        if registry.auth_style != AuthStyle::None && api_key.is_empty() {
            return Err(BidGptError::ApiKeyMissing(format!(
                "{} (set {})",
                registry.name,
                registry.env_keys.join(" or ")
            )));
        }

        let base_url = if !config.endpoint.is_empty() {
            config.endpoint.trim_end_matches('/').to_string()
        } else {
            registry
                .base_url_env
                .and_then(|env_key| {
                    let val = std::env::var(env_key).ok()?;
                    // OLLAMA_HOST is usually given without the /v1 suffix
                    if val.ends_with("/v1") {
                        Some(val)
                    } else {
                        Some(format!("{}/v1", val.trim_end_matches('/')))
                    }
                })
                .unwrap_or_else(|| registry.base_url.to_string())
        };

        Ok(Self {
            name: registry.name.to_string(),
            api_key,
            base_url,
            chat_path: registry.chat_path.to_string(),
            auth_style: registry.auth_style,
            client: build_client(config.timeout_secs)?,
        })
    }

    /// Create for a custom endpoint (e.g., "custom:https://my-server.com/v1").
    pub fn custom(endpoint: &str, config: &LlmConfig) -> Result<Self> {
        let base_url = endpoint
            .strip_prefix("custom:")
            .unwrap_or(endpoint)
            .trim_end_matches('/')
            .to_string();

        let api_key = if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            std::env::var("CUSTOM_API_KEY").unwrap_or_default()
        };

        let auth_style = if api_key.is_empty() {
            AuthStyle::None
        } else {
            AuthStyle::Bearer
        };

        Ok(Self {
            name: "custom".to_string(),
            api_key,
            base_url,
            chat_path: "/chat/completions".to_string(),
            auth_style,
            client: build_client(config.timeout_secs)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the auth header for the request.
    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_style {
            AuthStyle::Bearer if !self.api_key.is_empty() => {
                req.header("Authorization", format!("Bearer {}", self.api_key))
            }
            _ => req,
        }
    }

    fn transport_error(&self, url: &str, e: reqwest::Error) -> BidGptError {
        if e.is_timeout() {
            BidGptError::Timeout(format!("{} did not answer in time ({url})", self.name))
        } else {
            BidGptError::Http(format!("{} connection failed ({url}): {e}", self.name))
        }
    }
}

fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .map_err(|e| BidGptError::Config(format!("HTTP client: {e}")))
}

/// Pull the first choice out of a chat-completions body.
pub fn parse_completion(json: &Value) -> Result<ProviderResponse> {
    let choice = json["choices"]
        .get(0)
        .ok_or_else(|| BidGptError::Provider("No choices in response".into()))?;

    let content = choice["message"]["content"].as_str().map(String::from);

    let usage = json["usage"].as_object().map(|u| Usage {
        prompt_tokens: u.get("prompt_tokens").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
        completion_tokens: u
            .get("completion_tokens")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32,
        total_tokens: u.get("total_tokens").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
    });

    Ok(ProviderResponse {
        content,
        finish_reason: choice["finish_reason"].as_str().map(String::from),
        usage,
    })
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(
        &self,
        messages: &[Message],
        params: &GenerateParams,
    ) -> Result<ProviderResponse> {
        let mut body = json!({
            "model": params.model,
            "messages": serde_json::to_value(messages)
                .map_err(|e| BidGptError::Provider(format!("Encode messages: {e}")))?,
        });
        if let Some(t) = params.temperature {
            body["temperature"] = json!(t);
        }
        if let Some(m) = params.max_tokens {
            body["max_tokens"] = json!(m);
        }

        let url = format!("{}{}", self.base_url, self.chat_path);
        let req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        let req = self.apply_auth(req);

        tracing::debug!(
            "📡 {} ← {} message(s), model={}",
            self.name,
            messages.len(),
            params.model
        );

        let resp = req.send().await.map_err(|e| self.transport_error(&url, e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BidGptError::Provider(format!(
                "{} API error {}: {}",
                self.name, status, text
            )));
        }

        let json: Value = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(&url, e)
            } else {
                BidGptError::Provider(format!("{} returned a malformed body: {e}", self.name))
            }
        })?;

        let parsed = parse_completion(&json)?;
        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                "📊 {} usage: prompt={} completion={}",
                self.name,
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }
        Ok(parsed)
    }
}
