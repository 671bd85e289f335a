//! BidGPT configuration system.
//!
//! Defaults, then an optional TOML file, then environment overrides. Every
//! field carries a serde default so an empty file is a valid config.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BidGptError, Result};
use crate::traits::identity::Identity;

/// Config file picked up from the working directory when no path is given.
pub const LOCAL_CONFIG_FILE: &str = "bidgpt.toml";

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BidGptConfig {
    /// Debug toggle. `None` means "follow the deployment profile".
    #[serde(default)]
    pub debug: Option<bool>,
    #[serde(default)]
    pub deployment: Deployment,
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

/// Where the process runs. Drives the default port and debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Deployment {
    /// Developer machine: port 4000, debug on.
    #[default]
    Local,
    /// Managed host (the `RENDER` flag): port 5000, debug off.
    Hosted,
}

impl Deployment {
    pub fn default_port(self) -> u16 {
        match self {
            Self::Local => 4000,
            Self::Hosted => 5000,
        }
    }
}

impl BidGptConfig {
    /// Load config from an explicit path, or `./bidgpt.toml` when present,
    /// or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => {
                let local = Path::new(LOCAL_CONFIG_FILE);
                if local.exists() {
                    Self::load_from(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BidGptError::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| BidGptError::Config(format!("Failed to parse config: {e}")))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (tests pass a map).
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if get("RENDER").is_some() {
            self.deployment = Deployment::Hosted;
        }
        if let Some(port) = get("PORT") {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|e| BidGptError::Config(format!("Invalid PORT '{port}': {e}")))?;
            self.gateway.port = Some(port);
        }
        if let Some(env) = get("FLASK_ENV") {
            self.debug = Some(env.trim().eq_ignore_ascii_case("development"));
        }
        if let Some(flag) = get("DEBUG") {
            self.debug = Some(parse_bool(&flag));
        }

        if let Some(provider) = get("BIDGPT_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Some(model) = get("BIDGPT_MODEL") {
            self.llm.model = model;
        }
        if let Some(key) = get("GROQ_API_KEY") {
            if self.llm.provider.eq_ignore_ascii_case("groq") {
                self.llm.api_key = key;
            }
        }

        if let Some(path) = get("BIDGPT_KNOWLEDGE_PATH") {
            self.knowledge.path = path;
        }
        if let Some(dir) = get("BIDGPT_STATIC_DIR") {
            self.gateway.static_dir = dir;
        }
        if let Some(origins) = get("BIDGPT_CORS_ORIGINS") {
            self.gateway.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(user) = get("FEEDBACK_GMAIL_USER") {
            self.feedback.username = user;
        }
        if let Some(pass) = get("FEEDBACK_GMAIL_PASS") {
            self.feedback.password = pass;
        }
        if let Some(to) = get("FEEDBACK_GMAIL_TO") {
            self.feedback.recipient = to;
        }
        Ok(())
    }

    /// Effective debug flag.
    pub fn debug_enabled(&self) -> bool {
        self.debug
            .unwrap_or(self.deployment == Deployment::Local)
    }

    /// Effective listen port.
    pub fn port(&self) -> u16 {
        self.gateway
            .port
            .unwrap_or_else(|| self.deployment.default_port())
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.gateway.host, self.port())
    }
}

fn parse_bool(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Expand a leading `~` in a configured path.
pub fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

/// LLM gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Empty means "resolve from the provider's env vars".
    #[serde(default)]
    pub api_key: String,
    /// Overrides the registry base URL when set.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_provider() -> String { "groq".into() }
fn default_model() -> String { "llama-3.1-8b-instant".into() }
fn default_llm_timeout() -> u64 { 30 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: String::new(),
            endpoint: String::new(),
            temperature: None,
            max_tokens: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// Knowledge base configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default = "default_kb_path")]
    pub path: String,
    /// Best matches scoring at or below this are discarded.
    #[serde(default = "default_threshold")]
    pub relevance_threshold: f64,
}

fn default_kb_path() -> String { "knowledge_base.txt".into() }
fn default_threshold() -> f64 { 0.2 }

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: default_kb_path(),
            relevance_threshold: default_threshold(),
        }
    }
}

impl KnowledgeConfig {
    pub fn resolved_path(&self) -> PathBuf {
        expand_path(&self.path)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    /// `None` means "use the deployment profile default".
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Empty allows every origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_static_dir() -> String { "static".into() }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
            static_dir: default_static_dir(),
            cors_origins: vec![],
        }
    }
}

impl GatewayConfig {
    pub fn resolved_static_dir(&self) -> PathBuf {
        expand_path(&self.static_dir)
    }
}

/// `/translate` configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_target_lang")]
    pub default_target_lang: String,
}

fn bool_true() -> bool { true }
fn default_target_lang() -> String { "hi".into() }

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_target_lang: default_target_lang(),
        }
    }
}

/// `/feedback` mail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// Implicit TLS port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub recipient: String,
    #[serde(default = "default_smtp_timeout")]
    pub timeout_secs: u64,
}

fn default_smtp_host() -> String { "smtp.gmail.com".into() }
fn default_smtp_port() -> u16 { 465 }
fn default_smtp_timeout() -> u64 { 10 }

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            recipient: String::new(),
            timeout_secs: default_smtp_timeout(),
        }
    }
}

/// The three values `/feedback` cannot work without.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailCredentials {
    pub username: String,
    pub password: String,
    pub recipient: String,
}

impl FeedbackConfig {
    /// `Some` only when user, password and recipient are all set.
    pub fn credentials(&self) -> Option<MailCredentials> {
        let set = |s: &str| !s.trim().is_empty();
        if set(&self.username) && set(&self.password) && set(&self.recipient) {
            Some(MailCredentials {
                username: self.username.trim().to_string(),
                password: self.password.clone(),
                recipient: self.recipient.trim().to_string(),
            })
        } else {
            None
        }
    }
}
