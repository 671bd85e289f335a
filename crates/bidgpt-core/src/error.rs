//! Error types shared across BidGPT crates.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BidGptError>;

/// All errors raised by BidGPT components.
#[derive(Debug, Error)]
pub enum BidGptError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API key not set for provider '{0}'")]
    ApiKeyMissing(String),

    #[error("Unknown provider: {0}")]
    ProviderNotFound(String),

    #[error("Knowledge base error: {0}")]
    Load(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("{0}")]
    Validation(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used at the process and HTTP boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid configuration. Fatal at startup.
    Config,
    /// Knowledge base missing or unusable. Fatal at startup.
    Load,
    /// LLM API unreachable, timed out or answered with garbage.
    Gateway,
    /// Bad request input.
    Validation,
    /// SMTP failure or missing mail credentials.
    Mail,
    /// Local IO failure outside the categories above.
    Io,
}

impl BidGptError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::ApiKeyMissing(_) | Self::ProviderNotFound(_) => {
                ErrorKind::Config
            }
            Self::Load(_) => ErrorKind::Load,
            Self::Http(_) | Self::Provider(_) | Self::Timeout(_) => ErrorKind::Gateway,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Mail(_) => ErrorKind::Mail,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// True for errors that must stop the process before it serves traffic.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Config | ErrorKind::Load)
    }
}
