//! # BidGPT Core
//!
//! Shared building blocks for every BidGPT crate:
//! - [`error`]: the single error enum and `Result` alias
//! - [`config`]: TOML + environment configuration
//! - [`types`]: chat messages and provider responses
//! - [`traits`]: the `Provider` and `Mailer` seams

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::BidGptConfig;
pub use error::{BidGptError, ErrorKind, Result};
