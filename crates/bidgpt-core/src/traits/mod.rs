//! Trait seams between BidGPT components.

pub mod identity;
pub mod mailer;
pub mod provider;

pub use mailer::Mailer;
pub use provider::{GenerateParams, Provider};
