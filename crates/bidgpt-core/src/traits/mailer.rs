//! Outbound mail trait.

use async_trait::async_trait;

use crate::error::Result;

/// Something that delivers a plain-text message to a fixed recipient.
#[async_trait]
pub trait Mailer: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, subject: &str, body: &str) -> Result<()>;
}
