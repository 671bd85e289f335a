//! Knowledge base file loader: one document per non-blank line.

use bidgpt_core::error::{BidGptError, Result};
use std::path::Path;

/// Read the whole file eagerly. Missing, unreadable or non-UTF-8 files are
/// a `Load` error.
pub fn load_documents(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        BidGptError::Load(format!("Cannot read {}: {e}", path.display()))
    })?;
    let docs = parse_documents(&content);
    tracing::debug!("📄 Loaded {} line(s) from {}", docs.len(), path.display());
    Ok(docs)
}

/// Split text into trimmed, non-empty lines, preserving order.
pub fn parse_documents(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
