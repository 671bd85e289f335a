//! Knowledge store: the loaded documents plus their fitted index.

use std::path::Path;

use bidgpt_core::error::Result;

use crate::index::{Match, TfIdfIndex};
use crate::loader;

/// A document that cleared the relevance threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieved<'a> {
    pub index: usize,
    pub document: &'a str,
    pub score: f64,
}

/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    documents: Vec<String>,
    index: TfIdfIndex,
    threshold: f64,
}

impl KnowledgeStore {
    /// Load a knowledge base file and fit the index over it.
    pub fn open(path: &Path, threshold: f64) -> Result<Self> {
        let documents = loader::load_documents(path)?;
        let store = Self::from_documents(documents, threshold)?;
        let (docs, terms) = store.stats();
        tracing::info!(
            "📚 Knowledge base: {} documents, {} terms ({})",
            docs,
            terms,
            path.display()
        );
        Ok(store)
    }

    pub fn from_documents(documents: Vec<String>, threshold: f64) -> Result<Self> {
        let index = TfIdfIndex::fit(&documents)?;
        Ok(Self {
            documents,
            index,
            threshold,
        })
    }

    /// Raw best match, without the threshold applied.
    pub fn best_match(&self, query: &str) -> Match {
        self.index.query(query)
    }

    /// Best document when its score is strictly above the threshold.
    pub fn retrieve(&self, query: &str) -> Option<Retrieved<'_>> {
        let m = self.best_match(query);
        if m.score > self.threshold {
            tracing::debug!("🔎 Match #{} (score {:.3})", m.index, m.score);
            Some(Retrieved {
                index: m.index,
                document: &self.documents[m.index],
                score: m.score,
            })
        } else {
            tracing::debug!("🔎 No relevant context (best score {:.3})", m.score);
            None
        }
    }

    /// Context string for a prompt: the matched document, or empty.
    pub fn context_for(&self, query: &str) -> &str {
        self.retrieve(query).map(|r| r.document).unwrap_or("")
    }

    pub fn document(&self, index: usize) -> Option<&str> {
        self.documents.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// (documents, vocabulary terms)
    pub fn stats(&self) -> (usize, usize) {
        (self.index.len(), self.index.vocabulary_len())
    }
}
