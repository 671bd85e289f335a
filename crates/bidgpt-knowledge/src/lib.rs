//! # BidGPT Knowledge Base
//!
//! Ultra-lightweight retrieval over a flat text file. No vector DB, no
//! embeddings: one document per line, a TF-IDF vector space fitted once at
//! startup, cosine similarity at query time.
//!
//! ## How it works
//! ```text
//! User: "When is the tender deadline?"
//!   ↓
//! KnowledgeStore.retrieve(query)
//!   ↓ TF-IDF + cosine, best score > 0.2
//! "Tenders must be submitted by 5pm."
//!   ↓
//! Injected into the system prompt as "Knowledge base: ..."
//! ```

pub mod index;
pub mod loader;
pub mod store;
pub mod tokenizer;

pub use index::{Match, TfIdfIndex};
pub use store::{KnowledgeStore, Retrieved};
