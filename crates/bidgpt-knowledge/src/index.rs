//! TF-IDF vector space with cosine-similarity lookup.
//!
//! Weights follow the usual smoothed formulation:
//! - tf  = raw term count in the document
//! - idf = ln((1 + n) / (1 + df)) + 1
//! - every vector is L2-normalised, so cosine similarity is a dot product.
//!
//! The index is fitted once and never mutated afterwards.

use std::collections::{BTreeSet, HashMap};

use bidgpt_core::error::{BidGptError, Result};

use crate::tokenizer::tokenize;

/// Sparse vector: (dimension, weight) pairs sorted by dimension.
type SparseVector = Vec<(usize, f64)>;

/// Best document for a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub index: usize,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct TfIdfIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    vectors: Vec<SparseVector>,
}

impl TfIdfIndex {
    /// Fit the vector space over `documents`, in order.
    ///
    /// Fails when there are no documents or when none of them contain a
    /// single indexable term.
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Result<Self> {
        if documents.is_empty() {
            return Err(BidGptError::Load(
                "cannot build an index from an empty knowledge base".into(),
            ));
        }

        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|d| tokenize(d.as_ref()))
            .collect();

        let terms: BTreeSet<&str> = tokenized
            .iter()
            .flat_map(|doc| doc.iter().map(String::as_str))
            .collect();
        if terms.is_empty() {
            return Err(BidGptError::Load(
                "knowledge base contains no indexable terms".into(),
            ));
        }

        let vocabulary: HashMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(dim, term)| (term.to_string(), dim))
            .collect();

        let mut df = vec![0usize; vocabulary.len()];
        for doc in &tokenized {
            let unique: BTreeSet<usize> = doc.iter().map(|t| vocabulary[t]).collect();
            for dim in unique {
                df[dim] += 1;
            }
        }

        let n = documents.len() as f64;
        let idf = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let mut index = Self {
            vocabulary,
            idf,
            vectors: Vec::with_capacity(tokenized.len()),
        };
        let vectors = tokenized.iter().map(|doc| index.weigh(doc)).collect();
        index.vectors = vectors;
        Ok(index)
    }

    /// Number of document vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    /// Cosine similarity of `text` against every document, in document order.
    pub fn scores(&self, text: &str) -> Vec<f64> {
        let query = self.weigh(&tokenize(text));
        self.vectors.iter().map(|doc| dot(&query, doc)).collect()
    }

    /// Highest-scoring document. Ties go to the lowest index; a query with no
    /// known terms scores 0 everywhere and resolves to index 0.
    pub fn query(&self, text: &str) -> Match {
        self.scores(text).into_iter().enumerate().fold(
            Match {
                index: 0,
                score: f64::NEG_INFINITY,
            },
            |best, (index, score)| {
                if score > best.score {
                    Match { index, score }
                } else {
                    best
                }
            },
        )
    }

    /// TF-IDF weights for a term list, L2-normalised. Unknown terms are skipped.
    fn weigh(&self, terms: &[String]) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in terms {
            if let Some(&dim) = self.vocabulary.get(term) {
                *counts.entry(dim).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(dim, tf)| (dim, tf * self.idf[dim]))
            .collect();
        vector.sort_unstable_by_key(|&(dim, _)| dim);

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut vector {
                *w /= norm;
            }
        }
        vector
    }
}

/// Dot product of two sorted sparse vectors.
fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}
