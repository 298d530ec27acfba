//! Term-weighted corpus index
//!
//! Smoothed TF-IDF (`idf = ln((1 + n) / (1 + df)) + 1`) over normalized chunk
//! text, with every chunk vector L2-normalized so cosine similarity reduces to
//! a sparse dot product.

use std::collections::{HashMap, HashSet};

use cg_core::{DocumentChunk, Error, Result};

use crate::normalizer::normalize;

/// Sparse vector as (term index, weight), sorted by term index
pub type SparseVector = Vec<(usize, f64)>;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "do", "does", "for", "from",
    "how", "i", "in", "is", "it", "me", "my", "of", "on", "or", "that", "the", "this",
    "to", "was", "what", "when", "where", "which", "who", "will", "with", "you", "your",
];

/// Fitted term-weighting model plus the chunk-by-term weight matrix
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    chunks: Vec<DocumentChunk>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    vectors: Vec<SparseVector>,
}

impl CorpusIndex {
    /// Fit the model over the corpus and weight every chunk
    pub fn build(chunks: Vec<DocumentChunk>) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::Corpus("corpus contains no chunks".to_string()));
        }

        let tokenized: Vec<Vec<String>> = chunks
            .iter()
            .map(|chunk| tokenize(&normalize(&chunk.content)))
            .collect();

        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();

        for tokens in &tokenized {
            let unique: HashSet<&String> = tokens.iter().collect();
            // Sorted so term ids do not depend on hash iteration order.
            let mut unique: Vec<&String> = unique.into_iter().collect();
            unique.sort();

            for term in unique {
                let next_id = vocabulary.len();
                let id = *vocabulary.entry(term.clone()).or_insert(next_id);
                if id == document_frequency.len() {
                    document_frequency.push(0);
                }
                document_frequency[id] += 1;
            }
        }

        if vocabulary.is_empty() {
            return Err(Error::Corpus("corpus has no indexable terms".to_string()));
        }

        let n_docs = chunks.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let vectors = tokenized
            .iter()
            .map(|tokens| weigh(tokens, &vocabulary, &idf))
            .collect();

        Ok(Self {
            chunks,
            vocabulary,
            idf,
            vectors,
        })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn chunks(&self) -> &[DocumentChunk] {
        &self.chunks
    }

    pub fn chunk(&self, index: usize) -> Option<&DocumentChunk> {
        self.chunks.get(index)
    }

    /// Project raw query text into the corpus term space. Unknown terms are dropped.
    pub fn project(&self, query: &str) -> SparseVector {
        let tokens = tokenize(&normalize(query));
        weigh(&tokens, &self.vocabulary, &self.idf)
    }

    /// Cosine similarity of the query against every chunk, in corpus order
    pub fn similarities(&self, query: &str) -> Vec<f64> {
        let projected = self.project(query);
        self.vectors
            .iter()
            .map(|vector| dot(&projected, vector))
            .collect()
    }

    /// The `k` highest-scoring chunk indices, best first. Ties keep corpus order.
    pub fn top_k(&self, query: &str, k: usize) -> Vec<(usize, f64)> {
        let mut scored: Vec<(usize, f64)> = self.similarities(query).into_iter().enumerate().collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);
        scored
    }
}

/// Split normalized text into index terms
pub fn tokenize(normalized: &str) -> Vec<String> {
    normalized
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|token| token.chars().count() >= 2 && !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

fn weigh(tokens: &[String], vocabulary: &HashMap<String, usize>, idf: &[f64]) -> SparseVector {
    let mut counts: HashMap<usize, f64> = HashMap::new();
    for token in tokens {
        if let Some(&id) = vocabulary.get(token) {
            *counts.entry(id).or_insert(0.0) += 1.0;
        }
    }

    let mut vector: SparseVector = counts
        .into_iter()
        .map(|(id, tf)| (id, tf * idf[id]))
        .collect();
    vector.sort_by_key(|(id, _)| *id);

    let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > f64::EPSILON {
        for (_, weight) in vector.iter_mut() {
            *weight /= norm;
        }
    }

    vector
}

/// Dot product of two sorted sparse vectors
fn dot(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
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
