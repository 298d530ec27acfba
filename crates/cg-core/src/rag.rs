//! Knowledge base trait and retrieval types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{DocumentChunk, ReadinessState, Result};

/// Query for corpus retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalQuery {
    pub query: String,
    pub top_k: usize,
    /// Overrides the knowledge base's configured relevance threshold
    pub score_threshold: Option<f64>,
}

impl RetrievalQuery {
    pub fn new(query: impl Into<String>, top_k: usize) -> Self {
        Self {
            query: query.into(),
            top_k,
            score_threshold: None,
        }
    }
}

/// A chunk paired with its cosine similarity to the query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f64,
}

/// Outcome of a retrieval. A miss is a value, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Retrieval {
    /// Top-K chunks in descending score order with their section references
    Found {
        chunks: Vec<ScoredChunk>,
        section_refs: Vec<String>,
    },
    /// The best score did not clear the relevance threshold
    NoRelevantContent { best_score: f64 },
}

impl Retrieval {
    pub fn chunks(&self) -> &[ScoredChunk] {
        match self {
            Retrieval::Found { chunks, .. } => chunks,
            Retrieval::NoRelevantContent { .. } => &[],
        }
    }

    pub fn section_refs(&self) -> &[String] {
        match self {
            Retrieval::Found { section_refs, .. } => section_refs,
            Retrieval::NoRelevantContent { .. } => &[],
        }
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, Retrieval::NoRelevantContent { .. })
    }
}

/// Trait for the service object that owns the corpus index
///
/// The index is built by `load`, read-only afterwards, and rebuilt by `reload`.
/// Implementations serialize load attempts and must refuse `retrieve` unless the
/// readiness state is `Ready`.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Build the index from the corpus source
    async fn load(&self) -> Result<()>;

    /// Rebuild the index, e.g. after a failed startup load
    async fn reload(&self) -> Result<()>;

    /// Current readiness state
    fn readiness(&self) -> ReadinessState;

    /// Check if retrieval may run
    fn is_ready(&self) -> bool {
        self.readiness() == ReadinessState::Ready
    }

    /// Make at most one reload attempt when not ready
    async fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }
        self.reload().await
    }

    /// Retrieve the most similar chunks for a query
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Retrieval>;

    /// Get statistics about the knowledge base
    async fn stats(&self) -> Result<serde_json::Value>;
}
