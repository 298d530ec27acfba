//! Handbook retrieval engine for CampusGuide
//!
//! This crate provides the text normalizer, the TF-IDF corpus index, corpus
//! sources and the corpus-backed implementation of the KnowledgeBase trait.

pub mod normalizer;
mod index;
mod source;
mod config;
mod engine;

#[cfg(test)]
mod tests;

pub use normalizer::{normalize, TextNormalizer, PROTECTED_ACRONYMS};
pub use index::{CorpusIndex, SparseVector, tokenize};
pub use source::{CorpusSource, JsonFileCorpus, InMemoryCorpus};
pub use config::RetrievalConfig;
pub use engine::CorpusKnowledgeBase;

// Re-export core types for convenience
pub use cg_core::{
    KnowledgeBase, Retrieval, RetrievalQuery, ScoredChunk,
    DocumentChunk, ChunkMetadata, ReadinessState,
    Error, Result,
};
