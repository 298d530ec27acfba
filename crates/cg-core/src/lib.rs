//! Core traits and types for CampusGuide
//!
//! This crate defines the data model and capability-facing interfaces shared by the
//! assistant: the generative model provider, the knowledge base that owns the corpus
//! index, and the request/response shapes exchanged with the outer API layer.

pub mod llm;
pub mod rag;
pub mod corpus;
pub mod error;
pub mod types;


pub use error::{Error, Result};
pub use llm::{LLMProvider, GenerationConfig, GenerationResult};
pub use rag::{KnowledgeBase, Retrieval, RetrievalQuery, ScoredChunk};
pub use corpus::{DocumentChunk, ChunkMetadata};
pub use types::*;
