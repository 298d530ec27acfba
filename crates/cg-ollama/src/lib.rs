//! Ollama integration for CampusGuide
//!
//! This crate provides the Ollama implementation of the LLMProvider trait.

mod client;
mod config;


pub use client::OllamaClient;
pub use config::OllamaConfig;

// Re-export core types for convenience
pub use cg_core::{LLMProvider, GenerationConfig, GenerationResult, Error, Result};
