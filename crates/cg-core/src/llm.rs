//! LLM provider trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Result;

/// Configuration for text generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub stop_sequences: Vec<String>,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: "mistral".to_string(),
            max_tokens: 512,
            temperature: Some(0.3),
            top_p: Some(0.95),
            top_k: Some(50),
            stop_sequences: vec![
                "USER:".to_string(),
                "QUESTION:".to_string(),
            ],
            timeout: Duration::from_secs(30),
        }
    }
}

/// Result of a text generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub model_id: String,
    pub tokens_used: Option<u32>,
}

/// Trait for generative model services (e.g., Ollama)
///
/// The model is a black box reached over the network: one bounded generation call
/// and an independent, cheap liveness probe used to decide on fallback before
/// paying for a full generation.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate text using the provider's default configuration
    async fn generate(&self, prompt: &str) -> Result<GenerationResult>;

    /// Generate text with custom configuration. Exceeding `config.timeout` yields
    /// `Error::Timeout`.
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult>;

    /// Lightweight liveness probe; never fails, reports reachability only
    async fn health_check(&self) -> bool;

    /// Get the model ID being used
    fn model_id(&self) -> &str;
}
