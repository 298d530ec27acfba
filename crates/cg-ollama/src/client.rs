//! Ollama client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use cg_core::{LLMProvider, GenerationConfig, GenerationResult, Error, Result};

use crate::config::OllamaConfig;

/// Ollama client
pub struct OllamaClient {
    config: OllamaConfig,
    client: Client,
    current_model: String,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl OllamaClient {
    /// Prefixes some models echo back before the actual answer
    const ECHOED_PREFIXES: [&'static str; 3] = ["ASSISTANT:", "Assistant:", "Answer:"];

    /// Create a new Ollama client from configuration
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.health_timeout_secs.max(1)))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        let current_model = config.model.clone();

        Ok(Self {
            config,
            client,
            current_model,
        })
    }

    /// Create a new Ollama client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = OllamaConfig::from_env()?;
        Self::new(config)
    }

    /// Set the model to use for generation
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.current_model = model_id.into();
        self
    }

    /// Generation settings derived from the client configuration
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            model_id: self.current_model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature as f32),
            timeout: Duration::from_secs(self.config.generation_timeout_secs),
            ..Default::default()
        }
    }

    /// Perform the actual generation request
    async fn perform_generation(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<(String, Option<u32>)> {
        let request_body = GenerateRequest {
            model: &config.model_id,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: config.max_tokens,
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
                stop: config.stop_sequences.clone(),
            },
        };

        let url = format!("{}/api/generate", self.config.host);

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::LLMProvider(format!(
                "Ollama request failed with status {}: {}",
                status, error_text
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let answer = Self::clean_response(&body.response);
        if answer.is_empty() {
            return Err(Error::LLMProvider("Empty response from Ollama".to_string()));
        }

        Ok((answer, body.eval_count))
    }

    /// Strip whitespace and any role prefix the model echoed from the prompt
    pub fn clean_response(raw: &str) -> String {
        let mut cleaned = raw.trim();

        if let Some(pos) = cleaned.rfind("ASSISTANT:") {
            cleaned = cleaned[pos + "ASSISTANT:".len()..].trim();
        }

        for prefix in Self::ECHOED_PREFIXES {
            if let Some(rest) = cleaned.strip_prefix(prefix) {
                cleaned = rest.trim();
            }
        }

        cleaned.to_string()
    }
}

#[async_trait]
impl LLMProvider for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let config = self.generation_config();
        self.generate_with_config(prompt, &config).await
    }

    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let generation_future = self.perform_generation(prompt, config);

        let (text, tokens_used) = match timeout(config.timeout, generation_future).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(timeout_secs = config.timeout.as_secs_f32(), "generation timed out");
                return Err(Error::Timeout("Request timed out".to_string()));
            }
        };

        debug!(model = %config.model_id, chars = text.len(), "generation complete");

        Ok(GenerationResult {
            text,
            model_id: config.model_id.clone(),
            tokens_used,
        })
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.config.host);
        let probe = self.client.get(&url).send();

        match timeout(Duration::from_secs(self.config.health_timeout_secs), probe).await {
            Ok(Ok(response)) => response.status().is_success(),
            Ok(Err(e)) => {
                debug!(error = %e, "model health probe failed");
                false
            }
            Err(_) => {
                debug!("model health probe timed out");
                false
            }
        }
    }

    fn model_id(&self) -> &str {
        &self.current_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_response() {
        assert_eq!(OllamaClient::clean_response("  The library opens at 8.  "), "The library opens at 8.");
        assert_eq!(
            OllamaClient::clean_response("USER: when?\n\nASSISTANT: At 8 AM."),
            "At 8 AM."
        );
        assert_eq!(OllamaClient::clean_response("Answer: Bring your ID."), "Bring your ID.");
        assert_eq!(OllamaClient::clean_response("   "), "");
    }

    #[test]
    fn test_generation_config_follows_client_config() {
        let mut config = OllamaConfig::new("http://ollama.local:11434/", "llama3");
        config.generation_timeout_secs = 12;
        let client = OllamaClient::new(config).unwrap();

        let generation = client.generation_config();
        assert_eq!(generation.model_id, "llama3");
        assert_eq!(generation.timeout, Duration::from_secs(12));

        let client = client.with_model("mistral");
        assert_eq!(client.model_id(), "mistral");
    }
}
