//! Ollama configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use cg_core::{Error, Result};

/// Configuration for the Ollama client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
    pub generation_timeout_secs: u64,
    pub health_timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl OllamaConfig {
    pub const DEFAULT_HOST: &'static str = "http://localhost:11434";
    pub const DEFAULT_MODEL: &'static str = "mistral";

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("OLLAMA_HOST")
            .map(|host| host.trim_end_matches('/').to_string())
            .unwrap_or(defaults.host);

        let model = lookup("OLLAMA_MODEL").unwrap_or(defaults.model);

        Ok(Self {
            host,
            model,
            generation_timeout_secs: parse_or(&lookup, "GENERATION_TIMEOUT_SECS", defaults.generation_timeout_secs)?,
            health_timeout_secs: parse_or(&lookup, "HEALTH_TIMEOUT_SECS", defaults.health_timeout_secs)?,
            max_tokens: parse_or(&lookup, "GENERATION_MAX_TOKENS", defaults.max_tokens)?,
            temperature: parse_or(&lookup, "GENERATION_TEMPERATURE", defaults.temperature)?,
        })
    }

    /// Create configuration with explicit host and model
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_string(),
            model: model.into(),
            ..Self::default()
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            generation_timeout_secs: 30,
            health_timeout_secs: 3,
            max_tokens: 512,
            temperature: 0.3,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            Error::Configuration(format!("{} has an invalid value: {}", key, raw))
        }),
        None => Ok(default),
    }
}
