//! Retrieval configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use cg_core::{Error, Result};

/// Configuration for corpus loading and retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub corpus_path: PathBuf,
    pub top_k: usize,
    /// A chunk is usable only when its score is strictly above this value
    pub relevance_threshold: f64,
}

impl RetrievalConfig {
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

        let corpus_path = lookup("CORPUS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.corpus_path);

        let top_k = match lookup("RETRIEVAL_TOP_K") {
            Some(raw) => raw.trim().parse::<usize>().ok().filter(|k| *k > 0).ok_or_else(|| {
                Error::Configuration(format!("RETRIEVAL_TOP_K must be a positive integer, got {}", raw))
            })?,
            None => defaults.top_k,
        };

        let relevance_threshold = match lookup("RELEVANCE_THRESHOLD") {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|t| (0.0..=1.0).contains(t))
                .ok_or_else(|| {
                    Error::Configuration(format!("RELEVANCE_THRESHOLD must be within [0, 1], got {}", raw))
                })?,
            None => defaults.relevance_threshold,
        };

        Ok(Self {
            corpus_path,
            top_k,
            relevance_threshold,
        })
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("data/corpus.json"),
            top_k: 5,
            relevance_threshold: 0.05,
        }
    }
}
