//! Router configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Optional replacements for the built-in routing data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterConfig {
    /// JSON file replacing the built-in knowledge tables
    pub knowledge_tables_path: Option<PathBuf>,
    /// JSON array of location entries merged over the directory
    pub location_overrides_path: Option<PathBuf>,
}

impl RouterConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup; blank values are ignored
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };

        Self {
            knowledge_tables_path: path("KNOWLEDGE_TABLES_PATH"),
            location_overrides_path: path("LOCATION_OVERRIDES_PATH"),
        }
    }
}
