//! Corpus sources consumed at load time

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use cg_core::{DocumentChunk, Error, Result};

/// Where the offline-built corpus comes from
#[async_trait]
pub trait CorpusSource: Send + Sync {
    /// Read every chunk of the corpus
    async fn load_chunks(&self) -> Result<Vec<DocumentChunk>>;

    /// Short description for logs and stats
    fn describe(&self) -> String;
}

/// Accepts either a bare chunk array or `{"chunks": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusFile {
    Bare(Vec<DocumentChunk>),
    Wrapped { chunks: Vec<DocumentChunk> },
}

/// Corpus stored as a JSON file produced by the ingestion job
pub struct JsonFileCorpus {
    path: PathBuf,
}

impl JsonFileCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CorpusSource for JsonFileCorpus {
    async fn load_chunks(&self) -> Result<Vec<DocumentChunk>> {
        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            Error::Corpus(format!("cannot read corpus file {}: {}", self.path.display(), e))
        })?;

        let file: CorpusFile = serde_json::from_str(&content).map_err(|e| {
            Error::Corpus(format!("cannot parse corpus file {}: {}", self.path.display(), e))
        })?;

        Ok(match file {
            CorpusFile::Bare(chunks) | CorpusFile::Wrapped { chunks } => chunks,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Corpus held in memory, used for tests and embedded demos
pub struct InMemoryCorpus {
    chunks: Vec<DocumentChunk>,
}

impl InMemoryCorpus {
    pub fn new(chunks: Vec<DocumentChunk>) -> Self {
        Self { chunks }
    }
}

#[async_trait]
impl CorpusSource for InMemoryCorpus {
    async fn load_chunks(&self) -> Result<Vec<DocumentChunk>> {
        Ok(self.chunks.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory ({} chunks)", self.chunks.len())
    }
}
