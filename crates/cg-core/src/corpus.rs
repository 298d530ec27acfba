//! Document chunks produced by the offline ingestion job

use serde::{Deserialize, Serialize};

/// Structural metadata attached to a chunk at ingestion time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub chunk_id: u64,
}

impl ChunkMetadata {
    /// Human-readable section reference built from whichever of chapter, article
    /// and section are present. `None` when the chunk carries none of them.
    pub fn section_reference(&self) -> Option<String> {
        let labels: Vec<&str> = [&self.chapter, &self.article, &self.section]
            .into_iter()
            .filter_map(|label| label.as_deref())
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .collect();

        if labels.is_empty() {
            None
        } else {
            Some(labels.join(" > "))
        }
    }
}

/// A contiguous passage of the corpus. Immutable once the corpus is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    pub fn new(content: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}
