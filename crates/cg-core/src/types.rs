//! Common types used across the CampusGuide system

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ChunkMetadata;

/// Maximum characters of chunk content echoed back as a source snippet
pub const SOURCE_SNIPPET_CHARS: usize = 200;

/// Process-wide readiness of the corpus index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadinessState {
    NotLoaded,
    Ready,
    Error,
}

/// Readiness as reported upward to the API layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Ready,
    Initializing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: HealthState,
}

impl From<ReadinessState> for HealthStatus {
    fn from(state: ReadinessState) -> Self {
        let status = match state {
            ReadinessState::Ready => HealthState::Ready,
            ReadinessState::NotLoaded | ReadinessState::Error => HealthState::Initializing,
        };
        Self { status }
    }
}

/// Coarse query type, decided by first-match priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    #[default]
    General,
    Location,
    Procedure,
    Policy,
}

/// Topical category used to tailor generation instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    Academic,
    Administrative,
    StudentLife,
    Facilities,
}

impl FocusArea {
    pub fn label(&self) -> &'static str {
        match self {
            FocusArea::Academic => "academic",
            FocusArea::Administrative => "administrative",
            FocusArea::StudentLife => "student life",
            FocusArea::Facilities => "facilities",
        }
    }
}

/// Per-request intent classification; never persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentResult {
    pub query_type: QueryType,
    pub focus_areas: BTreeSet<FocusArea>,
}

/// Inbound request from the API layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// Passage echoed back to the caller for attribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSnippet {
    pub content: String,
    pub metadata: ChunkMetadata,
}

impl SourceSnippet {
    pub fn from_chunk(chunk: &crate::DocumentChunk) -> Self {
        let content = if chunk.content.chars().count() > SOURCE_SNIPPET_CHARS {
            let truncated: String = chunk.content.chars().take(SOURCE_SNIPPET_CHARS).collect();
            format!("{}...", truncated)
        } else {
            chunk.content.clone()
        };

        Self {
            content,
            metadata: chunk.metadata.clone(),
        }
    }
}

/// Outbound response to the API layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub sources: Vec<SourceSnippet>,
}
