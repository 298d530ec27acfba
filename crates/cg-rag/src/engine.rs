//! Knowledge base service owning the corpus index

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use cg_core::{
    KnowledgeBase, ReadinessState, Retrieval, RetrievalQuery, ScoredChunk,
    Error, Result,
};

use crate::config::RetrievalConfig;
use crate::index::CorpusIndex;
use crate::source::{CorpusSource, JsonFileCorpus};

/// Corpus-backed knowledge base with an explicit load/reload lifecycle
///
/// The built index sits behind an `Arc` and is never mutated, so concurrent
/// retrievals only take a read lock long enough to clone the pointer. Loads are
/// serialized through `load_lock`.
pub struct CorpusKnowledgeBase<S: CorpusSource> {
    source: S,
    config: RetrievalConfig,
    index: RwLock<Option<Arc<CorpusIndex>>>,
    state: RwLock<ReadinessState>,
    load_lock: Mutex<()>,
    load_attempts: AtomicUsize,
}

impl CorpusKnowledgeBase<JsonFileCorpus> {
    /// Knowledge base reading the corpus file named in the configuration
    pub fn from_config(config: RetrievalConfig) -> Self {
        let source = JsonFileCorpus::new(config.corpus_path.clone());
        Self::new(source, config)
    }
}

impl<S: CorpusSource> CorpusKnowledgeBase<S> {
    /// Create an unloaded knowledge base
    pub fn new(source: S, config: RetrievalConfig) -> Self {
        Self {
            source,
            config,
            index: RwLock::new(None),
            state: RwLock::new(ReadinessState::NotLoaded),
            load_lock: Mutex::new(()),
            load_attempts: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Number of load attempts made so far
    pub fn load_attempts(&self) -> usize {
        self.load_attempts.load(Ordering::SeqCst)
    }

    /// Build and publish a fresh index. Caller must hold `load_lock`.
    async fn rebuild(&self) -> Result<()> {
        self.load_attempts.fetch_add(1, Ordering::SeqCst);
        let corpus = self.source.describe();

        let built = match self.source.load_chunks().await {
            Ok(chunks) => CorpusIndex::build(chunks),
            Err(e) => Err(e),
        };

        match built {
            Ok(index) => {
                info!(
                    corpus = %corpus,
                    chunks = index.len(),
                    vocabulary = index.vocabulary_size(),
                    "corpus index loaded"
                );
                *self.index.write() = Some(Arc::new(index));
                *self.state.write() = ReadinessState::Ready;
                Ok(())
            }
            Err(e) => {
                error!(corpus = %corpus, error = %e, "corpus load failed");
                *self.index.write() = None;
                *self.state.write() = ReadinessState::Error;
                Err(e)
            }
        }
    }

    fn current_index(&self) -> Result<Arc<CorpusIndex>> {
        if *self.state.read() != ReadinessState::Ready {
            return Err(Error::NotReady("corpus index is not loaded".to_string()));
        }
        self.index
            .read()
            .clone()
            .ok_or_else(|| Error::NotReady("corpus index is not loaded".to_string()))
    }
}

#[async_trait]
impl<S: CorpusSource + 'static> KnowledgeBase for CorpusKnowledgeBase<S> {
    async fn load(&self) -> Result<()> {
        let _guard = self.load_lock.lock().await;
        self.rebuild().await
    }

    async fn reload(&self) -> Result<()> {
        let _guard = self.load_lock.lock().await;
        self.rebuild().await
    }

    async fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }

        let _guard = self.load_lock.lock().await;
        // Another request may have finished a reload while we waited.
        if self.is_ready() {
            return Ok(());
        }
        self.rebuild().await
    }

    fn readiness(&self) -> ReadinessState {
        *self.state.read()
    }

    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Retrieval> {
        let index = self.current_index()?;
        let threshold = query.score_threshold.unwrap_or(self.config.relevance_threshold);

        let hits = index.top_k(&query.query, query.top_k);
        let best_score = hits.first().map(|(_, score)| *score).unwrap_or(0.0);

        if !(best_score > threshold) {
            debug!(best_score, threshold, "no chunk cleared the relevance threshold");
            return Ok(Retrieval::NoRelevantContent { best_score });
        }

        let mut chunks = Vec::new();
        let mut section_refs: Vec<String> = Vec::new();

        for (position, score) in hits.into_iter().filter(|(_, score)| *score > threshold) {
            let chunk = index
                .chunk(position)
                .cloned()
                .ok_or_else(|| Error::Retrieval(format!("index has no chunk at {}", position)))?;

            if let Some(reference) = chunk.metadata.section_reference() {
                if !section_refs.contains(&reference) {
                    section_refs.push(reference);
                }
            }

            chunks.push(ScoredChunk { chunk, score });
        }

        debug!(best_score, returned = chunks.len(), "retrieval complete");

        Ok(Retrieval::Found {
            chunks,
            section_refs,
        })
    }

    async fn stats(&self) -> Result<serde_json::Value> {
        let index = self.index.read().clone();

        Ok(json!({
            "readiness": self.readiness(),
            "corpus": self.source.describe(),
            "chunks": index.as_ref().map_or(0, |i| i.len()),
            "vocabulary_size": index.as_ref().map_or(0, |i| i.vocabulary_size()),
            "load_attempts": self.load_attempts(),
            "top_k": self.config.top_k,
            "relevance_threshold": self.config.relevance_threshold,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryCorpus;
    use cg_core::{ChunkMetadata, DocumentChunk};

    fn handbook() -> Vec<DocumentChunk> {
        vec![
            DocumentChunk::new(
                "The grading system uses a scale from 1.0 (highest) to 5.0 (failed). A final grade of 3.0 is the passing mark.",
                ChunkMetadata {
                    source: "USTP Student Handbook 2021".to_string(),
                    chapter: Some("Chapter 4. Academic Policies".to_string()),
                    article: Some("Art. 12. Grading System".to_string()),
                    section: None,
                    chunk_id: 0,
                },
            ),
            DocumentChunk::new(
                "Incomplete grades must be completed within one academic year or the grade becomes failing.",
                ChunkMetadata {
                    source: "USTP Student Handbook 2021".to_string(),
                    chapter: Some("Chapter 4. Academic Policies".to_string()),
                    article: Some("Art. 12. Grading System".to_string()),
                    section: None,
                    chunk_id: 1,
                },
            ),
            DocumentChunk::new(
                "Students shall wear the prescribed uniform from Monday to Thursday.",
                ChunkMetadata {
                    source: "USTP Student Handbook 2021".to_string(),
                    chunk_id: 2,
                    ..Default::default()
                },
            ),
        ]
    }

    #[tokio::test]
    async fn test_retrieve_requires_ready_state() {
        let kb = CorpusKnowledgeBase::new(InMemoryCorpus::new(handbook()), RetrievalConfig::default());
        assert_eq!(kb.readiness(), ReadinessState::NotLoaded);

        let err = kb.retrieve(&RetrievalQuery::new("grading", 3)).await.unwrap_err();
        assert!(matches!(err, Error::NotReady(_)));

        kb.load().await.unwrap();
        assert!(kb.is_ready());
        assert!(kb.retrieve(&RetrievalQuery::new("grading", 3)).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_load_sets_error_state() {
        let kb = CorpusKnowledgeBase::new(InMemoryCorpus::new(vec![]), RetrievalConfig::default());
        assert!(kb.load().await.is_err());
        assert_eq!(kb.readiness(), ReadinessState::Error);

        let err = kb.retrieve(&RetrievalQuery::new("grading", 3)).await.unwrap_err();
        assert!(matches!(err, Error::NotReady(_)));
    }

    #[tokio::test]
    async fn test_found_results_carry_deduplicated_section_refs() {
        let kb = CorpusKnowledgeBase::new(InMemoryCorpus::new(handbook()), RetrievalConfig::default());
        kb.load().await.unwrap();

        let retrieval = kb.retrieve(&RetrievalQuery::new("What is the grading system?", 5)).await.unwrap();
        let Retrieval::Found { chunks, section_refs } = retrieval else {
            panic!("expected relevant content");
        };

        assert_eq!(chunks[0].chunk.metadata.chunk_id, 0);
        assert!(chunks.iter().all(|c| c.score > 0.05));
        assert_eq!(
            section_refs,
            vec!["Chapter 4. Academic Policies > Art. 12. Grading System".to_string()]
        );
    }

    #[tokio::test]
    async fn test_score_exactly_at_threshold_is_a_miss() {
        let kb = CorpusKnowledgeBase::new(InMemoryCorpus::new(handbook()), RetrievalConfig::default());
        kb.load().await.unwrap();

        let query = "prescribed uniform";
        let mut probe = RetrievalQuery::new(query, 1);
        probe.score_threshold = Some(0.0);
        let best = kb.retrieve(&probe).await.unwrap().chunks()[0].score;
        assert!(best > 0.0);

        let mut at_boundary = RetrievalQuery::new(query, 1);
        at_boundary.score_threshold = Some(best);
        let retrieval = kb.retrieve(&at_boundary).await.unwrap();
        assert!(retrieval.is_miss());

        let mut just_below = RetrievalQuery::new(query, 1);
        just_below.score_threshold = Some(best - 1e-9);
        assert!(!kb.retrieve(&just_below).await.unwrap().is_miss());
    }

    #[tokio::test]
    async fn test_concurrent_ensure_ready_loads_once() {
        let kb = Arc::new(CorpusKnowledgeBase::new(
            InMemoryCorpus::new(handbook()),
            RetrievalConfig::default(),
        ));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let kb = kb.clone();
                tokio::spawn(async move { kb.ensure_ready().await })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(kb.load_attempts(), 1);
        assert!(kb.is_ready());
    }
}
