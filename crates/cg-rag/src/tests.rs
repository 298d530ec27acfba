//! Snapshot tests for retrieval components

#[cfg(test)]
mod snapshot_tests {
    use crate::{
        ChunkMetadata, CorpusKnowledgeBase, DocumentChunk, Error, InMemoryCorpus, JsonFileCorpus,
        KnowledgeBase, ReadinessState, RetrievalConfig, RetrievalQuery, CorpusSource,
    };
    use insta::assert_yaml_snapshot;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CORPUS_JSON: &str = r#"[
        {
            "content": "The University Library is open from 7:30 AM to 7:00 PM, Monday to Saturday.",
            "metadata": {"source": "USTP Student Handbook 2021", "chapter": "Chapter 7. Student Services", "chunk_id": 0}
        },
        {
            "content": "A student who incurs absences of more than 20% of the required hours shall be dropped from the class.",
            "metadata": {"source": "USTP Student Handbook 2021", "article": "Art. 9. Attendance", "chunk_id": 1}
        }
    ]"#;

    fn corpus_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_snapshot() {
        assert_yaml_snapshot!(RetrievalConfig::default(), @r###"
        corpus_path: data/corpus.json
        top_k: 5
        relevance_threshold: 0.05
        "###);
    }

    #[test]
    fn test_config_from_lookup_validates_values() {
        let vars: HashMap<&str, &str> = [("RETRIEVAL_TOP_K", "6"), ("RELEVANCE_THRESHOLD", "0.03")]
            .into_iter()
            .collect();
        let config = RetrievalConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.top_k, 6);
        assert_eq!(config.relevance_threshold, 0.03);

        let zero_k = RetrievalConfig::from_lookup(|key| (key == "RETRIEVAL_TOP_K").then(|| "0".to_string()));
        assert!(matches!(zero_k, Err(Error::Configuration(_))));

        let bad_threshold =
            RetrievalConfig::from_lookup(|key| (key == "RELEVANCE_THRESHOLD").then(|| "1.5".to_string()));
        assert!(matches!(bad_threshold, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn test_json_corpus_formats() {
        let bare = corpus_file(CORPUS_JSON);
        let chunks = JsonFileCorpus::new(bare.path()).load_chunks().await.unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].metadata.article.as_deref(), Some("Art. 9. Attendance"));

        let wrapped = corpus_file(&format!(r#"{{"chunks": {}}}"#, CORPUS_JSON));
        let chunks = JsonFileCorpus::new(wrapped.path()).load_chunks().await.unwrap();
        assert_eq!(chunks.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_corpus_then_recovery_via_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        let config = RetrievalConfig {
            corpus_path: path.clone(),
            ..Default::default()
        };
        let kb = CorpusKnowledgeBase::from_config(config);

        let err = kb.load().await.unwrap_err();
        assert!(matches!(err, Error::Corpus(_)));
        assert_eq!(kb.readiness(), ReadinessState::Error);

        std::fs::write(&path, CORPUS_JSON).unwrap();
        kb.ensure_ready().await.unwrap();
        assert_eq!(kb.readiness(), ReadinessState::Ready);
        assert_eq!(kb.load_attempts(), 2);

        let retrieval = kb
            .retrieve(&RetrievalQuery::new("library saturday", 5))
            .await
            .unwrap();
        assert_eq!(retrieval.chunks()[0].chunk.metadata.chunk_id, 0);
        assert_eq!(retrieval.section_refs(), ["Chapter 7. Student Services".to_string()]);
    }

    #[tokio::test]
    async fn test_unparsable_corpus_is_corpus_error() {
        let file = corpus_file("{ not json");
        let err = JsonFileCorpus::new(file.path()).load_chunks().await.unwrap_err();
        assert!(matches!(err, Error::Corpus(_)));
    }

    #[tokio::test]
    async fn test_stats() {
        let chunk = DocumentChunk::new(
            "Clinic services are free for enrolled students.",
            ChunkMetadata {
                source: "handbook".to_string(),
                chunk_id: 0,
                ..Default::default()
            },
        );
        let kb = CorpusKnowledgeBase::new(InMemoryCorpus::new(vec![chunk]), RetrievalConfig::default());

        let before = kb.stats().await.unwrap();
        assert_eq!(before["readiness"], "NOT_LOADED");
        assert_eq!(before["chunks"], 0);

        kb.load().await.unwrap();
        let after = kb.stats().await.unwrap();
        assert_eq!(after["readiness"], "READY");
        assert_eq!(after["chunks"], 1);
        assert_eq!(after["vocabulary_size"], 5);
        assert_eq!(after["corpus"], "in-memory (1 chunks)");
    }
}
