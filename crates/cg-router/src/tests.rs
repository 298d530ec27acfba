//! Routing tests over the built-in knowledge tables

#[cfg(test)]
mod snapshot_tests {
    use crate::{
        FixedClock, FixedSelector, KnowledgeTables, LocationEntry, RouteMatch, RouterConfig,
        RuleRouter, RuleStage, Query, Error,
    };
    use insta::assert_yaml_snapshot;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn router_at(hour: u32, pick: usize) -> RuleRouter {
        let tables = KnowledgeTables::builtin().unwrap();
        RuleRouter::with_sources(tables, Arc::new(FixedClock(hour)), Arc::new(FixedSelector(pick)))
    }

    fn router() -> RuleRouter {
        router_at(9, 0)
    }

    fn route(router: &RuleRouter, text: &str) -> Option<RouteMatch> {
        router.route(text)
    }

    fn rule_of(router: &RuleRouter, text: &str) -> Option<String> {
        route(router, text).map(|m| m.rule)
    }

    fn location_description(key: &str) -> String {
        KnowledgeTables::builtin()
            .unwrap()
            .locations
            .entries
            .into_iter()
            .find(|e| e.key == key)
            .map(|e| e.description)
            .unwrap()
    }

    #[test]
    fn test_every_faq_trigger_returns_its_answer() {
        let router = router();
        assert!(!router.faqs().is_empty());
        for faq in router.faqs() {
            let matched = route(&router, &faq.trigger_phrase)
                .unwrap_or_else(|| panic!("no route for {:?}", faq.trigger_phrase));
            assert_eq!(matched.stage, RuleStage::Faq, "wrong stage for {:?}", faq.trigger_phrase);
            assert_eq!(matched.answer, faq.canonical_answer);
        }
    }

    #[test]
    fn test_faq_matches_inside_longer_question() {
        let router = router();
        let matched = route(&router, "Hey, what is USTP anyway?").unwrap();
        assert_eq!(matched.rule, "faq:what is ustp");
    }

    #[test]
    fn test_ict_building_directions() {
        let router = router();
        let matched = route(&router, "Where is the ICT building?").unwrap();
        assert_eq!(matched.stage, RuleStage::Location);
        assert_eq!(matched.answer, location_description("ict"));
    }

    #[test]
    fn test_short_alias_queries() {
        let router = router();
        assert_eq!(rule_of(&router, "CEA building").as_deref(), Some("location:cea"));
        assert_eq!(rule_of(&router, "gym?").as_deref(), Some("location:gymnasium"));
        assert_eq!(rule_of(&router, "Bldg. 9").as_deref(), Some("location:ict"));
        assert_eq!(
            rule_of(&router, "How do I get to the registrar's office?").as_deref(),
            Some("location:administration")
        );
    }

    #[test]
    fn test_building_question_without_alias_gets_zone_overview() {
        let router = router();
        let matched = route(&router, "Where are the buildings?").unwrap();
        assert_eq!(matched.rule, "location:zone_overview");
        assert!(matched.answer.contains("six zones"));
    }

    #[test]
    fn test_non_location_phrases_skip_location_rule() {
        let router = router();
        let location = RuleStage::Location;
        for text in [
            "What are the requirements for the CEA building?",
            "ICT office hours",
            "How much is the library fee?",
            "Where do I apply at the registrar?",
        ] {
            let query = Query::new(text);
            assert!(router.apply_stage(location, &query).is_none(), "location matched {:?}", text);
        }

        // Library hours fall through to the topic table instead
        assert_eq!(rule_of(&router, "What are the library hours?").as_deref(), Some("topic:library_hours"));
    }

    #[test]
    fn test_priority_override_beats_location() {
        let router = router();
        let matched = route(&router, "Where is the ICT building to reset my password?").unwrap();
        assert_eq!(matched.stage, RuleStage::PriorityOverride);
        assert_eq!(matched.rule, "override:network_access");
        assert_eq!(rule_of(&router, "What's the WiFi password?").as_deref(), Some("override:network_access"));
    }

    #[test]
    fn test_negative_sentiment_names_support_contacts() {
        let router = router();
        let matched = route(&router, "I'm so stressed about my exams").unwrap();
        assert_eq!(matched.stage, RuleStage::NegativeSentiment);
        assert!(matched.answer.contains("Guidance and Counseling Office"));
        assert!(matched.answer.contains("Office of Student Affairs"));

        // "sad" alone is not a trigger term
        assert!(route(&router, "is the sadness policy in the handbook").is_none());
    }

    #[test]
    fn test_giving_up_phrases_do_not_cross_word_boundaries() {
        let router = router();
        assert_eq!(
            rule_of(&router, "I want to give up on my thesis").as_deref(),
            Some("negative_sentiment")
        );
        assert_ne!(
            rule_of(&router, "forgive updates to the library card").as_deref(),
            Some("negative_sentiment")
        );
    }

    #[test]
    fn test_greeting_by_time_of_day() {
        for (hour, expected) in [(8, "Good morning"), (13, "Good afternoon"), (19, "Good evening")] {
            let matched = route(&router_at(hour, 0), "Hello!").unwrap();
            assert_eq!(matched.rule, "greeting");
            assert!(
                matched.answer.starts_with(&format!("{}! Welcome to CampusGuide AI!", expected)),
                "unexpected greeting at {}: {}",
                hour,
                matched.answer
            );
            assert!(matched.answer.contains("• "));
        }
    }

    #[test]
    fn test_personal_state_variants_all_reachable() {
        let tables = KnowledgeTables::builtin().unwrap();
        for state in &tables.conversation.personal_states {
            let phrase = &state.phrases[0];
            let replies: Vec<String> = (0..state.variants.len())
                .map(|pick| route(&router_at(9, pick), phrase).unwrap().answer)
                .collect();
            assert_eq!(replies, state.variants, "variants for {}", state.name);
        }
    }

    #[test]
    fn test_topic_needs_phrase_or_question() {
        let router = router();
        assert_eq!(rule_of(&router, "How do I enroll?").as_deref(), Some("topic:enrollment"));
        assert_eq!(rule_of(&router, "I lost my ID").as_deref(), Some("topic:id_replacement"));
        assert_eq!(rule_of(&router, "when can i pay").as_deref(), Some("topic:payments"));
        // Keyword without a question word
        assert_eq!(rule_of(&router, "scholarship"), None);
    }

    #[test]
    fn test_topic_suggestion_is_appended() {
        let tables = KnowledgeTables::builtin().unwrap();
        let library = tables.topics.entries.iter().find(|t| t.name == "library_hours").unwrap();

        let matched = route(&router_at(9, 2), "library schedule").unwrap();
        assert!(matched.answer.starts_with(&library.answer));
        assert!(matched.answer.ends_with(&library.suggestions[2]));
    }

    #[test]
    fn test_unmatched_queries_fall_through() {
        let router = router();
        assert!(route(&router, "What is the grading system?").is_none());
        assert!(route(&router, "What is the attendance policy?").is_none());
        assert!(route(&router, "").is_none());
        assert!(route(&router, "?!?").is_none());
    }

    #[test]
    fn test_location_overrides_from_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"[
                {"key": "ict", "aliases": ["ICT Building"], "description": "Moved ICT", "zone": "Academic Zone"},
                {"key": "nursing", "aliases": ["Nursing Building", "CON"], "description": "Nursing desc", "zone": "Academic Zone"}
            ]"#,
        )
        .unwrap();

        let vars: HashMap<&str, String> = [("LOCATION_OVERRIDES_PATH", file.path().display().to_string())]
            .into_iter()
            .collect();
        let config = RouterConfig::from_lookup(|key| vars.get(key).cloned());
        let router = RuleRouter::from_config(&config).unwrap();

        assert_eq!(route(&router, "where is the ict building").unwrap().answer, "Moved ICT");
        assert_eq!(route(&router, "where is the nursing building").unwrap().answer, "Nursing desc");

        let directory = router.location_directory();
        assert_eq!(directory.entries()[0].key, "ict");
        assert_eq!(directory.entries().last().map(|e| e.key.as_str()), Some("nursing"));

        router.apply_location_overrides(vec![LocationEntry {
            key: "nursing".to_string(),
            aliases: ["nursing building".to_string()].into_iter().collect(),
            description: "Nursing desc v2".to_string(),
            zone: "Academic Zone".to_string(),
        }]);
        assert_eq!(route(&router, "where is the nursing building").unwrap().answer, "Nursing desc v2");
    }

    #[test]
    fn test_config_errors() {
        let config = RouterConfig::from_lookup(|key| {
            (key == "KNOWLEDGE_TABLES_PATH").then(|| "/nonexistent/tables.json".to_string())
        });
        assert!(matches!(RuleRouter::from_config(&config), Err(Error::Configuration(_))));

        let config = RouterConfig::from_lookup(|key| {
            (key == "LOCATION_OVERRIDES_PATH").then(|| "/nonexistent/overrides.json".to_string())
        });
        assert!(matches!(RuleRouter::from_config(&config), Err(Error::Io(_))));

        let blank = RouterConfig::from_lookup(|_| Some("   ".to_string()));
        assert!(blank.knowledge_tables_path.is_none());
        assert!(RuleRouter::from_config(&blank).is_ok());
    }

    #[test]
    fn test_cascade_order_snapshot() {
        assert_yaml_snapshot!(RuleStage::CASCADE, @r###"
        - priority_override
        - location
        - negative_sentiment
        - conversation
        - topic
        - faq
        "###);
    }

    #[test]
    fn test_default_config_snapshot() {
        assert_yaml_snapshot!(RouterConfig::default(), @r###"
        knowledge_tables_path: ~
        location_overrides_path: ~
        "###);
    }
}
