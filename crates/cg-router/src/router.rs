//! Ordered rule cascade producing canned answers
//!
//! Rules run in a fixed order and the first one that produces an answer wins.
//! A query no rule answers falls through to retrieval.

use std::sync::Arc;

use cg_core::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RouterConfig;
use crate::conversation::{
    choose, Clock, ConversationResponder, LocalClock, RandomSelector, VariantSelector,
};
use crate::location::{LocationDirectory, LocationResolver};
use crate::query::Query;
use crate::tables::{FaqEntry, KnowledgeTables, LocationEntry, PriorityOverride, SentimentRules, TopicRules};

/// One stage of the routing cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStage {
    PriorityOverride,
    Location,
    NegativeSentiment,
    Conversation,
    Topic,
    Faq,
}

impl RuleStage {
    /// Evaluation order of the cascade
    pub const CASCADE: [RuleStage; 6] = [
        RuleStage::PriorityOverride,
        RuleStage::Location,
        RuleStage::NegativeSentiment,
        RuleStage::Conversation,
        RuleStage::Topic,
        RuleStage::Faq,
    ];
}

/// A canned answer and the rule that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMatch {
    pub stage: RuleStage,
    pub rule: String,
    pub answer: String,
}

impl RouteMatch {
    fn new(stage: RuleStage, rule: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            stage,
            rule: rule.into(),
            answer: answer.into(),
        }
    }
}

/// Rule-based router over the knowledge tables
pub struct RuleRouter {
    priority_overrides: Vec<PriorityOverride>,
    locations: LocationResolver,
    sentiment: SentimentRules,
    conversation: ConversationResponder,
    topics: TopicRules,
    faqs: Vec<FaqEntry>,
    selector: Arc<dyn VariantSelector>,
}

impl RuleRouter {
    /// Router using the local clock and random reply variants
    pub fn new(tables: KnowledgeTables) -> Self {
        Self::with_sources(tables, Arc::new(LocalClock), Arc::new(RandomSelector))
    }

    /// Router with an injected clock and variant selector
    pub fn with_sources(
        tables: KnowledgeTables,
        clock: Arc<dyn Clock>,
        selector: Arc<dyn VariantSelector>,
    ) -> Self {
        Self {
            priority_overrides: tables.priority_overrides,
            locations: LocationResolver::new(tables.locations),
            sentiment: tables.sentiment,
            conversation: ConversationResponder::new(tables.conversation, clock, selector.clone()),
            topics: tables.topics,
            faqs: tables.faqs,
            selector,
        }
    }

    /// Router over the built-in tables
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(KnowledgeTables::builtin()?))
    }

    /// Build from configuration: tables file (or built-in) plus location overrides
    pub fn from_config(config: &RouterConfig) -> Result<Self> {
        let tables = match &config.knowledge_tables_path {
            Some(path) => KnowledgeTables::from_file(path)?,
            None => KnowledgeTables::builtin()?,
        };
        let router = Self::new(tables);

        if let Some(path) = &config.location_overrides_path {
            router.apply_location_overrides(LocationDirectory::load_overrides(path)?);
        }

        Ok(router)
    }

    /// Merge location entries into the live directory (last write wins)
    pub fn apply_location_overrides(&self, overrides: Vec<LocationEntry>) -> usize {
        self.locations.apply_overrides(overrides)
    }

    /// Snapshot of the location directory
    pub fn location_directory(&self) -> LocationDirectory {
        self.locations.directory()
    }

    pub fn faqs(&self) -> &[FaqEntry] {
        &self.faqs
    }

    /// Run the cascade. Input is normalized here, so raw or already
    /// normalized text both work.
    pub fn route(&self, text: &str) -> Option<RouteMatch> {
        let query = Query::new(text);
        if query.is_empty() {
            return None;
        }

        let matched = RuleStage::CASCADE
            .iter()
            .find_map(|stage| self.apply_stage(*stage, &query));

        match &matched {
            Some(m) => debug!("Routed {:?} via {}", query.text(), m.rule),
            None => debug!("No rule matched {:?}", query.text()),
        }
        matched
    }

    /// Evaluate a single stage
    pub fn apply_stage(&self, stage: RuleStage, query: &Query) -> Option<RouteMatch> {
        match stage {
            RuleStage::PriorityOverride => self.priority_override(query),
            RuleStage::Location => self
                .locations
                .resolve(query)
                .map(|m| RouteMatch::new(stage, m.rule_name(), m.answer())),
            RuleStage::NegativeSentiment => self.negative_sentiment(query),
            RuleStage::Conversation => self
                .conversation
                .respond(query)
                .map(|(rule, answer)| RouteMatch::new(stage, rule, answer)),
            RuleStage::Topic => self.topic(query),
            RuleStage::Faq => self.faq(query),
        }
    }

    fn priority_override(&self, query: &Query) -> Option<RouteMatch> {
        self.priority_overrides
            .iter()
            .find(|rule| rule.phrases.iter().any(|p| query.contains(p)))
            .map(|rule| {
                RouteMatch::new(
                    RuleStage::PriorityOverride,
                    format!("override:{}", rule.name),
                    rule.answer.clone(),
                )
            })
    }

    fn negative_sentiment(&self, query: &Query) -> Option<RouteMatch> {
        self.sentiment
            .negative_terms
            .iter()
            .any(|term| query.contains(term))
            .then(|| {
                RouteMatch::new(
                    RuleStage::NegativeSentiment,
                    "negative_sentiment",
                    self.sentiment.response.clone(),
                )
            })
    }

    /// A topic matches on one of its phrases, or on a keyword asked as a question
    fn topic(&self, query: &Query) -> Option<RouteMatch> {
        let is_question = self.topics.question_words.iter().any(|w| query.has_token(w));

        let topic = self.topics.entries.iter().find(|topic| {
            topic.phrases.iter().any(|p| query.contains(p))
                || (is_question && topic.keywords.iter().any(|k| query.contains_phrase(k)))
        })?;

        let mut answer = topic.answer.clone();
        if let Some(suggestion) = choose(self.selector.as_ref(), &topic.suggestions) {
            answer.push_str(&format!("\n\n💡 {}", suggestion));
        }

        Some(RouteMatch::new(RuleStage::Topic, format!("topic:{}", topic.name), answer))
    }

    fn faq(&self, query: &Query) -> Option<RouteMatch> {
        self.faqs
            .iter()
            .find(|faq| query.contains(&faq.trigger_phrase))
            .map(|faq| {
                RouteMatch::new(
                    RuleStage::Faq,
                    format!("faq:{}", faq.trigger_phrase),
                    faq.canonical_answer.clone(),
                )
            })
    }
}
