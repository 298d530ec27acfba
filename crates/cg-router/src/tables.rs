//! Static knowledge tables driving the rule router
//!
//! The tables are plain data (phrase sets, canned answers, the location
//! directory) loaded from JSON. A built-in copy is compiled into the crate and
//! can be replaced by a file at startup. Every matching phrase is normalized on
//! load so it compares equal to normalized user queries.

use std::collections::BTreeSet;
use std::path::Path;

use cg_core::{Error, Result};
use cg_rag::normalize;
use serde::{Deserialize, Serialize};

const BUILTIN_TABLES: &str = include_str!("../data/campus_knowledge.json");

/// Override that must win over everything else (network and credentials)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityOverride {
    pub name: String,
    pub phrases: Vec<String>,
    pub answer: String,
}

/// A campus location with its alias set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub key: String,
    pub aliases: BTreeSet<String>,
    pub description: String,
    pub zone: String,
}

/// Location directory plus the phrase sets the location rule consults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationRules {
    pub entries: Vec<LocationEntry>,
    pub directions_phrases: Vec<String>,
    pub generic_location_words: Vec<String>,
    pub building_vocabulary: Vec<String>,
    pub non_location_phrases: Vec<String>,
    pub zone_overview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentRules {
    pub negative_terms: Vec<String>,
    pub response: String,
}

/// Short personal statement ("im tired") with rotating replies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalState {
    pub name: String,
    pub phrases: Vec<String>,
    pub variants: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRules {
    pub greeting_phrases: Vec<String>,
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub greeting_tips: Vec<String>,
    pub help_phrases: Vec<String>,
    pub help_menu: String,
    #[serde(default)]
    pub personal_states: Vec<PersonalState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub keywords: Vec<String>,
    pub phrases: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRules {
    pub question_words: Vec<String>,
    pub entries: Vec<Topic>,
}

/// A canned answer returned when its trigger occurs in the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub trigger_phrase: String,
    pub canonical_answer: String,
}

/// All tables consulted by the rule router
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeTables {
    pub priority_overrides: Vec<PriorityOverride>,
    pub locations: LocationRules,
    pub sentiment: SentimentRules,
    pub conversation: ConversationRules,
    pub topics: TopicRules,
    pub faqs: Vec<FaqEntry>,
}

impl KnowledgeTables {
    /// Tables compiled into the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_TABLES)
    }

    /// Parse tables from JSON and normalize their phrases
    pub fn from_json(json: &str) -> Result<Self> {
        let tables: Self = serde_json::from_str(json)
            .map_err(|e| Error::Configuration(format!("Invalid knowledge tables: {}", e)))?;
        Ok(tables.normalized())
    }

    /// Load tables from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Cannot read knowledge tables {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Normalize every matching phrase; answers are left untouched
    pub fn normalized(mut self) -> Self {
        for rule in &mut self.priority_overrides {
            normalize_all(&mut rule.phrases);
        }

        let locations = &mut self.locations;
        for entry in &mut locations.entries {
            normalize_entry(entry);
        }
        normalize_all(&mut locations.directions_phrases);
        normalize_all(&mut locations.generic_location_words);
        normalize_all(&mut locations.building_vocabulary);
        normalize_all(&mut locations.non_location_phrases);

        normalize_all(&mut self.sentiment.negative_terms);

        let conversation = &mut self.conversation;
        normalize_all(&mut conversation.greeting_phrases);
        normalize_all(&mut conversation.help_phrases);
        for state in &mut conversation.personal_states {
            normalize_all(&mut state.phrases);
        }

        normalize_all(&mut self.topics.question_words);
        for topic in &mut self.topics.entries {
            normalize_all(&mut topic.keywords);
            normalize_all(&mut topic.phrases);
        }

        for faq in &mut self.faqs {
            faq.trigger_phrase = normalize(&faq.trigger_phrase);
        }
        self.faqs.retain(|faq| !faq.trigger_phrase.is_empty());

        self
    }
}

/// Normalize a location entry's aliases, dropping ones that normalize to nothing
pub(crate) fn normalize_entry(entry: &mut LocationEntry) {
    entry.aliases = entry
        .aliases
        .iter()
        .map(|alias| normalize(alias))
        .filter(|alias| !alias.is_empty())
        .collect();
}

fn normalize_all(phrases: &mut Vec<String>) {
    let mut seen = BTreeSet::new();
    phrases.retain_mut(|phrase| {
        *phrase = normalize(phrase);
        !phrase.is_empty() && seen.insert(phrase.clone())
    });
}
