//! Campus navigation rule and the location directory

use std::path::Path;

use cg_core::{Error, Result};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::query::Query;
use crate::tables::{normalize_entry, LocationEntry, LocationRules};

/// How far (in tokens) a generic location word may sit from an alias
const PROXIMITY_WINDOW: usize = 3;

/// Longest query where a bare alias counts as a location request
const SHORT_QUERY_TOKENS: usize = 3;

/// Ordered location entries. Iteration order decides ties between entries.
#[derive(Debug, Clone, Default)]
pub struct LocationDirectory {
    entries: Vec<LocationEntry>,
}

impl LocationDirectory {
    pub fn new(entries: Vec<LocationEntry>) -> Self {
        let mut directory = Self::default();
        directory.apply_overrides(entries);
        directory
    }

    pub fn entries(&self) -> &[LocationEntry] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&LocationEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge entries by key: an existing key is replaced in place, a new key
    /// is appended. Later entries win over earlier ones.
    pub fn apply_overrides(&mut self, overrides: Vec<LocationEntry>) -> usize {
        let mut applied = 0;
        for mut entry in overrides {
            normalize_entry(&mut entry);
            match self.entries.iter_mut().find(|e| e.key == entry.key) {
                Some(existing) => *existing = entry,
                None => self.entries.push(entry),
            }
            applied += 1;
        }
        applied
    }

    /// Read override entries from a JSON array file
    pub fn load_overrides(path: impl AsRef<Path>) -> Result<Vec<LocationEntry>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            Error::Configuration(format!("Invalid location overrides {}: {}", path.display(), e))
        })
    }

    /// First entry (in directory order) with an alias occurring in the query
    fn find_alias(&self, query: &Query) -> Option<&LocationEntry> {
        self.entries
            .iter()
            .find(|entry| entry.aliases.iter().any(|alias| query.contains_phrase(alias)))
    }
}

/// Result of the location rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationMatch {
    /// A directory entry; the answer is its description
    Entry { key: String, description: String },
    /// A building question with no recognizable alias
    ZoneOverview(String),
}

impl LocationMatch {
    pub fn answer(&self) -> &str {
        match self {
            LocationMatch::Entry { description, .. } => description,
            LocationMatch::ZoneOverview(overview) => overview,
        }
    }

    pub fn rule_name(&self) -> String {
        match self {
            LocationMatch::Entry { key, .. } => format!("location:{}", key),
            LocationMatch::ZoneOverview(_) => "location:zone_overview".to_string(),
        }
    }
}

/// Decides whether a query asks for a place and which one
pub struct LocationResolver {
    directions_phrases: Vec<String>,
    generic_location_words: Vec<String>,
    building_vocabulary: Vec<String>,
    non_location_phrases: Vec<String>,
    zone_overview: String,
    directory: RwLock<LocationDirectory>,
}

impl LocationResolver {
    pub fn new(rules: LocationRules) -> Self {
        Self {
            directory: RwLock::new(LocationDirectory::new(rules.entries)),
            directions_phrases: rules.directions_phrases,
            generic_location_words: rules.generic_location_words,
            building_vocabulary: rules.building_vocabulary,
            non_location_phrases: rules.non_location_phrases,
            zone_overview: rules.zone_overview,
        }
    }

    /// Snapshot of the current directory
    pub fn directory(&self) -> LocationDirectory {
        self.directory.read().clone()
    }

    /// Merge override entries into the live directory
    pub fn apply_overrides(&self, overrides: Vec<LocationEntry>) -> usize {
        let applied = self.directory.write().apply_overrides(overrides);
        info!("Applied {} location override(s)", applied);
        applied
    }

    pub fn resolve(&self, query: &Query) -> Option<LocationMatch> {
        if query.is_empty() {
            return None;
        }

        // Questions about requirements, hours or fees are never navigation
        // requests even when they name a building.
        if let Some(phrase) = self.non_location_phrases.iter().find(|p| query.contains_phrase(p)) {
            debug!("Location rule skipped, non-location phrase {:?}", phrase);
            return None;
        }

        let explicit = self.directions_phrases.iter().any(|p| query.contains_phrase(p));
        let directory = self.directory.read();

        if explicit {
            if let Some(entry) = directory.find_alias(query) {
                return Some(entry_match(entry));
            }
        }

        let near_generic_word = directory.entries().iter().find(|entry| {
            entry.aliases.iter().any(|alias| {
                query.phrase_spans(alias).into_iter().any(|span| {
                    query
                        .neighbours(span, PROXIMITY_WINDOW)
                        .any(|token| self.generic_location_words.iter().any(|w| w == token))
                })
            })
        });
        if let Some(entry) = near_generic_word {
            return Some(entry_match(entry));
        }

        if query.token_count() <= SHORT_QUERY_TOKENS {
            if let Some(entry) = directory.find_alias(query) {
                return Some(entry_match(entry));
            }
        }

        if explicit && self.building_vocabulary.iter().any(|w| query.contains_phrase(w)) {
            return Some(LocationMatch::ZoneOverview(self.zone_overview.clone()));
        }

        None
    }
}

fn entry_match(entry: &LocationEntry) -> LocationMatch {
    LocationMatch::Entry {
        key: entry.key.clone(),
        description: entry.description.clone(),
    }
}
