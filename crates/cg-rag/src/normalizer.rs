//! Query text normalization
//!
//! Lower-cases and strips punctuation while keeping campus acronyms and
//! building references intact. Protected terms are swapped for placeholder
//! tokens before cleaning and restored (lower-cased) afterwards.

use regex::Regex;
use std::sync::LazyLock;

/// Acronyms that must survive punctuation stripping
pub const PROTECTED_ACRONYMS: &[&str] = &[
    "USTP", "CEA", "CITC", "CSM", "CSTE", "COT", "CTHM", "SHS", "ICT", "CS-ICT",
    "LRC", "OSA", "NSTP", "ROTC", "CWTS", "GPA", "QPI", "ID", "R&D", "PE",
    "DOST", "CHED", "TES", "SSC",
];

/// Words that introduce a numbered building reference ("Building 9", "Rm. 301")
const BUILDING_WORDS: &[&str] = &[
    "building", "bldg", "room", "rm", "gate", "lab", "laboratory", "hall", "floor", "wing",
];

const PLACEHOLDER_STEM: &str = "qqprot";

static SHARED: LazyLock<TextNormalizer> = LazyLock::new(TextNormalizer::new);

/// Normalize raw query text with the default protected-term set
pub fn normalize(raw: &str) -> String {
    SHARED.normalize(raw)
}

/// Text normalizer with compiled protection patterns
pub struct TextNormalizer {
    protected_patterns: Vec<Regex>,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self::with_acronyms(PROTECTED_ACRONYMS)
    }

    /// Build a normalizer protecting a custom acronym list
    pub fn with_acronyms(acronyms: &[&str]) -> Self {
        let mut sorted: Vec<&str> = acronyms.iter().copied().filter(|a| !a.is_empty()).collect();
        // Longest first so "CS-ICT" wins over "ICT" in the alternation.
        sorted.sort_by_key(|a| std::cmp::Reverse(a.len()));

        let acronym_pattern = format!(
            r"(?i)\b(?:{})\b",
            sorted.iter().map(|a| regex::escape(a)).collect::<Vec<_>>().join("|")
        );
        let building_pattern = format!(
            r"(?i)\b({})(?:\.\s*|\s+)(\d+[a-z]?)\b",
            BUILDING_WORDS.join("|")
        );

        let patterns = if sorted.is_empty() {
            vec![building_pattern]
        } else {
            vec![acronym_pattern, building_pattern]
        };

        let protected_patterns = patterns
            .into_iter()
            .filter_map(|p| Regex::new(&p).ok())
            .collect();

        Self { protected_patterns }
    }

    /// Normalize text: protect, lower-case, strip, collapse whitespace, restore
    pub fn normalize(&self, raw: &str) -> String {
        if raw.trim().is_empty() {
            return String::new();
        }

        let stem = unique_stem(raw);
        let mut protected: Vec<String> = Vec::new();
        let mut text = raw.to_string();

        for pattern in &self.protected_patterns {
            text = pattern
                .replace_all(&text, |caps: &regex::Captures| {
                    let term = canonical_term(caps);
                    let placeholder = placeholder(&stem, protected.len());
                    protected.push(term);
                    placeholder
                })
                .into_owned();
        }

        let cleaned = strip_punctuation(&text);

        let mut collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

        for (index, term) in protected.iter().enumerate() {
            collapsed = collapsed.replace(&placeholder(&stem, index), term);
        }

        collapsed
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower-cased protected term; building references become "<word> <number>"
fn canonical_term(caps: &regex::Captures) -> String {
    match (caps.get(1), caps.get(2)) {
        (Some(word), Some(number)) => format!(
            "{} {}",
            word.as_str().to_lowercase(),
            number.as_str().to_lowercase()
        ),
        _ => caps
            .get(0)
            .map(|m| m.as_str().to_lowercase())
            .unwrap_or_default(),
    }
}

/// Lower-case and keep only word characters, whitespace and hyphens
fn strip_punctuation(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect()
}

/// Placeholder stem that cannot occur in the input, before or after stripping
fn unique_stem(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let stripped = strip_punctuation(raw);
    let mut stem = PLACEHOLDER_STEM.to_string();
    while lowered.contains(&stem) || stripped.contains(&stem) {
        stem.push('q');
    }
    stem
}

fn placeholder(stem: &str, index: usize) -> String {
    format!("{}{}x{}", stem, index, stem)
}
