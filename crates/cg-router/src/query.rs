//! Normalized query view shared by the routing rules

use cg_rag::normalize;

/// A normalized query with its token list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    padded: String,
    tokens: Vec<String>,
}

impl Query {
    /// Normalize raw text. Already-normalized input is left unchanged.
    pub fn new(raw: &str) -> Self {
        let text = normalize(raw);
        let tokens = text.split_whitespace().map(str::to_string).collect();
        let padded = format!(" {} ", text);
        Self { text, padded, tokens }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Plain substring containment
    pub fn contains(&self, needle: &str) -> bool {
        !needle.is_empty() && self.text.contains(needle)
    }

    /// Whole-word phrase containment
    pub fn contains_phrase(&self, phrase: &str) -> bool {
        let phrase = phrase.trim();
        !phrase.is_empty() && self.padded.contains(&format!(" {} ", phrase))
    }

    pub fn has_token(&self, word: &str) -> bool {
        self.tokens.iter().any(|t| t == word)
    }

    /// Token spans `[start, end)` where the phrase occurs as whole words
    pub fn phrase_spans(&self, phrase: &str) -> Vec<(usize, usize)> {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        if words.is_empty() || words.len() > self.tokens.len() {
            return Vec::new();
        }

        (0..=self.tokens.len() - words.len())
            .filter(|&start| {
                words
                    .iter()
                    .enumerate()
                    .all(|(offset, word)| self.tokens[start + offset] == *word)
            })
            .map(|start| (start, start + words.len()))
            .collect()
    }

    /// Tokens within `radius` positions of a span, excluding the span itself
    pub fn neighbours(&self, span: (usize, usize), radius: usize) -> impl Iterator<Item = &str> {
        let (start, end) = span;
        let from = start.saturating_sub(radius);
        let to = (end + radius).min(self.tokens.len());
        self.tokens[from..to]
            .iter()
            .enumerate()
            .filter(move |(i, _)| {
                let position = from + i;
                position < start || position >= end
            })
            .map(|(_, t)| t.as_str())
    }
}
