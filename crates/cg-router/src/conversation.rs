//! Greetings, help menu and short personal statements

use std::sync::Arc;

use chrono::{Local, Timelike};
use rand::{thread_rng, Rng};

use crate::query::Query;
use crate::tables::ConversationRules;

/// Source of the local hour used for time-of-day greetings
pub trait Clock: Send + Sync {
    /// Hour of day, 0-23
    fn hour(&self) -> u32;
}

/// Wall clock in the server's local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn hour(&self) -> u32 {
        Local::now().hour()
    }
}

/// Clock pinned to a single hour
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u32);

impl Clock for FixedClock {
    fn hour(&self) -> u32 {
        self.0 % 24
    }
}

/// Picks one of several interchangeable reply variants
pub trait VariantSelector: Send + Sync {
    /// Index in `0..len`; `len` is never zero
    fn pick(&self, len: usize) -> usize;
}

/// Uniformly random selection
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl VariantSelector for RandomSelector {
    fn pick(&self, len: usize) -> usize {
        thread_rng().gen_range(0..len)
    }
}

/// Always picks the same position (modulo the variant count)
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSelector(pub usize);

impl VariantSelector for FixedSelector {
    fn pick(&self, len: usize) -> usize {
        self.0 % len
    }
}

/// Choose a variant, or `None` for an empty list
pub fn choose<'a>(selector: &dyn VariantSelector, variants: &'a [String]) -> Option<&'a str> {
    if variants.is_empty() {
        return None;
    }
    variants.get(selector.pick(variants.len())).map(String::as_str)
}

/// "Good morning" before noon, "Good afternoon" before 17:00, else "Good evening"
pub fn time_greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    }
}

/// Responds to whole-message greetings, help requests and personal states
pub struct ConversationResponder {
    rules: ConversationRules,
    clock: Arc<dyn Clock>,
    selector: Arc<dyn VariantSelector>,
}

impl ConversationResponder {
    pub fn new(
        rules: ConversationRules,
        clock: Arc<dyn Clock>,
        selector: Arc<dyn VariantSelector>,
    ) -> Self {
        Self { rules, clock, selector }
    }

    /// Returns `(rule name, answer)` when the whole query is a conversational phrase
    pub fn respond(&self, query: &Query) -> Option<(String, String)> {
        let text = query.text();
        if text.is_empty() {
            return None;
        }

        if self.rules.greeting_phrases.iter().any(|p| p == text) {
            return Some(("greeting".to_string(), self.greeting()));
        }

        if self.rules.help_phrases.iter().any(|p| p == text) {
            return Some(("help".to_string(), self.rules.help_menu.clone()));
        }

        self.rules
            .personal_states
            .iter()
            .find(|state| state.phrases.iter().any(|p| p == text))
            .and_then(|state| {
                choose(self.selector.as_ref(), &state.variants)
                    .map(|reply| (format!("personal:{}", state.name), reply.to_string()))
            })
    }

    /// Time-of-day greeting followed by the capability list
    pub fn greeting(&self) -> String {
        let mut text = format!(
            "{}! Welcome to CampusGuide AI! I can help you with:\n",
            time_greeting(self.clock.hour())
        );
        for capability in &self.rules.capabilities {
            text.push_str(&format!("\n• {}", capability));
        }
        if let Some(tip) = choose(self.selector.as_ref(), &self.rules.greeting_tips) {
            text.push_str(&format!("\n\n💡 {}", tip));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::PersonalState;

    fn rules() -> ConversationRules {
        ConversationRules {
            greeting_phrases: vec!["hi".to_string(), "good morning".to_string()],
            capabilities: vec!["Finding buildings".to_string(), "Policies".to_string()],
            greeting_tips: vec!["Tip one".to_string(), "Tip two".to_string()],
            help_phrases: vec!["help".to_string()],
            help_menu: "Menu".to_string(),
            personal_states: vec![PersonalState {
                name: "tired".to_string(),
                phrases: vec!["im tired".to_string()],
                variants: vec!["Rest A".to_string(), "Rest B".to_string(), "Rest C".to_string()],
            }],
        }
    }

    fn responder(hour: u32, pick: usize) -> ConversationResponder {
        ConversationResponder::new(rules(), Arc::new(FixedClock(hour)), Arc::new(FixedSelector(pick)))
    }

    #[test]
    fn test_time_greeting_buckets() {
        assert_eq!(time_greeting(0), "Good morning");
        assert_eq!(time_greeting(11), "Good morning");
        assert_eq!(time_greeting(12), "Good afternoon");
        assert_eq!(time_greeting(16), "Good afternoon");
        assert_eq!(time_greeting(17), "Good evening");
        assert_eq!(time_greeting(23), "Good evening");
    }

    #[test]
    fn test_greeting_lists_capabilities() {
        let (rule, text) = responder(9, 1).respond(&Query::new("Hi!")).unwrap();
        assert_eq!(rule, "greeting");
        assert_eq!(
            text,
            "Good morning! Welcome to CampusGuide AI! I can help you with:\n\n• Finding buildings\n• Policies\n\n💡 Tip two"
        );
        assert!(responder(20, 0).greeting().starts_with("Good evening! Welcome to CampusGuide AI!"));
    }

    #[test]
    fn test_whole_message_match_only() {
        let responder = responder(9, 0);
        assert!(responder.respond(&Query::new("hi where is the gym")).is_none());
        assert_eq!(responder.respond(&Query::new("HELP")).unwrap().1, "Menu");
        assert!(responder.respond(&Query::new("")).is_none());
    }

    #[test]
    fn test_personal_state_variants() {
        let replies: Vec<String> = (0..3)
            .map(|pick| responder(9, pick).respond(&Query::new("I'm tired")).unwrap().1)
            .collect();
        assert_eq!(replies, vec!["Rest A", "Rest B", "Rest C"]);

        let (rule, _) = responder(9, 4).respond(&Query::new("im tired")).unwrap();
        assert_eq!(rule, "personal:tired");
    }

    #[test]
    fn test_random_selector_stays_in_range() {
        for len in 1..6 {
            for _ in 0..50 {
                assert!(RandomSelector.pick(len) < len);
            }
        }
    }
}
