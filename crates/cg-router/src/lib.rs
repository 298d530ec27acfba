//! Rule-based router for CampusGuide
//!
//! Answers network/credential questions, campus navigation, distress
//! messages, greetings and frequent questions from static tables before any
//! retrieval happens.

mod config;
mod conversation;
mod location;
mod query;
mod router;
mod tables;

#[cfg(test)]
mod tests;

pub use config::RouterConfig;
pub use conversation::{
    time_greeting, Clock, FixedClock, FixedSelector, LocalClock, RandomSelector, VariantSelector,
};
pub use location::{LocationDirectory, LocationMatch, LocationResolver};
pub use query::Query;
pub use router::{RouteMatch, RuleRouter, RuleStage};
pub use tables::{
    ConversationRules, FaqEntry, KnowledgeTables, LocationEntry, LocationRules, PersonalState,
    PriorityOverride, SentimentRules, Topic, TopicRules,
};

pub use cg_core::{Error, Result};
