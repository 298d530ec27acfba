//! Assistant pipeline and terminal interface for CampusGuide
//!
//! Wires the rule router, the knowledge base and the model provider into a
//! single request handler, and provides the helpers the interactive CLI uses.

mod assistant;
mod intent_analyzer;
mod synthesizer;
mod ui;


pub use assistant::{Answer, CampusAssistant, Route, APOLOGY_MESSAGE, DEFAULT_TOP_K, UNAVAILABLE_MESSAGE};
pub use intent_analyzer::IntentAnalyzer;
pub use synthesizer::{
    build_prompt, decorate, fallback_answer, is_informative, no_content_guidance,
    ResponseSynthesizer, Synthesis, FALLBACK_CHUNKS, TECHNICAL_DIFFICULTY_NOTICE,
};
pub use ui::{
    display_banner, format_sources, handle_input_with_history, print_answer, print_health,
    print_help, route_label,
};

// Re-export core types
pub use cg_core::{Error, Result};
