//! Response synthesis from retrieved handbook chunks
//!
//! Builds the generation prompt, calls the model behind a health probe and a
//! timeout, and decorates informative answers with follow-up questions and a
//! contact link. Every model failure degrades to a templated answer built from
//! the retrieved text.

use cg_core::{
    FocusArea, GenerationConfig, IntentResult, LLMProvider, QueryType, Retrieval, ScoredChunk,
};
use cg_rag::normalize;
use tracing::{debug, warn};

/// Prefix of every answer produced without the model
pub const TECHNICAL_DIFFICULTY_NOTICE: &str = "⚠️ I'm having technical difficulties reaching the answer service right now, so here is the most relevant information I found in the student handbook:";

/// Chunks quoted verbatim in a fallback answer
pub const FALLBACK_CHUNKS: usize = 3;

const USAGE_TIP: &str = "💡 Tip: Ask a specific question about the student handbook, for example \"What is the attendance policy?\" or \"How do I apply for a scholarship?\"";

const NO_CONTENT_GUIDANCE: &str = "🤔 I couldn't find anything about that in the student handbook. Try rephrasing your question with specific keywords, for example \"What is the grading system?\" or \"What are the requirements for enrollment?\"";

const ROLE_PREAMBLE: &str = "You are CampusGuide AI, a helpful assistant for university students.\n\
Answer the question using ONLY the student handbook excerpts below.\n\
If the excerpts do not contain the answer, say that you don't have that information.\n\
Never invent policies, dates, fees or contact details, and keep the answer respectful and concise.";

/// Queries with fewer tokens than this get a hint to add detail
const SHORT_QUERY_TOKENS: usize = 3;

/// Answers shorter than this are never decorated with a contact link
const INFORMATIVE_MIN_CHARS: usize = 80;

const LACK_OF_INFO_PHRASES: &[&str] = &[
    "i don't have",
    "i do not have",
    "don't have that information",
    "no information",
    "not in the handbook",
    "not mentioned",
    "not specified",
    "couldn't find",
    "could not find",
    "unable to find",
];

struct FollowUps {
    keywords: &'static [&'static str],
    questions: &'static [&'static str],
}

const FOLLOW_UPS: &[FollowUps] = &[
    FollowUps {
        keywords: &["grade", "grades", "grading", "gpa", "qpi", "incomplete", "failing"],
        questions: &[
            "What is the passing grade under the grading system?",
            "How is my general weighted average computed?",
            "What happens if I receive an incomplete (INC) grade?",
        ],
    },
    FollowUps {
        keywords: &["attendance", "absent", "absence", "absences", "late", "tardy", "tardiness"],
        questions: &[
            "How many absences are allowed per subject?",
            "How do I excuse an absence?",
            "What happens if I am dropped for excessive absences?",
        ],
    },
    FollowUps {
        keywords: &["enroll", "enrollment", "registration", "register", "adding", "dropping"],
        questions: &[
            "What are the requirements for enrollment?",
            "How do I add or drop a subject?",
        ],
    },
    FollowUps {
        keywords: &["scholarship", "scholarships", "grant", "financial"],
        questions: &[
            "Who can apply for a scholarship?",
            "What grades do I need to keep my scholarship?",
        ],
    },
    FollowUps {
        keywords: &["uniform", "conduct", "discipline", "violation", "sanction", "offense"],
        questions: &[
            "What is the dress code on campus?",
            "What are the sanctions for a minor offense?",
            "How are disciplinary cases handled?",
        ],
    },
    FollowUps {
        keywords: &["library", "books", "borrow", "borrowing"],
        questions: &[
            "How many books can I borrow at a time?",
            "What are the library hours?",
        ],
    },
];

struct ContactLink {
    keywords: &'static [&'static str],
    label: &'static str,
    url: &'static str,
}

const CONTACT_LINKS: &[ContactLink] = &[
    ContactLink {
        keywords: &["grade", "grades", "grading", "enroll", "enrollment", "transcript", "registrar", "records"],
        label: "Office of the University Registrar",
        url: "https://www.ustp.edu.ph/registrar/",
    },
    ContactLink {
        keywords: &["scholarship", "scholarships", "grant", "financial"],
        label: "Scholarships and Financial Assistance",
        url: "https://www.ustp.edu.ph/scholarships/",
    },
    ContactLink {
        keywords: &["conduct", "discipline", "uniform", "organization", "organizations", "osa"],
        label: "Office of Student Affairs",
        url: "https://www.ustp.edu.ph/student-affairs/",
    },
    ContactLink {
        keywords: &["library", "books", "borrow"],
        label: "University Library",
        url: "https://www.ustp.edu.ph/library/",
    },
];

const DEFAULT_CONTACT: ContactLink = ContactLink {
    keywords: &[],
    label: "Student Portal",
    url: "https://portal.ustp.edu.ph/",
};

/// How an answer was synthesized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesis {
    /// Model answer with optional decorations
    Generated(String),
    /// Template built from retrieved chunks
    Fallback(String),
    /// Guidance to reformulate; nothing cleared the threshold
    NoRelevantContent(String),
}

impl Synthesis {
    pub fn text(&self) -> &str {
        match self {
            Synthesis::Generated(text) | Synthesis::Fallback(text) | Synthesis::NoRelevantContent(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Synthesis::Generated(text) | Synthesis::Fallback(text) | Synthesis::NoRelevantContent(text) => text,
        }
    }
}

/// Turns retrieval results into a user-facing answer
pub struct ResponseSynthesizer<L: LLMProvider> {
    llm: L,
    generation: GenerationConfig,
}

impl<L: LLMProvider> ResponseSynthesizer<L> {
    pub fn new(llm: L) -> Self {
        let generation = GenerationConfig {
            model_id: llm.model_id().to_string(),
            ..Default::default()
        };
        Self { llm, generation }
    }

    pub fn with_generation_config(llm: L, generation: GenerationConfig) -> Self {
        Self { llm, generation }
    }

    pub fn llm(&self) -> &L {
        &self.llm
    }

    /// Produce an answer. Never fails: model problems become `Synthesis::Fallback`.
    pub async fn synthesize(&self, query: &str, retrieval: &Retrieval, intent: &IntentResult) -> Synthesis {
        let (chunks, section_refs) = match retrieval {
            Retrieval::NoRelevantContent { best_score } => {
                debug!(best_score, "answering with reformulation guidance");
                return Synthesis::NoRelevantContent(no_content_guidance(query));
            }
            Retrieval::Found { chunks, section_refs } => (chunks, section_refs),
        };

        if !self.llm.health_check().await {
            warn!("Model service failed its health probe, using template answer");
            return Synthesis::Fallback(fallback_answer(chunks));
        }

        let prompt = build_prompt(query, chunks, section_refs, intent);
        let generation = tokio::time::timeout(
            self.generation.timeout,
            self.llm.generate_with_config(&prompt, &self.generation),
        )
        .await;

        match generation {
            Ok(Ok(result)) if !result.text.trim().is_empty() => {
                debug!(tokens = ?result.tokens_used, "generation complete");
                Synthesis::Generated(decorate(query, result.text.trim()))
            }
            Ok(Ok(_)) => {
                warn!("Model returned an empty answer, using template answer");
                Synthesis::Fallback(fallback_answer(chunks))
            }
            Ok(Err(e)) => {
                warn!("Generation failed: {}", e);
                Synthesis::Fallback(fallback_answer(chunks))
            }
            Err(_) => {
                warn!("Generation timed out after {:?}", self.generation.timeout);
                Synthesis::Fallback(fallback_answer(chunks))
            }
        }
    }
}

/// Reformulation advice, with hints for very short or oddly written queries
pub fn no_content_guidance(query: &str) -> String {
    let mut text = NO_CONTENT_GUIDANCE.to_string();

    if normalize(query).split_whitespace().count() < SHORT_QUERY_TOKENS {
        text.push_str("\n\nYour question was quite short. Adding a few more details helps me find the right section of the handbook.");
    }
    if has_unusual_characters(query) {
        text.push_str("\n\nYour question contains unusual characters. Try asking in plain words.");
    }

    text
}

fn has_unusual_characters(query: &str) -> bool {
    query.chars().any(|c| {
        !(c.is_alphanumeric() || c.is_whitespace() || "?.,!'\"-&()/:;".contains(c))
    })
}

/// Generation prompt: preamble, intent instructions, numbered excerpts,
/// section references and the literal question
pub fn build_prompt(
    query: &str,
    chunks: &[ScoredChunk],
    section_refs: &[String],
    intent: &IntentResult,
) -> String {
    let mut prompt = String::from(ROLE_PREAMBLE);
    prompt.push_str("\n\n");
    prompt.push_str(intent_instructions(intent.query_type));

    if !intent.focus_areas.is_empty() {
        let areas: Vec<&str> = intent.focus_areas.iter().map(FocusArea::label).collect();
        prompt.push_str(&format!("\nThe question concerns: {}.", areas.join(", ")));
    }

    prompt.push_str("\n\nSTUDENT HANDBOOK EXCERPTS:\n");
    for (i, scored) in chunks.iter().enumerate() {
        prompt.push_str(&format!("[{}] {}\n", i + 1, scored.chunk.content.trim()));
    }

    if !section_refs.is_empty() {
        prompt.push_str("\nSECTION REFERENCES:\n");
        for reference in section_refs {
            prompt.push_str(&format!("- {}\n", reference));
        }
    }

    prompt.push_str(&format!("\nQUESTION: {}\n\nANSWER:", query.trim()));
    prompt
}

fn intent_instructions(query_type: QueryType) -> &'static str {
    match query_type {
        QueryType::Location => "This is a location question. State the campus zone and the building number of the place asked about.",
        QueryType::Procedure => "This is a procedure question. List the steps as an ordered, numbered list and mention any deadlines.",
        QueryType::Policy => "This is a policy question. Cite the handbook chapter, article or section the rule comes from.",
        QueryType::General => "Answer directly in a few sentences.",
    }
}

/// Template answer quoting the top chunks verbatim
pub fn fallback_answer(chunks: &[ScoredChunk]) -> String {
    let mut text = String::from(TECHNICAL_DIFFICULTY_NOTICE);

    if chunks.is_empty() {
        text.push_str("\n\n");
        text.push_str(USAGE_TIP);
        return text;
    }

    for scored in chunks.iter().take(FALLBACK_CHUNKS) {
        text.push_str("\n\n");
        if let Some(reference) = scored.chunk.metadata.section_reference() {
            text.push_str(&format!("📖 {}\n", reference));
        }
        text.push_str(&scored.chunk.content);
    }

    text
}

/// Append follow-up questions and, for informative answers, one contact link
pub fn decorate(query: &str, answer: &str) -> String {
    let tokens: Vec<String> = normalize(query).split_whitespace().map(str::to_string).collect();
    let mentions = |keywords: &[&str]| keywords.iter().any(|k| tokens.iter().any(|t| t == k));

    let mut text = answer.to_string();

    if let Some(group) = FOLLOW_UPS.iter().find(|group| mentions(group.keywords)) {
        text.push_str("\n\n**Related questions:**");
        for question in group.questions {
            text.push_str(&format!("\n• {}", question));
        }
    }

    if is_informative(answer) {
        let link = CONTACT_LINKS
            .iter()
            .find(|link| mentions(link.keywords))
            .unwrap_or(&DEFAULT_CONTACT);
        text.push_str(&format!("\n\n🔗 More information: {} ({})", link.label, link.url));
    }

    text
}

/// Long enough, not declaring missing information, and carrying no link yet
pub fn is_informative(answer: &str) -> bool {
    let lowered = answer.to_lowercase();
    answer.trim().chars().count() >= INFORMATIVE_MIN_CHARS
        && !LACK_OF_INFO_PHRASES.iter().any(|p| lowered.contains(p))
        && !lowered.contains("http")
}
