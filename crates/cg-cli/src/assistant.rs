//! Request orchestration: readiness gate, rule router, retrieval pipeline

use cg_core::{
    ChatRequest, ChatResponse, Error, GenerationConfig, HealthStatus, KnowledgeBase, LLMProvider,
    Result, Retrieval, RetrievalQuery, SourceSnippet,
};
use cg_rag::normalize;
use cg_router::RuleRouter;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::intent_analyzer::IntentAnalyzer;
use crate::synthesizer::{ResponseSynthesizer, Synthesis};

/// Returned when the corpus cannot be loaded
pub const UNAVAILABLE_MESSAGE: &str = "⚠️ The CampusGuide knowledge base is currently unavailable. Please try again in a few minutes.";

/// Returned when request handling hits an unexpected defect
pub const APOLOGY_MESSAGE: &str = "😔 Sorry, something went wrong while answering your question. Please try again.";

pub const DEFAULT_TOP_K: usize = 5;

/// Which path produced an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", content = "rule", rename_all = "snake_case")]
pub enum Route {
    /// Rule router answer, with the matching rule
    Canned(String),
    Generated,
    Fallback,
    NoRelevantContent,
    Unavailable,
    Apology,
}

/// A finished answer with its routing trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub route: Route,
    pub sources: Vec<SourceSnippet>,
}

impl Answer {
    fn fixed(text: &str, route: Route) -> Self {
        Self {
            text: text.to_string(),
            route,
            sources: Vec::new(),
        }
    }
}

impl From<Answer> for ChatResponse {
    fn from(answer: Answer) -> Self {
        ChatResponse {
            response: answer.text,
            sources: answer.sources,
        }
    }
}

/// Campus assistant answering one message at a time
pub struct CampusAssistant<K: KnowledgeBase, L: LLMProvider> {
    knowledge: K,
    router: RuleRouter,
    analyzer: IntentAnalyzer,
    synthesizer: ResponseSynthesizer<L>,
    top_k: usize,
}

impl<K: KnowledgeBase, L: LLMProvider> CampusAssistant<K, L> {
    pub fn new(knowledge: K, router: RuleRouter, llm: L) -> Self {
        Self::with_synthesizer(knowledge, router, ResponseSynthesizer::new(llm))
    }

    pub fn with_synthesizer(knowledge: K, router: RuleRouter, synthesizer: ResponseSynthesizer<L>) -> Self {
        Self {
            knowledge,
            router,
            analyzer: IntentAnalyzer::new(),
            synthesizer,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Use a custom generation configuration for the model call
    pub fn with_generation_config(knowledge: K, router: RuleRouter, llm: L, generation: GenerationConfig) -> Self {
        Self::with_synthesizer(knowledge, router, ResponseSynthesizer::with_generation_config(llm, generation))
    }

    /// Number of chunks requested from the retriever
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn knowledge(&self) -> &K {
        &self.knowledge
    }

    pub fn router(&self) -> &RuleRouter {
        &self.router
    }

    pub fn llm(&self) -> &L {
        self.synthesizer.llm()
    }

    /// Readiness as reported to the API layer
    pub fn health(&self) -> HealthStatus {
        self.knowledge.readiness().into()
    }

    /// Load the corpus at startup; failure leaves the assistant degraded
    pub async fn start(&self) -> HealthStatus {
        if let Err(e) = self.knowledge.load().await {
            warn!("Initial corpus load failed: {}", e);
        }
        self.health()
    }

    /// Handle an API request
    pub async fn respond(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let message = request
            .message
            .as_deref()
            .ok_or_else(|| Error::InvalidInput("message is required".to_string()))?;
        Ok(self.answer(message).await?.into())
    }

    /// Answer a message. `Err` only for an empty message.
    pub async fn answer(&self, message: &str) -> Result<Answer> {
        if message.trim().is_empty() {
            return Err(Error::InvalidInput("message must not be empty".to_string()));
        }

        if let Err(e) = self.knowledge.ensure_ready().await {
            warn!("Knowledge base unavailable: {}", e);
            return Ok(Answer::fixed(UNAVAILABLE_MESSAGE, Route::Unavailable));
        }

        match self.pipeline(message).await {
            Ok(answer) => {
                info!(route = ?answer.route, "answered");
                Ok(answer)
            }
            Err(e) => {
                error!("Request failed unexpectedly: {}", e);
                Ok(Answer::fixed(APOLOGY_MESSAGE, Route::Apology))
            }
        }
    }

    async fn pipeline(&self, message: &str) -> Result<Answer> {
        let normalized = normalize(message);

        if let Some(matched) = self.router.route(&normalized) {
            return Ok(Answer {
                text: matched.answer,
                route: Route::Canned(matched.rule),
                sources: Vec::new(),
            });
        }

        let retrieval = self
            .knowledge
            .retrieve(&RetrievalQuery::new(normalized.as_str(), self.top_k))
            .await?;
        let intent = self.analyzer.analyze(&normalized);
        let synthesis = self.synthesizer.synthesize(message, &retrieval, &intent).await;

        let route = match &synthesis {
            Synthesis::Generated(_) => Route::Generated,
            Synthesis::Fallback(_) => Route::Fallback,
            Synthesis::NoRelevantContent(_) => Route::NoRelevantContent,
        };

        Ok(Answer {
            text: synthesis.into_text(),
            route,
            sources: sources(&retrieval),
        })
    }

    /// Knowledge base statistics plus the current health status
    pub async fn stats(&self) -> Result<serde_json::Value> {
        let mut stats = self.knowledge.stats().await?;
        if let Some(object) = stats.as_object_mut() {
            object.insert("health".to_string(), serde_json::to_value(self.health())?);
            object.insert("model".to_string(), self.llm().model_id().into());
        }
        Ok(stats)
    }
}

fn sources(retrieval: &Retrieval) -> Vec<SourceSnippet> {
    retrieval
        .chunks()
        .iter()
        .map(|scored| SourceSnippet::from_chunk(&scored.chunk))
        .collect()
}
