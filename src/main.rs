use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cg_cli::{
    display_banner, handle_input_with_history, print_answer, print_health, print_help,
    CampusAssistant,
};
use cg_core::{HealthState, LLMProvider};
use cg_ollama::OllamaClient;
use cg_rag::{CorpusKnowledgeBase, RetrievalConfig};
use cg_router::{RouterConfig, RuleRouter};

#[derive(Parser)]
#[command(name = "campusguide")]
#[command(about = "Campus policy and navigation assistant", long_about = None)]
struct Cli {
    /// Answer a single message and exit
    #[arg(short, long)]
    message: Option<String>,

    /// Print knowledge base status and exit
    #[arg(long)]
    health: bool,

    /// Corpus file (overrides CORPUS_PATH)
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Model id (overrides OLLAMA_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Show handbook sources under retrieval answers
    #[arg(short, long)]
    sources: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .try_init()
        .ok();

    let cli = Cli::parse();

    let mut retrieval = RetrievalConfig::from_env()?;
    if let Some(corpus) = cli.corpus {
        retrieval.corpus_path = corpus;
    }
    let top_k = retrieval.top_k;

    let mut llm = OllamaClient::from_env()?;
    if let Some(model) = cli.model {
        llm = llm.with_model(model);
    }
    let generation = llm.generation_config();

    let router = RuleRouter::from_config(&RouterConfig::from_env())?;
    let knowledge = CorpusKnowledgeBase::from_config(retrieval);

    let assistant = CampusAssistant::with_generation_config(knowledge, router, llm, generation)
        .with_top_k(top_k);

    let health = assistant.start().await;
    info!(status = ?health.status, "CampusGuide started");

    if cli.health {
        print_health(health, &assistant.stats().await?);
        return Ok(());
    }

    if let Some(message) = cli.message {
        let answer = assistant.answer(&message).await?;
        if cli.sources {
            print_answer(&answer, true);
        } else {
            println!("{}", answer.text);
        }
        return Ok(());
    }

    display_banner(assistant.llm().model_id());
    if health.status != HealthState::Ready {
        println!(
            "{} Knowledge base is not loaded yet; answers may be limited until it is.",
            "⚠️".yellow()
        );
        println!();
    }

    let mut history = Vec::new();

    loop {
        let input = handle_input_with_history(&mut history).await?;

        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "exit" | "quit" => {
                println!("{}", "👋 Goodbye!".green());
                break;
            }
            "help" => {
                print_help();
                continue;
            }
            "status" => {
                print_health(assistant.health(), &assistant.stats().await?);
                continue;
            }
            _ => {}
        }

        println!("{} Thinking...", "🤖".blue());

        match assistant.answer(&input).await {
            Ok(answer) => print_answer(&answer, cli.sources),
            Err(e) => println!("{} {}", "❌".red(), e),
        }
    }

    Ok(())
}
