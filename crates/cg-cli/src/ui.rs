//! Terminal output and line editing for the interactive assistant

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};

use cg_core::{HealthState, HealthStatus, Result, SourceSnippet};

use crate::assistant::{Answer, Route};

const PROMPT: &str = "you>";

/// Display startup banner
pub fn display_banner(model: &str) {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let inner = std::cmp::min(64, terminal_width.saturating_sub(6)).max(40);

    let border = "─".repeat(inner + 2);
    println!();
    println!("{}", format!("╭{}╮", border).blue());

    let lines = [
        "🎓 CampusGuide AI".to_string(),
        String::new(),
        "Ask about the student handbook or find your way".to_string(),
        "around campus.".to_string(),
        String::new(),
        "• Campus buildings, offices and zones".to_string(),
        "• Handbook policies and procedures".to_string(),
        "• ↑/↓ for history, Esc to clear, 'exit' to quit".to_string(),
        String::new(),
        format!("v{} • model: {}", env!("CARGO_PKG_VERSION"), model),
    ];

    for line in lines {
        let padding = inner.saturating_sub(line.chars().count());
        println!("{} {}{} {}", "│".blue(), line, " ".repeat(padding), "│".blue());
    }

    println!("{}", format!("╰{}╯", border).blue());
    println!();
    println!("{}", "💡 Tip: type 'help' for example questions".dimmed());
    println!();
}

/// Read one line, with ↑/↓ history navigation when attached to a terminal
pub async fn handle_input_with_history(history: &mut Vec<String>) -> Result<String> {
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(input);
    }

    enable_raw_mode()?;
    let result = read_line_raw(history);
    disable_raw_mode()?;
    println!();

    let input = result?;
    if !input.is_empty() {
        history.push(input.clone());
    }
    Ok(input)
}

fn read_line_raw(history: &[String]) -> Result<String> {
    let mut input: Vec<char> = Vec::new();
    let mut history_index: Option<usize> = None;

    redraw(&input, 0)?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        let previous_len = input.len();

        match key_event.code {
            KeyCode::Enter => return Ok(input.iter().collect::<String>().trim().to_string()),
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok("exit".to_string());
            }
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Esc => {
                input.clear();
                history_index = None;
            }
            KeyCode::Up if !history.is_empty() => {
                let index = match history_index {
                    None => history.len() - 1,
                    Some(i) => i.saturating_sub(1),
                };
                history_index = Some(index);
                input = history[index].chars().collect();
            }
            KeyCode::Down => match history_index {
                Some(i) if i + 1 < history.len() => {
                    history_index = Some(i + 1);
                    input = history[i + 1].chars().collect();
                }
                Some(_) => {
                    history_index = None;
                    input.clear();
                }
                None => {}
            },
            _ => continue,
        }

        redraw(&input, previous_len)?;
    }
}

fn redraw(input: &[char], previous_len: usize) -> Result<()> {
    let text: String = input.iter().collect();
    let stale = previous_len.saturating_sub(input.len());
    print!(
        "\r{} {}{}\r{} {}",
        PROMPT.green().bold(),
        text,
        " ".repeat(stale),
        PROMPT.green().bold(),
        text
    );
    io::stdout().flush()?;
    Ok(())
}

/// Display help message
pub fn print_help() {
    println!("{}", "Ask a question in your own words. Examples:".bold());
    println!("  {}", "Where is the ICT building?".green());
    println!("  {}", "What is the grading system?".green());
    println!("  {}", "How do I replace my lost ID?".green());
    println!("  {}", "What are the library hours?".green());
    println!();
    println!("{}", "Commands:".bold());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Show knowledge base status", "status".green());
    println!("  {} - Exit the application", "exit/quit".green());
}

/// Print an answer, optionally followed by its handbook sources
pub fn print_answer(answer: &Answer, show_sources: bool) {
    println!();
    println!("{} {}", "🎓".cyan(), answer.text);

    if show_sources && !answer.sources.is_empty() {
        println!();
        println!("{}", format_sources(&answer.sources).dimmed());
    }
    println!("{}", format!("[{}]", route_label(&answer.route)).dimmed());
    println!();
}

/// Numbered source list with section references when known
pub fn format_sources(sources: &[SourceSnippet]) -> String {
    let mut text = String::from("Sources:");
    for (i, source) in sources.iter().enumerate() {
        let location = source
            .metadata
            .section_reference()
            .map(|reference| format!("{} > {}", source.metadata.source, reference))
            .unwrap_or_else(|| source.metadata.source.clone());
        text.push_str(&format!("\n  {}. {}\n     {}", i + 1, location, source.content));
    }
    text
}

/// Short description of the route that produced an answer
pub fn route_label(route: &Route) -> String {
    match route {
        Route::Canned(rule) => format!("rule: {}", rule),
        Route::Generated => "handbook + model".to_string(),
        Route::Fallback => "handbook (model unavailable)".to_string(),
        Route::NoRelevantContent => "no handbook match".to_string(),
        Route::Unavailable => "knowledge base unavailable".to_string(),
        Route::Apology => "error".to_string(),
    }
}

/// Print health status and knowledge base statistics
pub fn print_health(health: HealthStatus, stats: &serde_json::Value) {
    let status = match health.status {
        HealthState::Ready => "ready".green().bold(),
        HealthState::Initializing => "initializing".yellow().bold(),
    };
    println!("{} {}", "Status:".bold(), status);

    if let Some(object) = stats.as_object() {
        for (key, value) in object {
            if key == "health" {
                continue;
            }
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            println!("  {}: {}", key.dimmed(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_core::ChunkMetadata;

    #[test]
    fn test_format_sources() {
        let sources = vec![
            SourceSnippet {
                content: "Absences beyond 20% ...".to_string(),
                metadata: ChunkMetadata {
                    source: "Student Handbook".to_string(),
                    article: Some("Art. 9. Attendance".to_string()),
                    ..Default::default()
                },
            },
            SourceSnippet {
                content: "Library hours".to_string(),
                metadata: ChunkMetadata {
                    source: "Student Handbook".to_string(),
                    ..Default::default()
                },
            },
        ];

        assert_eq!(
            format_sources(&sources),
            "Sources:\n  1. Student Handbook > Art. 9. Attendance\n     Absences beyond 20% ...\n  2. Student Handbook\n     Library hours"
        );
    }

    #[test]
    fn test_route_labels() {
        assert_eq!(route_label(&Route::Canned("faq:what is ustp".to_string())), "rule: faq:what is ustp");
        assert_eq!(route_label(&Route::Fallback), "handbook (model unavailable)");
    }
}
