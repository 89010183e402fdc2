//! Human-facing decision surfaces.
//!
//! The resolver talks to a [`DecisionPrompt`] rather than a hardwired
//! console, so the interaction surface can be swapped (console, web UI,
//! scripted test double). The console implementation mirrors the operator
//! workflow: render a menu, read one choice, read a path when creating.

use async_trait::async_trait;
use std::io::{BufRead, Write};

use super::types::PendingDecision;

/// Longest preview shown to the operator, in characters.
const PREVIEW_LIMIT: usize = 1000;

/// One human reply to a presented decision.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptReply {
    /// 1-indexed selection into the candidate list.
    Select(usize),
    /// Create a new destination, optionally overriding the suggested path.
    Create(Option<String>),
    /// Input that could not be parsed as a selection or create directive.
    Unrecognized(String),
}

/// A channel capable of presenting one decision and collecting one reply.
#[async_trait]
pub trait DecisionPrompt: Send + Sync {
    /// Present `decision` to a human and return their reply.
    ///
    /// May suspend indefinitely; only one decision is ever live at a time.
    async fn choose(&self, decision: &PendingDecision) -> PromptReply;
}

/// Interactive prompt on the service's controlling terminal.
pub struct ConsolePrompt;

#[async_trait]
impl DecisionPrompt for ConsolePrompt {
    async fn choose(&self, decision: &PendingDecision) -> PromptReply {
        let menu = render_menu(decision);
        let suggested = decision
            .suggested_path
            .clone()
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_default();

        // Stdin reads must not stall the runtime; park them on a blocking thread.
        let joined = tokio::task::spawn_blocking(move || {
            let stdin = std::io::stdin();
            let mut lines = stdin.lock();

            print!("{menu}");
            let _ = std::io::stdout().flush();

            let mut choice = String::new();
            if lines.read_line(&mut choice).is_err() {
                return PromptReply::Unrecognized(String::new());
            }
            let choice = choice.trim().to_string();

            if choice.eq_ignore_ascii_case("c") {
                print!("New path [{suggested}]: ");
                let _ = std::io::stdout().flush();
                let mut path = String::new();
                if lines.read_line(&mut path).is_err() {
                    return PromptReply::Unrecognized(choice);
                }
                let path = path.trim().to_string();
                return PromptReply::Create((!path.is_empty()).then_some(path));
            }

            match choice.parse::<usize>() {
                Ok(index) => PromptReply::Select(index),
                Err(_) => PromptReply::Unrecognized(choice),
            }
        })
        .await;

        match joined {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = %err, "Console prompt task failed");
                PromptReply::Unrecognized(String::new())
            }
        }
    }
}

/// Render the operator menu for one decision.
pub fn render_menu(decision: &PendingDecision) -> String {
    let mut out = String::new();
    out.push_str("\n================= DECISION REQUIRED =================\n");
    out.push_str(&format!("request_id: {}\n", decision.request_id));
    out.push_str("Existing endpoints:\n");
    for (index, path) in decision.folder_endpoints.iter().enumerate() {
        out.push_str(&format!("  [{}] {}\n", index + 1, path));
    }
    if let Some(suggested) = decision
        .suggested_path
        .as_deref()
        .filter(|path| !path.trim().is_empty())
    {
        out.push_str(&format!("Suggested NEW path: {suggested}\n"));
    }
    if let Some(preview) = decision
        .preview_text
        .as_deref()
        .filter(|text| !text.is_empty())
    {
        let bounded: String = preview.chars().take(PREVIEW_LIMIT).collect();
        out.push_str(&format!("\n[TEXT PREVIEW <={PREVIEW_LIMIT}]:\n{bounded}\n"));
    }
    out.push_str("\nChoose: number 1..N, or 'c' to create new (then enter path).\n> ");
    out
}
