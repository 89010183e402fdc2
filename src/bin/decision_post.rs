//! Operator helper for exercising the decision handshake against a running
//! docrouter instance: submit a synthetic pending decision, or listen for the
//! resume callback a resolved decision produces.

use anyhow::{Context, Result};
use axum::{Json, Router, routing::post};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "decision-post",
    about = "Helper for exercising the routing decision handshake"
)]
struct Cli {
    /// Base URL of the docrouter server.
    #[arg(long, default_value = "http://127.0.0.1:8300")]
    server: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Queue a synthetic decision via POST /decisions/init.
    Submit {
        /// Request identifier; a fresh UUID when omitted.
        #[arg(long)]
        request_id: Option<String>,
        /// Callback URL the resolver should POST the outcome to.
        #[arg(long)]
        resume_url: String,
        /// Candidate destination; repeat for multiple.
        #[arg(long = "endpoint")]
        endpoints: Vec<String>,
        /// Suggested new destination.
        #[arg(long)]
        suggested: Option<String>,
        /// Preview text shown to the operator.
        #[arg(long)]
        preview: Option<String>,
    },
    /// Run a local listener printing every resume callback it receives.
    Listen {
        #[arg(long, default_value_t = 8399)]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Submit {
            request_id,
            resume_url,
            endpoints,
            suggested,
            preview,
        } => {
            let request_id = request_id.unwrap_or_else(|| Uuid::new_v4().to_string());
            let body = json!({
                "request_id": request_id,
                "resume_url": resume_url,
                "folder_endpoints": endpoints,
                "suggested_path": suggested,
                "preview_text": preview,
            });

            let response = reqwest::Client::new()
                .post(format!("{}/decisions/init", cli.server.trim_end_matches('/')))
                .json(&body)
                .send()
                .await
                .context("failed to reach the docrouter server")?;
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            println!("{status}: {text}");
            println!("queued request_id={request_id}");
            Ok(())
        }
        Command::Listen { port } => {
            let app = Router::new().route(
                "/resume",
                post(|Json(body): Json<Value>| async move {
                    println!("resume callback: {body}");
                    Json(json!({ "ok": true }))
                }),
            );
            let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
                .await
                .with_context(|| format!("failed to bind 127.0.0.1:{port}"))?;
            println!("listening for resume callbacks on http://127.0.0.1:{port}/resume");
            axum::serve(listener, app)
                .await
                .context("resume listener terminated")?;
            Ok(())
        }
    }
}
