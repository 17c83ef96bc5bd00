//! # Clause Chat CLI (`clq`)
//!
//! The `clq` binary is the terminal interface for Clause Chat. It provides
//! commands for listing and watching uploaded documents, uploading a PDF,
//! deleting a document, and holding an interactive conversation about one.
//!
//! ## Usage
//!
//! ```bash
//! clq --config ./config/clq.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `clq files` | List uploaded documents and their processing status |
//! | `clq watch` | Live document list, refreshed on the poll interval |
//! | `clq upload <path>` | Upload a PDF and refresh the list immediately |
//! | `clq delete <uid>` | Delete a document from the backend |
//! | `clq chat <uid>` | Interactive Q&A about one document |
//!
//! When no config file exists, the backend base URL is taken from the
//! `CLQ_BACKEND_URL` environment variable.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use clause_chat::client::BackendClient;
use clause_chat::config;
use clause_chat::models::Role;
use clause_chat::prompts::SUGGESTED_PROMPTS;
use clause_chat::registry::{run_poller, DocumentRegistry};
use clause_chat::session::{ChatSession, SendOutcome};

/// Clause Chat — upload Terms & Conditions documents and chat about them
/// against a RAG backend.
#[derive(Parser)]
#[command(
    name = "clq",
    about = "Clause Chat — upload T&C documents and chat about them against a RAG backend",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/clq.toml`. Falls back to the `CLQ_BACKEND_URL`
    /// environment variable when the file does not exist.
    #[arg(long, global = true, default_value = "./config/clq.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// List uploaded documents and their processing status.
    ///
    /// One-shot refresh of the document registry. An empty backend prints
    /// guidance to upload a file; a failure prints the resolved error.
    Files,

    /// Watch the document list, refreshed on the configured poll interval.
    ///
    /// Runs until Ctrl-C. Status values are opaque backend text; the client
    /// only ever reflects the last polled value.
    Watch,

    /// Upload a PDF and refresh the document list immediately.
    Upload {
        /// Path to the PDF file to upload.
        path: PathBuf,
    },

    /// Delete a document from the backend.
    Delete {
        /// Document uid (as shown by `clq files`).
        uid: String,
    },

    /// Chat interactively about one document.
    ///
    /// Lines are sent as questions. `/prompts` lists starter prompts,
    /// `/prompt <n>` pre-fills one (Enter sends it), `/quit` exits.
    Chat {
        /// Document uid (as shown by `clq files`).
        uid: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::resolve_config(&cli.config)?;
    let client = Arc::new(BackendClient::new(&cfg)?);

    match cli.command {
        Commands::Files => {
            let mut registry = DocumentRegistry::new(client);
            registry.refresh().await;
            print_registry(&registry);
        }
        Commands::Watch => {
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(async move {
                let _ = tokio::signal::ctrl_c().await;
                let _ = shutdown_tx.send(true);
            });

            println!(
                "Watching documents on {} every {}s (Ctrl-C to stop)",
                client.base_url(),
                cfg.registry.poll_secs
            );
            let mut registry = DocumentRegistry::new(client);
            run_poller(&mut registry, cfg.registry.poll_secs, shutdown_rx, |r| {
                println!();
                print_registry(r);
            })
            .await;
        }
        Commands::Upload { path } => {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow::anyhow!("Invalid file path: {}", path.display()))?
                .to_string();
            let bytes = tokio::fs::read(&path).await?;

            let mut registry = DocumentRegistry::new(client);
            match registry.upload_and_refresh(&name, bytes).await {
                Ok(message) => {
                    println!("{}", message);
                    print_registry(&registry);
                }
                Err(e) => eprintln!("error: {}", e),
            }
        }
        Commands::Delete { uid } => {
            let mut registry = DocumentRegistry::new(client);
            match registry.delete_document(&uid).await {
                Ok(message) => println!("{}", message),
                Err(e) => eprintln!("error: {}", e),
            }
        }
        Commands::Chat { uid } => {
            run_chat(client, uid).await?;
        }
    }

    Ok(())
}

/// Print the registry as a table, followed by any notice.
fn print_registry(registry: &DocumentRegistry) {
    if !registry.files().is_empty() {
        println!("{:<5} {:<38} {:<28} STATUS", "ID", "UID", "NAME");
        for f in registry.files() {
            println!("{:<5} {:<38} {:<28} {}", f.id, f.uid, f.name, f.status);
        }
    }
    if let Some(notice) = registry.notice() {
        if notice.is_failure() {
            eprintln!("error: {}", notice.text());
        } else {
            println!("{}", notice.text());
        }
    }
}

/// Interactive chat loop over stdin.
async fn run_chat(client: Arc<BackendClient>, uid: String) -> Result<()> {
    let mut session = ChatSession::new(client, uid);
    println!("Chatting about document {}.", session.file_uid());
    println!("Type a question. /prompts lists starter prompts, /prompt <n> picks one, /quit exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if let Some(pending) = session.pending() {
            println!("\n[pending] {}", pending);
            print!("Enter to send, or type your own question> ");
        } else {
            print!("\nyou> ");
        }
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim().to_string();

        match input.as_str() {
            "/quit" | "/exit" => break,
            "/prompts" => {
                for (i, p) in SUGGESTED_PROMPTS.iter().enumerate() {
                    println!("{}. {}\n   {}", i + 1, p.heading, p.prompt);
                }
                continue;
            }
            _ => {}
        }

        if let Some(rest) = input.strip_prefix("/prompt") {
            match rest.trim().parse::<usize>() {
                Ok(n) if (1..=SUGGESTED_PROMPTS.len()).contains(&n) => {
                    session.select_suggested_prompt(SUGGESTED_PROMPTS[n - 1].prompt);
                }
                _ => println!("Usage: /prompt <1..{}>", SUGGESTED_PROMPTS.len()),
            }
            continue;
        }

        // An empty line sends the pending prompt, if one was picked; typed
        // input always wins over a pending prompt.
        let question = if input.is_empty() {
            match session.take_pending() {
                Some(p) => p,
                None => continue,
            }
        } else {
            session.take_pending();
            input
        };

        if session.send(&question).await == SendOutcome::Sent {
            print_reply(&session);
        }
    }

    Ok(())
}

/// Print the latest reply (answer text is rendered verbatim).
fn print_reply(session: &ChatSession) {
    let Some(reply) = session.transcript().last() else {
        return;
    };
    match reply.role {
        Role::Ai => {
            println!("\nai> {}", reply.text);
            if let Some(c) = &reply.citation {
                match &c.page {
                    Some(page) => println!("    [source: {}, page {}]", c.source, page),
                    None => println!("    [source: {}]", c.source),
                }
            }
        }
        Role::Error => println!("\nerror> {}", reply.text),
        Role::User => {}
    }
}
