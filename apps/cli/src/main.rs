use std::{future::Future, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{Anchor, GatewayConfig, HttpGateway, IgnoreReason, SessionController};
use shared::domain::Language;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod render;

use commands::{parse_command, Command, HELP};
use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "veritas", about = "Interactive fact-check client")]
struct Args {
    /// Base URL of the fact-check service.
    #[arg(long)]
    server_url: Option<String>,
    /// Settings file (defaults to ./veritas.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.request_timeout_secs = timeout_secs;
    }

    let gateway_config = GatewayConfig::new(&settings.server_url)?
        .with_timeout(settings.request_timeout());
    let gateway = HttpGateway::new(gateway_config).context("failed to start gateway")?;
    info!(server_url = %settings.server_url, "fact-check gateway ready");

    let session = SessionController::with_event_capacity(Arc::new(gateway), settings.event_capacity);
    let renderer = tokio::spawn(render::render_loop(
        session.clone(),
        session.subscribe_events(),
    ));

    println!("Enter a statement to verify its accuracy (:help for commands).");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => dispatch(&session, command),
            Err(err) => eprintln!("{err}"),
        }
    }

    // Give the renderer a moment to flush anything already queued.
    tokio::time::sleep(Duration::from_millis(50)).await;
    renderer.abort();
    Ok(())
}

fn spawn_intent<F, Fut>(session: &Arc<SessionController>, intent: F)
where
    F: FnOnce(Arc<SessionController>) -> Fut,
    Fut: Future + Send + 'static,
    Fut::Output: Send + 'static,
{
    tokio::spawn(intent(session.clone()));
}

fn source_anchor(source: &str) -> Anchor {
    Anchor::new(format!("cli:source:{source}"))
}

fn note_ignored(command: &'static str, outcome: Result<(), IgnoreReason>) {
    if let Err(reason) = outcome {
        debug!(command, ?reason, "cli: command had no effect");
    }
}

fn dispatch(session: &Arc<SessionController>, command: Command) {
    match command {
        Command::Submit(text) => {
            session.set_draft(text);
            spawn_intent(session, |session| async move { session.submit_draft().await });
        }
        Command::Retry => {
            spawn_intent(session, |session| async move { session.retry_last().await });
        }
        Command::OpenSource(source) => {
            note_ignored("open", session.open_source_menu(&source, source_anchor(&source)));
        }
        Command::CloseSource(source) => {
            note_ignored("close", session.close_source_menu(&source));
        }
        Command::SourceLanguage { source, language } => {
            note_ignored("lang", session.select_source_language(&source, language));
        }
        Command::Summary(source) => {
            spawn_intent(session, |session| async move {
                session.request_summary(&source).await
            });
        }
        Command::Translate(id) => {
            let outcome = id
                .or_else(|| session.latest_explanation_id())
                .ok_or(IgnoreReason::NoExplanation)
                .and_then(|id| {
                    session.open_translate_menu_for(id, Anchor::new(format!("cli:message:{id}")))
                });
            note_ignored("translate", outcome);
        }
        Command::TranslateLanguage(language) => session.select_translate_language(language),
        Command::TranslateGo => {
            spawn_intent(session, |session| async move {
                session.request_translation().await
            });
        }
        Command::TranslateClose => session.close_translate_menu(),
        Command::Dismiss => session.close_result(),
        Command::Languages => {
            let names: Vec<&str> = Language::ALL.iter().map(|language| language.name()).collect();
            println!("{}", names.join(", "));
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}
