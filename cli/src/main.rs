//! CLI entrypoint for chatflow
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use chatflow_application::ChatController;
use chatflow_infrastructure::{ConfigLoader, FileConfig, JsonHistoryStore, OpenAiGateway};
use chatflow_presentation::{ChatRepl, Cli, ConsoleRenderSink};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting chatflow");

    // Load configuration
    let mut config: FileConfig = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?
    };
    config.validate()?;

    if let Some(model) = cli.model {
        config.api.model = model;
    }

    let Some(api_key) = config.api.api_key.clone().filter(|k| !k.is_empty()) else {
        bail!(
            "No API key configured. Set CHATFLOW_API_KEY or add api_key under \
             [api] in your config file."
        );
    };

    let history_path: PathBuf = match cli.history {
        Some(path) => path,
        None => match &config.storage.history_path {
            Some(path) => PathBuf::from(path),
            None => ConfigLoader::default_history_path()
                .context("could not determine a data directory for the history file")?,
        },
    };

    // === Dependency Injection ===
    let gateway = Arc::new(OpenAiGateway::new(config.api.base_url.clone(), api_key)?);
    let store = Arc::new(JsonHistoryStore::new(history_path));
    let sink = Arc::new(ConsoleRenderSink::new().with_quiet(cli.quiet));

    let controller = ChatController::new(gateway, sink.clone(), store, config.api.model.clone())
        .with_generation(config.api.max_tokens, config.api.temperature)
        .with_welcome(config.chat.welcome_message.clone());

    // One-shot mode
    if let Some(message) = cli.message {
        let mut controller = controller;
        controller.send_message(&message).await?;
        return Ok(());
    }

    // Interactive chat
    let mut repl = ChatRepl::new(controller, sink);
    repl.run().await?;

    Ok(())
}
