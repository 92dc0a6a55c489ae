//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for chatflow
#[derive(Parser, Debug)]
#[command(name = "chatflow")]
#[command(author, version, about = "Streaming chat client for OpenAI-compatible endpoints")]
#[command(long_about = r#"
Chatflow is a terminal chat client for OpenAI-compatible completion
endpoints. Replies stream in token by token; conversations are kept in a
local history you can revisit with /history and /switch.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./chatflow.toml     Project-level config
3. ~/.config/chatflow/config.toml   Global config

The API key comes from the config file or the CHATFLOW_API_KEY
environment variable.

Example:
  chatflow                       Start an interactive chat
  chatflow "What is an SSE stream?"   One-shot question
  chatflow --model my-model      Override the configured model
"#)]
pub struct Cli {
    /// Message to send once and exit (omit for interactive chat)
    pub message: Option<String>,

    /// Model to use, overriding the configured one
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Path to the history file, overriding the configured one
    #[arg(long, value_name = "PATH")]
    pub history: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the pending spinner and notifications
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,
}
