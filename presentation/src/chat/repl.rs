//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::console::ConsoleRenderSink;
use chatflow_application::{ChatController, SendError};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;

/// Interactive chat REPL
pub struct ChatRepl {
    controller: ChatController,
    sink: Arc<ConsoleRenderSink>,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(controller: ChatController, sink: Arc<ConsoleRenderSink>) -> Self {
        Self { controller, sink }
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        // Try to load readline history
        let history_path = dirs::data_dir().map(|p| p.join("chatflow").join("readline.txt"));

        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_banner();
        self.controller.start();

        loop {
            let readline = rl.readline(">>> ");

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    // Handle commands
                    if line.starts_with('/') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    // Add to history
                    let _ = rl.add_history_entry(line);

                    self.send(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        // Save readline history
        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_banner(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│              chatflow - Chat                │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Model: {}", self.controller.model());
        println!("Type a message, or /help for commands.");
        println!();
    }

    async fn send(&mut self, line: &str) {
        match self.controller.send_message(line).await {
            Ok(()) => {}
            Err(SendError::EmptyInput) => {}
            Err(SendError::Busy) => {
                println!("Still waiting for the previous reply.");
            }
        }
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&mut self, cmd: &str) -> bool {
        let mut parts = cmd.splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).unwrap_or_default();

        match command {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                true
            }
            "/help" | "/h" | "/?" => {
                self.print_help();
                false
            }
            "/new" => {
                self.controller.new_chat();
                false
            }
            "/history" => {
                self.sink.expand_history();
                false
            }
            "/switch" => {
                self.switch(arg);
                false
            }
            "/model" => {
                if arg.is_empty() {
                    println!("Current model: {}", self.controller.model());
                } else {
                    self.controller.set_model(arg);
                }
                false
            }
            "/clear" => {
                self.controller.clear_active();
                false
            }
            "/clear-all" => {
                self.controller.clear_all();
                false
            }
            _ => {
                println!("Unknown command: {}", command);
                println!("Type /help for available commands");
                false
            }
        }
    }

    fn print_help(&self) {
        println!();
        println!("Commands:");
        println!("  /new              - Start a new chat (current one is kept)");
        println!("  /history          - Show the chat history list");
        println!("  /switch <n|id>    - Switch to a chat by list number or id");
        println!("  /model [name]     - Show or switch the model");
        println!("  /clear            - Clear the current conversation view");
        println!("  /clear-all        - Delete all chat history");
        println!("  /help, /h, /?     - Show this help");
        println!("  /quit, /exit, /q  - Exit");
        println!();
    }

    /// `/switch` takes either a 1-based index into the history list (as
    /// shown by `/history`) or a raw session id.
    fn switch(&mut self, arg: &str) {
        if arg.is_empty() {
            println!("Usage: /switch <n|id>");
            return;
        }

        let id = match arg.parse::<usize>() {
            Ok(n) if n >= 1 => {
                let summaries = self.controller.session_summaries();
                match summaries.get(n - 1) {
                    Some(summary) => summary.id.clone(),
                    None => {
                        println!("No chat #{}: see /history", n);
                        return;
                    }
                }
            }
            _ => arg.to_string(),
        };

        if !self.controller.switch_to(&id) {
            println!("Unknown chat: {}", arg);
        }
    }
}
