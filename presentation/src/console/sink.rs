//! Terminal implementation of the render sink

use chatflow_application::{RenderSink, SessionSummary, TranscriptEntry};
use chatflow_domain::Role;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::time::Duration;

/// Render sink that writes the transcript to stdout.
///
/// Streaming entries are printed incrementally: each update writes only the
/// suffix added since the previous one, so the response appears token by
/// token on a single growing paragraph. The pending state shows an
/// indicatif spinner, cleared before the first token is printed.
pub struct ConsoleRenderSink {
    state: Mutex<SinkState>,
    quiet: bool,
}

#[derive(Default)]
struct SinkState {
    next_entry: u64,
    /// Role and cumulative text already printed, per open streaming entry.
    open: HashMap<u64, (Role, String)>,
    spinner: Option<ProgressBar>,
    history: Vec<SessionSummary>,
    active_id: Option<String>,
    history_expanded: bool,
}

impl Default for ConsoleRenderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleRenderSink {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SinkState::default()),
            quiet: false,
        }
    }

    /// Suppress the spinner and notifications; the transcript still prints.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Print the stored history list and keep the panel open until the next
    /// session switch.
    pub fn expand_history(&self) {
        let mut state = self.state.lock().unwrap();
        state.history_expanded = true;
        println!(
            "{}",
            format_history_list(&state.history, state.active_id.as_deref())
        );
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SinkState> {
        self.state.lock().unwrap()
    }
}

fn role_label(role: Role) -> String {
    match role {
        Role::User => "You".blue().bold().to_string(),
        Role::Assistant => "Assistant".green().bold().to_string(),
    }
}

/// The text still to print when sealing or updating a streamed entry, or
/// `None` when `text` does not extend what was already printed and must be
/// rendered in full instead. A failed send finalizes with a fixed apology
/// that replaces the streamed prefix, so splicing by length alone would
/// interleave the two.
fn trailing_suffix<'a>(text: &'a str, printed: &str) -> Option<&'a str> {
    text.strip_prefix(printed)
}

/// Format the session list, one line per session, newest first, the active
/// one marked with an asterisk.
fn format_history_list(sessions: &[SessionSummary], active_id: Option<&str>) -> String {
    if sessions.is_empty() {
        return "No chat history yet".dimmed().to_string();
    }

    let mut output = String::new();
    output.push_str(&"Chat history:".cyan().bold().to_string());
    for (i, session) in sessions.iter().enumerate() {
        let marker = if active_id == Some(session.id.as_str()) {
            "*"
        } else {
            " "
        };
        output.push_str(&format!(
            "\n {} {}. {}  {}",
            marker,
            i + 1,
            session.title,
            session
                .updated_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .dimmed()
        ));
    }
    output
}

impl RenderSink for ConsoleRenderSink {
    fn append_message(&self, role: Role, text: &str) {
        println!("{}: {}", role_label(role), text);
    }

    fn begin_streaming(&self, role: Role) -> TranscriptEntry {
        let mut state = self.lock();
        let entry = TranscriptEntry::new(state.next_entry);
        state.next_entry += 1;
        // Label is deferred to the first update so the spinner owns the
        // line until then
        state.open.insert(entry.id(), (role, String::new()));
        entry
    }

    fn update_streaming(&self, entry: TranscriptEntry, cumulative: &str) {
        let mut state = self.lock();
        let Some((role, printed)) = state.open.get_mut(&entry.id()) else {
            return;
        };

        if printed.is_empty() {
            print!("{}: ", role_label(*role));
        }
        match trailing_suffix(cumulative, printed) {
            Some(suffix) => print!("{}", suffix),
            // Cumulative text normally only grows; a rewrite starts over
            None => print!("\n{}: {}", role_label(*role), cumulative),
        }
        *printed = cumulative.to_string();
        let _ = io::stdout().flush();
    }

    fn finalize_streaming(&self, entry: TranscriptEntry, final_text: &str) {
        let mut state = self.lock();
        let (role, printed) = state
            .open
            .remove(&entry.id())
            .unwrap_or((Role::Assistant, String::new()));

        if printed.is_empty() {
            // Nothing streamed (error before the first token)
            println!("{}: {}", role_label(role), final_text);
        } else {
            match trailing_suffix(final_text, &printed) {
                Some(suffix) => println!("{}", suffix),
                // Final text replaced what streamed (failure mid-stream);
                // abandon the partial line and print it whole
                None => {
                    println!();
                    println!("{}: {}", role_label(role), final_text);
                }
            }
        }
        let _ = io::stdout().flush();
    }

    fn clear_transcript(&self) {
        // Clear the screen and home the cursor
        print!("\x1B[2J\x1B[1;1H");
        let _ = io::stdout().flush();
    }

    fn scroll_to_end(&self) {
        // The terminal scrolls on its own; just make sure output is visible
        let _ = io::stdout().flush();
    }

    fn set_pending(&self, pending: bool) {
        if self.quiet {
            return;
        }
        let mut state = self.lock();
        if pending {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message("Waiting for reply...");
            spinner.enable_steady_tick(Duration::from_millis(100));
            state.spinner = Some(spinner);
        } else if let Some(spinner) = state.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn notify(&self, text: &str) {
        if !self.quiet {
            println!("{}", text.dimmed());
        }
    }

    fn render_history_list(&self, sessions: &[SessionSummary], active_id: Option<&str>) {
        let mut state = self.lock();
        state.history = sessions.to_vec();
        state.active_id = active_id.map(str::to_string);
        if state.history_expanded {
            println!(
                "{}",
                format_history_list(&state.history, state.active_id.as_deref())
            );
        }
    }

    fn collapse_history(&self) {
        self.lock().history_expanded = false;
    }

    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn summary(id: &str, title: &str) -> SessionSummary {
        SessionSummary {
            id: id.to_string(),
            title: title.to_string(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn history_list_marks_the_active_session() {
        colored::control::set_override(false);
        let sessions = vec![summary("chat_a", "First chat"), summary("chat_b", "Second")];

        let output = format_history_list(&sessions, Some("chat_b"));
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[1].starts_with("   1. First chat"));
        assert!(lines[2].starts_with(" * 2. Second"));
    }

    #[test]
    fn empty_history_list_has_a_placeholder() {
        colored::control::set_override(false);
        assert_eq!(format_history_list(&[], None), "No chat history yet");
    }

    #[test]
    fn suffix_printed_only_when_final_text_extends_streamed() {
        assert_eq!(trailing_suffix("Hi there", "Hi"), Some(" there"));
        assert_eq!(trailing_suffix("Hi", "Hi"), Some(""));
    }

    #[test]
    fn apology_after_partial_stream_is_not_spliced() {
        // A transport error after "The answer" streamed finalizes the entry
        // with the fixed apology; it must be printed whole, not appended
        // from byte 10 onward
        let apology = "Sorry, I can't reply right now. Please try again later.";
        assert_eq!(trailing_suffix(apology, "The answer"), None);
    }

    #[test]
    fn streaming_entries_are_distinct() {
        let sink = ConsoleRenderSink::new();
        let a = sink.begin_streaming(Role::Assistant);
        let b = sink.begin_streaming(Role::Assistant);
        assert_ne!(a, b);
    }
}
