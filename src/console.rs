//! Terminal front end for the interactive session
//!
//! Renders the transcript and status line with `console` styling and reads
//! commands from stdin on a dedicated thread.

use std::io::BufRead;
use std::time::Duration;

use console::{Term, style};
use tokio::sync::mpsc;

use crate::session::{Display, Mode, QuickCommand, SessionController, Speaker};

/// How often queued UI messages are applied
pub const DRAIN_INTERVAL: Duration = Duration::from_millis(100);

/// A parsed line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Text to place in the input box and execute (may be empty)
    Submit(String),
    /// `/mode <voice|stt|tts>`
    SetMode(Mode),
    /// `/quick <name>`
    Quick(QuickCommand),
    /// `/help`
    Help,
    /// `/quit` or end of input
    Quit,
    /// Unrecognized slash command
    Invalid(String),
}

impl InputEvent {
    /// Parse one line typed at the prompt
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix('/') else {
            return Self::Submit(line.to_string());
        };

        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(n, a)| (n, a.trim()));

        match name {
            "mode" => arg
                .parse::<Mode>()
                .map_or_else(|_| Self::Invalid(format!("unknown mode '{arg}'")), Self::SetMode),
            "quick" => arg.parse::<QuickCommand>().map_or_else(
                |_| Self::Invalid(format!("unknown quick command '{arg}'")),
                Self::Quick,
            ),
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => Self::Invalid(format!("unknown command '/{other}'")),
        }
    }
}

/// Styled transcript and status line on stdout
pub struct TerminalDisplay {
    term: Term,
    status: String,
}

impl TerminalDisplay {
    /// Display on the process stdout
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            term: Term::stdout(),
            status: String::new(),
        }
    }

    /// Print the banner and command summary
    pub fn show_help(&self) {
        self.write(&style("NOVA - voice assistant").bold().to_string());
        self.write("  <text>            execute in the current mode (empty line listens)");
        self.write("  /mode voice|stt|tts");
        self.write("  /quick music|time|date|youtube|google");
        self.write("  /help, /quit");
    }

    /// Print an error that is not part of the transcript
    pub fn show_error(&self, message: &str) {
        self.write(&style(message).red().to_string());
    }

    fn write(&self, line: &str) {
        if let Err(e) = self.term.write_line(line) {
            tracing::debug!(error = %e, "terminal write failed");
        }
    }
}

impl Display for TerminalDisplay {
    fn show_line(&mut self, speaker: Speaker, text: &str) {
        let line = format!("{}: {text}", speaker.label());
        let styled = match speaker {
            Speaker::User => style(line).cyan(),
            Speaker::Assistant => style(line).magenta(),
        };
        self.write(&styled.to_string());
    }

    fn show_status(&mut self, status: &str) {
        status.clone_into(&mut self.status);
        self.write(&style(format!("[{status}]")).dim().to_string());
    }

    fn clear_transcript(&mut self) {
        if self.term.is_term() && self.term.clear_screen().is_err() {
            tracing::debug!("terminal clear failed");
        }
    }

    fn show_placeholder(&mut self, placeholder: &str) {
        self.write(&style(format!("> {placeholder}")).italic().dim().to_string());
    }
}

/// Read stdin lines on a background thread
///
/// Sends [`InputEvent::Quit`] when stdin closes.
///
/// # Errors
///
/// Returns error if the thread cannot be spawned
pub fn spawn_input_reader(tx: mpsc::UnboundedSender<InputEvent>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("nova-stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let event = match line {
                    Ok(line) => InputEvent::parse(&line),
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read stdin");
                        break;
                    }
                };
                let quit = event == InputEvent::Quit;
                if tx.send(event).is_err() || quit {
                    return;
                }
            }
            let _ = tx.send(InputEvent::Quit);
        })?;
    Ok(())
}

/// Drive the session until the user quits or Ctrl+C is pressed
///
/// Owns the display thread: input events and queued UI messages are applied
/// here and nowhere else.
pub async fn run(
    controller: &mut SessionController<TerminalDisplay>,
    mut input: mpsc::UnboundedReceiver<InputEvent>,
) {
    let mut cadence = tokio::time::interval(DRAIN_INTERVAL);
    cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    controller.display().show_help();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = cadence.tick() => {
                controller.drain();
            }
            event = input.recv() => {
                let Some(event) = event else { break };
                if !apply(controller, event) {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    // Show anything workers posted before exit
    controller.drain();
}

/// Apply one input event; `false` means quit
fn apply(controller: &mut SessionController<TerminalDisplay>, event: InputEvent) -> bool {
    match event {
        InputEvent::Submit(text) => {
            controller.set_input(text);
            // Worker runs detached
            drop(controller.execute());
        }
        InputEvent::SetMode(mode) => controller.set_mode(mode),
        InputEvent::Quick(command) => drop(controller.quick_command(command)),
        InputEvent::Help => controller.display().show_help(),
        InputEvent::Invalid(message) => controller.display().show_error(&message),
        InputEvent::Quit => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text() {
        assert_eq!(
            InputEvent::parse("  what time is it "),
            InputEvent::Submit("what time is it".to_string())
        );
        assert_eq!(InputEvent::parse(""), InputEvent::Submit(String::new()));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(InputEvent::parse("/mode tts"), InputEvent::SetMode(Mode::TextToSpeech));
        assert_eq!(
            InputEvent::parse("/quick youtube"),
            InputEvent::Quick(QuickCommand::OpenYouTube)
        );
        assert_eq!(InputEvent::parse("/quit"), InputEvent::Quit);
        assert_eq!(InputEvent::parse("/help"), InputEvent::Help);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(InputEvent::parse("/mode karaoke"), InputEvent::Invalid(_)));
        assert!(matches!(InputEvent::parse("/dance"), InputEvent::Invalid(_)));
    }
}
