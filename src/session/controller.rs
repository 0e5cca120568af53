//! Mode handling and request dispatch

use std::sync::Arc;
use std::thread::JoinHandle;

use uuid::Uuid;

use super::message::{Speaker, UiMessage, UiReceiver, UiSender, ui_queue};
use super::mode::{Mode, QuickCommand};
use crate::intent::{IntentRouter, UtteranceEvent};
use crate::voice::{ListenStage, RecognitionFailure, SpeechInput, SpeechOutput};

/// Status after a typed text has been spoken
pub const STATUS_FINISHED_SPEAKING: &str = "Finished speaking";
/// Status while a phrase is being recorded
pub const STATUS_LISTENING: &str = "Listening... Speak now";
/// Status while the recorded phrase is transcribed
pub const STATUS_TRANSCRIBING: &str = "Processing speech...";
/// Status while a recognized command is routed
pub const STATUS_PROCESSING: &str = "Processing...";
/// Status when idle
pub const STATUS_READY: &str = "Ready";
/// Status while typed text is spoken
pub const STATUS_SPEAKING: &str = "Speaking...";
/// Status after a successful transcription
pub const STATUS_CONVERTED: &str = "Speech converted successfully";

/// What the session is doing, for the status display only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvisoryState {
    /// Nothing in flight
    #[default]
    Idle,
    /// Recording a phrase
    Listening,
    /// Transcribing or routing
    Processing,
    /// Speaking typed text
    Speaking,
}

impl AdvisoryState {
    /// State implied by a status text posted by a worker
    #[must_use]
    pub fn from_status(status: &str) -> Self {
        match status {
            STATUS_LISTENING => Self::Listening,
            STATUS_TRANSCRIBING | STATUS_PROCESSING => Self::Processing,
            STATUS_SPEAKING => Self::Speaking,
            _ => Self::Idle,
        }
    }
}

/// Rendering surface owned by the display thread
pub trait Display {
    /// Append a transcript line
    fn show_line(&mut self, speaker: Speaker, text: &str);

    /// Replace the status line
    fn show_status(&mut self, status: &str);

    /// Remove all transcript lines
    fn clear_transcript(&mut self);

    /// Show an input hint
    fn show_placeholder(&mut self, placeholder: &str);
}

/// Collaborators shared with worker threads
#[derive(Clone)]
pub struct SessionServices {
    /// Speech output for typed text
    pub speech: Arc<dyn SpeechOutput>,
    /// Speech input for listening requests
    pub input: Arc<dyn SpeechInput>,
    /// Command routing
    pub router: Arc<IntentRouter>,
}

/// Owns the mode and the input line, and dispatches execute requests
///
/// Lives on the display thread. Requests run on detached worker threads that
/// report back only through the UI queue.
pub struct SessionController<D: Display> {
    display: D,
    mode: Mode,
    input: String,
    state: AdvisoryState,
    services: SessionServices,
    tx: UiSender,
    rx: UiReceiver,
}

impl<D: Display> SessionController<D> {
    /// Create a controller in [`Mode::VoiceCommand`]
    pub fn new(display: D, services: SessionServices) -> Self {
        let (tx, rx) = ui_queue();
        Self {
            display,
            mode: Mode::default(),
            input: String::new(),
            state: AdvisoryState::Idle,
            services,
            tx,
            rx,
        }
    }

    /// Current mode
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Current input line
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Current advisory state
    #[must_use]
    pub const fn state(&self) -> AdvisoryState {
        self.state
    }

    /// The display surface
    #[must_use]
    pub const fn display(&self) -> &D {
        &self.display
    }

    /// Producer handle for the UI queue
    #[must_use]
    pub fn sender(&self) -> UiSender {
        self.tx.clone()
    }

    /// Switch mode, clearing the transcript and resetting the input hint
    pub fn set_mode(&mut self, mode: Mode) {
        tracing::info!(mode = %mode, "mode changed");
        self.mode = mode;
        self.display.clear_transcript();
        self.input = mode.placeholder().to_string();
        self.display.show_placeholder(mode.placeholder());
        self.display.show_status(&format!("Mode set to {}", mode.display_name()));
    }

    /// Replace the input line
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Fill the input with a shortcut and execute it
    pub fn quick_command(&mut self, command: QuickCommand) -> Option<JoinHandle<()>> {
        self.set_input(command.text());
        self.execute()
    }

    /// Act on the input according to the mode
    ///
    /// Returns the worker handle when a request was started. Dropping it
    /// leaves the worker detached.
    pub fn execute(&mut self) -> Option<JoinHandle<()>> {
        match self.mode {
            Mode::TextToSpeech => self.speak_input(),
            Mode::SpeechToText => self.listen(false),
            Mode::VoiceCommand => match self.typed_input() {
                Some(text) => self.route_typed(text),
                None => self.listen(true),
            },
        }
    }

    /// Apply every queued UI message; returns how many were applied
    pub fn drain(&mut self) -> usize {
        let messages = self.rx.drain();
        let count = messages.len();

        for message in messages {
            match message {
                UiMessage::Line {
                    speaker,
                    text,
                    status,
                } => {
                    self.display.show_line(speaker, &text);
                    if let Some(status) = status {
                        self.apply_status(&status);
                    }
                }
                UiMessage::Status(status) => self.apply_status(&status),
            }
        }

        count
    }

    fn apply_status(&mut self, status: &str) {
        self.state = AdvisoryState::from_status(status);
        self.display.show_status(status);
    }

    /// Input text that the user actually typed
    fn typed_input(&self) -> Option<String> {
        let text = self.input.trim();
        let is_placeholder = Mode::ALL.iter().any(|m| m.placeholder() == text);
        (!text.is_empty() && !is_placeholder).then(|| text.to_string())
    }

    fn speak_input(&mut self) -> Option<JoinHandle<()>> {
        let text = self.typed_input()?;

        self.display.show_line(Speaker::User, &text);
        self.apply_status(STATUS_SPEAKING);
        self.input.clear();

        let speech = Arc::clone(&self.services.speech);
        let tx = self.tx.clone();
        spawn_worker("speak", &self.tx, move || {
            speech.speak(&text);
            tx.status(STATUS_FINISHED_SPEAKING);
        })
    }

    fn route_typed(&mut self, text: String) -> Option<JoinHandle<()>> {
        self.display.show_line(Speaker::User, &text);
        self.apply_status(STATUS_PROCESSING);
        self.input.clear();

        let router = Arc::clone(&self.services.router);
        let tx = self.tx.clone();
        spawn_worker("command", &self.tx, move || {
            let response = router.handle(UtteranceEvent::typed(text));
            tx.line(Speaker::Assistant, response.text, Some(STATUS_READY));
        })
    }

    fn listen(&self, route: bool) -> Option<JoinHandle<()>> {
        let services = self.services.clone();
        let tx = self.tx.clone();
        spawn_worker("listen", &self.tx, move || {
            let progress = |stage: ListenStage| match stage {
                ListenStage::Recording => tx.status(STATUS_LISTENING),
                ListenStage::Transcribing => tx.status(STATUS_TRANSCRIBING),
            };

            let text = match services.input.capture_with_progress(&progress) {
                Ok(text) => text,
                Err(failure) => {
                    tracing::info!(failure = %failure, "recognition failed");
                    tx.status(failure_status(&failure));
                    return;
                }
            };

            if !route {
                tx.line(Speaker::User, text, Some(STATUS_CONVERTED));
                return;
            }

            tx.line(Speaker::User, text.clone(), Some(STATUS_PROCESSING));
            let response = services.router.handle(UtteranceEvent::transcribed(text));
            tx.line(Speaker::Assistant, response.text, Some(STATUS_READY));
        })
    }
}

/// Status text for a recognition failure
#[must_use]
pub fn failure_status(failure: &RecognitionFailure) -> String {
    match failure {
        RecognitionFailure::Timeout => "No speech detected".to_string(),
        RecognitionFailure::Unintelligible => "Could not understand audio".to_string(),
        RecognitionFailure::ServiceUnreachable(_) => "Check internet connection".to_string(),
        RecognitionFailure::Other(detail) => error_status(detail),
    }
}

/// `Error: <first 30 chars>...`
#[must_use]
pub fn error_status(detail: &str) -> String {
    let head: String = detail.chars().take(30).collect();
    format!("Error: {head}...")
}

/// Run `work` on a named worker thread inside a per-request span
fn spawn_worker<F>(kind: &'static str, tx: &UiSender, work: F) -> Option<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    let request = Uuid::new_v4();
    let span = tracing::info_span!("request", id = %request, kind);
    let name = format!("nova-{kind}-{}", &request.simple().to_string()[..8]);

    let body = move || {
        let _guard = span.enter();
        tracing::debug!("worker started");
        work();
        tracing::debug!("worker finished");
    };

    match std::thread::Builder::new().name(name).spawn(body) {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::error!(error = %e, "failed to spawn worker thread");
            tx.status(error_status(&e.to_string()));
            None
        }
    }
}
