//! Shared test utilities
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use nova_assistant::intent::{FixedClock, IntentRouter, RouterServices};
use nova_assistant::session::{Display, SessionController, SessionServices, Speaker};
use nova_assistant::tools::{Browser, Encyclopedia, LookupFailure, MediaLauncher};
use nova_assistant::voice::{ListenStage, RecognitionFailure, SAMPLE_RATE, SpeechInput, SpeechOutput};

/// Records everything passed to it, in order
#[derive(Default)]
pub struct Recorder(Mutex<Vec<String>>);

impl Recorder {
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, entry: &str) {
        self.0.lock().unwrap().push(entry.to_string());
    }
}

impl SpeechOutput for Recorder {
    fn speak(&self, text: &str) {
        self.push(text);
    }
}

impl Browser for Recorder {
    fn open_url(&self, url: &str) -> nova_assistant::Result<()> {
        self.push(url);
        Ok(())
    }
}

impl MediaLauncher for Recorder {
    fn play(&self, term: &str) -> nova_assistant::Result<()> {
        self.push(term);
        Ok(())
    }
}

/// Encyclopedia with a canned answer
pub struct StubEncyclopedia(pub Result<String, LookupFailure>);

impl Encyclopedia for StubEncyclopedia {
    fn lookup(&self, _term: &str, _sentences: u32) -> Result<String, LookupFailure> {
        self.0.clone()
    }
}

/// Speech input that replays queued results
#[derive(Default)]
pub struct ScriptedInput(Mutex<VecDeque<Result<String, RecognitionFailure>>>);

impl ScriptedInput {
    pub fn new(results: impl IntoIterator<Item = Result<String, RecognitionFailure>>) -> Self {
        Self(Mutex::new(results.into_iter().collect()))
    }
}

impl SpeechInput for ScriptedInput {
    fn capture_with_progress(
        &self,
        progress: &dyn Fn(ListenStage),
    ) -> Result<String, RecognitionFailure> {
        progress(ListenStage::Recording);
        let next = self
            .0
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(RecognitionFailure::Timeout));
        if next.is_ok() {
            progress(ListenStage::Transcribing);
        }
        next
    }
}

/// What the controller asked the display to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    Line(Speaker, String),
    Status(String),
    Cleared,
    Placeholder(String),
}

/// Display that records every call
#[derive(Default)]
pub struct RecordingDisplay {
    pub shown: Vec<Shown>,
}

impl RecordingDisplay {
    pub fn statuses(&self) -> Vec<String> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::Status(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self) -> Vec<(Speaker, String)> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::Line(speaker, text) => Some((*speaker, text.clone())),
                _ => None,
            })
            .collect()
    }
}

impl Display for RecordingDisplay {
    fn show_line(&mut self, speaker: Speaker, text: &str) {
        self.shown.push(Shown::Line(speaker, text.to_string()));
    }

    fn show_status(&mut self, status: &str) {
        self.shown.push(Shown::Status(status.to_string()));
    }

    fn clear_transcript(&mut self) {
        self.shown.clear();
        self.shown.push(Shown::Cleared);
    }

    fn show_placeholder(&mut self, placeholder: &str) {
        self.shown.push(Shown::Placeholder(placeholder.to_string()));
    }
}

/// Fakes behind a router, kept for assertions
pub struct RouterHarness {
    pub router: Arc<IntentRouter>,
    pub speech: Arc<Recorder>,
    pub browser: Arc<Recorder>,
    pub media: Arc<Recorder>,
}

/// Router stopped at Sunday 2026-10-18 09:30
pub fn router_with(encyclopedia: StubEncyclopedia) -> RouterHarness {
    let speech = Arc::new(Recorder::default());
    let browser = Arc::new(Recorder::default());
    let media = Arc::new(Recorder::default());
    let now = NaiveDate::from_ymd_opt(2026, 10, 18)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .unwrap();

    let router = Arc::new(IntentRouter::new(RouterServices {
        speech: speech.clone(),
        browser: browser.clone(),
        encyclopedia: Arc::new(encyclopedia),
        media: media.clone(),
        clock: Arc::new(FixedClock(now)),
    }));

    RouterHarness {
        router,
        speech,
        browser,
        media,
    }
}

/// Router whose encyclopedia finds nothing
pub fn router() -> RouterHarness {
    router_with(StubEncyclopedia(Err(LookupFailure::NotFound("test".into()))))
}

/// Controller over a recording display and scripted input
pub fn controller(
    input: ScriptedInput,
) -> (SessionController<RecordingDisplay>, RouterHarness) {
    let harness = router();
    let services = SessionServices {
        speech: harness.speech.clone(),
        input: Arc::new(input),
        router: Arc::clone(&harness.router),
    };
    (
        SessionController::new(RecordingDisplay::default(), services),
        harness,
    )
}

/// Generate sine wave audio samples
pub fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Generate silence
pub fn generate_silence(duration_secs: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    vec![0.0; num_samples]
}
