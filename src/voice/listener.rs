//! Speech input: record one phrase and transcribe it

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::capture::{AudioCapture, samples_to_wav};
use super::phrase::{ListenTiming, PhraseDetector, PhraseProgress};
use super::stt::{RecognitionFailure, Transcriber};

/// How often the capture buffer is drained into the detector
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One recorded phrase
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPhrase {
    /// Mono samples
    pub samples: Vec<f32>,
    /// Sample rate of `samples`
    pub sample_rate: u32,
}

/// Records a single phrase from an input device
pub trait Microphone: Send + Sync {
    /// Block until a phrase is recorded or no speech starts in time
    ///
    /// # Errors
    ///
    /// `Timeout` when no speech begins; `Other` for device errors
    fn record_phrase(&self, timing: ListenTiming) -> Result<RecordedPhrase, RecognitionFailure>;
}

/// Progress through one listening session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenStage {
    /// Waiting for and recording a phrase
    Recording,
    /// Phrase captured, waiting on the transcription service
    Transcribing,
}

/// Produces text from a spoken phrase
pub trait SpeechInput: Send + Sync {
    /// Capture one phrase and return its transcription
    ///
    /// # Errors
    ///
    /// Returns the kind of recognition failure
    fn capture_and_transcribe(&self) -> Result<String, RecognitionFailure> {
        self.capture_with_progress(&|_| {})
    }

    /// Like [`SpeechInput::capture_and_transcribe`], reporting each stage
    ///
    /// # Errors
    ///
    /// Returns the kind of recognition failure
    fn capture_with_progress(
        &self,
        progress: &dyn Fn(ListenStage),
    ) -> Result<String, RecognitionFailure>;
}

/// Default microphone backed by cpal
///
/// Opens a fresh capture session per phrase.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalMicrophone;

impl Microphone for CpalMicrophone {
    fn record_phrase(&self, timing: ListenTiming) -> Result<RecordedPhrase, RecognitionFailure> {
        let device_error = |e: crate::Error| RecognitionFailure::Other(e.to_string());

        let mut capture = AudioCapture::new().map_err(device_error)?;
        let sample_rate = capture.sample_rate();
        let mut detector = PhraseDetector::new(sample_rate, timing);

        capture.start().map_err(device_error)?;
        let started = Instant::now();
        let limit = timing.session_limit();

        loop {
            std::thread::sleep(POLL_INTERVAL);

            let chunk = capture.take_buffer();
            match detector.feed(&chunk) {
                PhraseProgress::Pending => {}
                PhraseProgress::Complete(samples) => {
                    capture.stop();
                    return Ok(RecordedPhrase {
                        samples,
                        sample_rate,
                    });
                }
                PhraseProgress::TimedOut => {
                    capture.stop();
                    return Err(RecognitionFailure::Timeout);
                }
            }

            // Guards against a stalled device delivering no samples
            if started.elapsed() > limit {
                capture.stop();
                tracing::warn!(phase = ?detector.phase(), "capture stalled, giving up");
                return Err(RecognitionFailure::Timeout);
            }
        }
    }
}

/// Speech input over a microphone and a transcription service
pub struct Listener {
    microphone: Arc<dyn Microphone>,
    transcriber: Arc<dyn Transcriber>,
    timing: ListenTiming,
}

impl Listener {
    /// Create a listener
    pub fn new(
        microphone: Arc<dyn Microphone>,
        transcriber: Arc<dyn Transcriber>,
        timing: ListenTiming,
    ) -> Self {
        Self {
            microphone,
            transcriber,
            timing,
        }
    }
}

impl SpeechInput for Listener {
    fn capture_with_progress(
        &self,
        progress: &dyn Fn(ListenStage),
    ) -> Result<String, RecognitionFailure> {
        tracing::debug!("listening for a phrase");
        progress(ListenStage::Recording);
        let phrase = self.microphone.record_phrase(self.timing)?;

        if phrase.samples.is_empty() {
            return Err(RecognitionFailure::Unintelligible);
        }

        let wav = samples_to_wav(&phrase.samples, phrase.sample_rate)
            .map_err(|e| RecognitionFailure::Other(e.to_string()))?;
        tracing::debug!(
            samples = phrase.samples.len(),
            wav_bytes = wav.len(),
            "phrase recorded"
        );

        progress(ListenStage::Transcribing);
        self.transcriber.transcribe(&wav)
    }
}

/// Speech input used when no transcription service is configured
pub struct UnavailableInput {
    reason: String,
}

impl UnavailableInput {
    /// Create with the reason reported on every call
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SpeechInput for UnavailableInput {
    fn capture_with_progress(
        &self,
        _progress: &dyn Fn(ListenStage),
    ) -> Result<String, RecognitionFailure> {
        Err(RecognitionFailure::Other(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct FixedMic(Result<RecordedPhrase, RecognitionFailure>);

    impl Microphone for FixedMic {
        fn record_phrase(&self, _timing: ListenTiming) -> Result<RecordedPhrase, RecognitionFailure> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct EchoTranscriber {
        seen: Mutex<Vec<usize>>,
    }

    impl Transcriber for EchoTranscriber {
        fn transcribe(&self, wav: &[u8]) -> Result<String, RecognitionFailure> {
            self.seen.lock().unwrap().push(wav.len());
            Ok("what time is it".to_string())
        }
    }

    fn phrase(len: usize) -> RecordedPhrase {
        RecordedPhrase {
            samples: vec![0.25; len],
            sample_rate: 16000,
        }
    }

    #[test]
    fn test_transcribes_recorded_phrase_as_wav() {
        let transcriber = Arc::new(EchoTranscriber::default());
        let listener = Listener::new(
            Arc::new(FixedMic(Ok(phrase(1600)))),
            transcriber.clone(),
            ListenTiming::default(),
        );

        assert_eq!(listener.capture_and_transcribe().unwrap(), "what time is it");
        // 16-bit samples plus the RIFF header
        let seen = transcriber.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0] > 3200);
    }

    #[test]
    fn test_progress_reports_both_stages() {
        let listener = Listener::new(
            Arc::new(FixedMic(Ok(phrase(160)))),
            Arc::new(EchoTranscriber::default()),
            ListenTiming::default(),
        );
        let stages = Mutex::new(Vec::new());
        listener
            .capture_with_progress(&|stage| stages.lock().unwrap().push(stage))
            .unwrap();
        assert_eq!(
            *stages.lock().unwrap(),
            vec![ListenStage::Recording, ListenStage::Transcribing]
        );
    }

    #[test]
    fn test_timeout_skips_transcription() {
        let transcriber = Arc::new(EchoTranscriber::default());
        let listener = Listener::new(
            Arc::new(FixedMic(Err(RecognitionFailure::Timeout))),
            transcriber.clone(),
            ListenTiming::default(),
        );

        assert_eq!(listener.capture_and_transcribe(), Err(RecognitionFailure::Timeout));
        assert!(transcriber.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_empty_phrase_is_unintelligible() {
        let listener = Listener::new(
            Arc::new(FixedMic(Ok(phrase(0)))),
            Arc::new(EchoTranscriber::default()),
            ListenTiming::default(),
        );
        assert_eq!(
            listener.capture_and_transcribe(),
            Err(RecognitionFailure::Unintelligible)
        );
    }

    #[test]
    fn test_unavailable_input_reports_reason() {
        let input = UnavailableInput::new("OpenAI API key required for Whisper");
        assert_eq!(
            input.capture_and_transcribe(),
            Err(RecognitionFailure::Other(
                "OpenAI API key required for Whisper".to_string()
            ))
        );
    }
}
