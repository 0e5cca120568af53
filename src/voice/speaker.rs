//! Speech output with network-first, local-fallback synthesis

use std::io::Write;
use std::sync::{Arc, Mutex};

use super::connectivity::ConnectivityProbe;
use super::local::LocalVoice;
use super::playback::AudioSink;
use super::tts::Synthesizer;
use crate::Result;

/// Speaks text aloud; failures are logged, never returned
pub trait SpeechOutput: Send + Sync {
    /// Speak `text`, blocking until done
    fn speak(&self, text: &str);
}

/// Which synthesis path produced the audio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechPath {
    /// Network synthesis played through the audio sink
    Network,
    /// Local engine
    Local,
    /// Nothing was spoken
    Silent,
}

/// Fallback chain over a network synthesizer and a local engine
///
/// The connectivity probe runs on every call. The local engine is shared by
/// all callers and serialized behind a mutex.
pub struct Speaker {
    probe: Arc<dyn ConnectivityProbe>,
    synthesizer: Option<Arc<dyn Synthesizer>>,
    sink: Option<Arc<dyn AudioSink>>,
    local: Option<Mutex<Box<dyn LocalVoice>>>,
    language: String,
}

impl Speaker {
    /// Create a speaker from its collaborators
    ///
    /// A missing synthesizer or sink disables the network path; a missing
    /// local engine disables the fallback.
    pub fn new(
        probe: Arc<dyn ConnectivityProbe>,
        synthesizer: Option<Arc<dyn Synthesizer>>,
        sink: Option<Arc<dyn AudioSink>>,
        local: Option<Box<dyn LocalVoice>>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            probe,
            synthesizer,
            sink,
            local: local.map(Mutex::new),
            language: language.into(),
        }
    }

    /// Speak `text` and report which path was used
    pub fn speak_with_path(&self, text: &str) -> SpeechPath {
        let text = text.trim();
        if text.is_empty() {
            return SpeechPath::Silent;
        }

        if self.network_available() {
            match self.speak_network(text) {
                Ok(()) => return SpeechPath::Network,
                Err(e) => {
                    tracing::warn!(error = %e, "network synthesis failed, using local engine");
                }
            }
        } else {
            tracing::debug!("offline, using local engine");
        }

        match self.speak_local(text) {
            Ok(true) => SpeechPath::Local,
            Ok(false) => {
                tracing::error!("no local speech engine available");
                SpeechPath::Silent
            }
            Err(e) => {
                tracing::error!(error = %e, "local synthesis failed");
                SpeechPath::Silent
            }
        }
    }

    fn network_available(&self) -> bool {
        self.synthesizer.is_some() && self.sink.is_some() && self.probe.is_online()
    }

    fn speak_network(&self, text: &str) -> Result<()> {
        let (Some(synthesizer), Some(sink)) = (&self.synthesizer, &self.sink) else {
            return Ok(());
        };

        let audio = synthesizer.synthesize(text, &self.language)?;

        // Removed when `file` drops, including on playback errors
        let mut file = tempfile::Builder::new()
            .prefix("nova-")
            .suffix(".mp3")
            .tempfile()?;
        file.write_all(&audio)?;
        file.flush()?;

        tracing::debug!(
            provider = synthesizer.name(),
            path = %file.path().display(),
            bytes = audio.len(),
            "playing synthesized speech"
        );
        sink.play_file(file.path())
    }

    fn speak_local(&self, text: &str) -> Result<bool> {
        let Some(local) = &self.local else {
            return Ok(false);
        };

        // A poisoned lock only means an earlier caller panicked mid-utterance
        let engine = local
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        engine.say(text)?;
        Ok(true)
    }
}

impl SpeechOutput for Speaker {
    fn speak(&self, text: &str) {
        let path = self.speak_with_path(text);
        tracing::trace!(?path, "speak finished");
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::Error;
    use crate::voice::connectivity::StaticProbe;

    #[derive(Default)]
    struct Counting {
        synth: AtomicUsize,
        played: AtomicUsize,
        local: Arc<Mutex<Vec<String>>>,
    }

    struct Synth(Arc<Counting>, bool);

    impl Synthesizer for Synth {
        fn synthesize(&self, _text: &str, _language: &str) -> Result<Vec<u8>> {
            self.0.synth.fetch_add(1, Ordering::SeqCst);
            if self.1 {
                Ok(vec![0xFF, 0xFB, 0x90, 0x00])
            } else {
                Err(Error::Tts("service down".to_string()))
            }
        }

        fn name(&self) -> &'static str {
            "test"
        }
    }

    struct Sink(Arc<Counting>);

    impl AudioSink for Sink {
        fn play_file(&self, path: &Path) -> Result<()> {
            assert!(path.exists());
            assert_eq!(path.extension().and_then(|e| e.to_str()), Some("mp3"));
            self.0.played.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Voice(Arc<Mutex<Vec<String>>>);

    impl LocalVoice for Voice {
        fn say(&self, text: &str) -> Result<()> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn speaker(online: bool, synth_ok: bool) -> (Speaker, Arc<Counting>) {
        let counts = Arc::new(Counting::default());
        let speaker = Speaker::new(
            Arc::new(StaticProbe(online)),
            Some(Arc::new(Synth(Arc::clone(&counts), synth_ok))),
            Some(Arc::new(Sink(Arc::clone(&counts)))),
            Some(Box::new(Voice(Arc::clone(&counts.local)))),
            "en",
        );
        (speaker, counts)
    }

    #[test]
    fn test_online_uses_network() {
        let (speaker, counts) = speaker(true, true);
        assert_eq!(speaker.speak_with_path("Opening YouTube"), SpeechPath::Network);
        assert_eq!(counts.played.load(Ordering::SeqCst), 1);
        assert!(counts.local.lock().unwrap().is_empty());
    }

    #[test]
    fn test_offline_skips_network() {
        let (speaker, counts) = speaker(false, true);
        assert_eq!(speaker.speak_with_path("Ready"), SpeechPath::Local);
        assert_eq!(counts.synth.load(Ordering::SeqCst), 0);
        assert_eq!(*counts.local.lock().unwrap(), vec!["Ready".to_string()]);
    }

    #[test]
    fn test_synthesis_failure_falls_back() {
        let (speaker, counts) = speaker(true, false);
        assert_eq!(speaker.speak_with_path("hello"), SpeechPath::Local);
        assert_eq!(counts.synth.load(Ordering::SeqCst), 1);
        assert_eq!(counts.played.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_blank_text_is_silent() {
        let (speaker, counts) = speaker(true, true);
        assert_eq!(speaker.speak_with_path("   "), SpeechPath::Silent);
        assert_eq!(counts.synth.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_engines_is_silent() {
        let speaker = Speaker::new(Arc::new(StaticProbe(false)), None, None, None, "en");
        assert_eq!(speaker.speak_with_path("hello"), SpeechPath::Silent);
    }
}
