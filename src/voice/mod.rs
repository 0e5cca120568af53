//! Voice processing module
//!
//! Handles audio capture, phrase detection, transcription, synthesis and
//! playback. [`Speaker`] and [`Listener`] are the entry points used by the
//! session layer.

mod capture;
mod connectivity;
mod listener;
mod local;
mod phrase;
mod playback;
mod speaker;
mod stt;
mod tts;

pub use capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
pub use connectivity::{ConnectivityProbe, HttpProbe, StaticProbe};
pub use listener::{
    CpalMicrophone, ListenStage, Listener, Microphone, RecordedPhrase, SpeechInput, UnavailableInput,
};
pub use local::{LocalVoice, SystemVoice};
pub use phrase::{ListenTiming, PhraseDetector, PhrasePhase, PhraseProgress, calculate_energy};
pub use playback::{AudioPlayback, AudioSink, DecodedAudio, decode_mp3};
pub use speaker::{SpeechOutput, SpeechPath, Speaker};
pub use stt::{RecognitionFailure, SpeechToText, Transcriber};
pub use tts::{Synthesizer, TextToSpeech};
