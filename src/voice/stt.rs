//! Speech-to-text (STT) processing

use std::time::Duration;

use thiserror::Error;

use crate::config::Config;
use crate::{Error, Result};

/// Request timeout for transcription calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a listening session produced no text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionFailure {
    /// No speech started before the onset timeout
    #[error("no speech detected")]
    Timeout,

    /// Audio was captured but the service returned no words
    #[error("speech was unintelligible")]
    Unintelligible,

    /// The transcription service could not be reached or refused the request
    #[error("transcription service unreachable: {0}")]
    ServiceUnreachable(String),

    /// Anything else (device errors, malformed responses)
    #[error("{0}")]
    Other(String),
}

/// Converts captured WAV audio into text
pub trait Transcriber: Send + Sync {
    /// Transcribe WAV bytes
    ///
    /// # Errors
    ///
    /// Returns the failure kind when no text could be produced
    fn transcribe(&self, wav: &[u8]) -> std::result::Result<String, RecognitionFailure>;
}

/// Response from `OpenAI` Whisper transcription API
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Response from Deepgram transcription API
#[derive(serde::Deserialize)]
struct DeepgramResponse {
    results: DeepgramResults,
}

#[derive(serde::Deserialize)]
struct DeepgramResults {
    channels: Vec<DeepgramChannel>,
}

#[derive(serde::Deserialize)]
struct DeepgramChannel {
    alternatives: Vec<DeepgramAlternative>,
}

#[derive(serde::Deserialize)]
struct DeepgramAlternative {
    transcript: String,
}

/// STT provider backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SttProvider {
    Whisper,
    Deepgram,
}

/// Transcribes speech to text through a hosted API
pub struct SpeechToText {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    provider: SttProvider,
}

impl SpeechToText {
    /// Create a new STT instance using `OpenAI` Whisper
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_whisper(api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for Whisper".to_string(),
            ));
        }

        Self::build(api_key, model, SttProvider::Whisper)
    }

    /// Create a new STT instance using Deepgram
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_deepgram(api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("Deepgram API key required".to_string()));
        }

        Self::build(api_key, model, SttProvider::Deepgram)
    }

    /// Create the provider named in the voice config
    ///
    /// # Errors
    ///
    /// Returns error if the provider is unknown or its key is missing
    pub fn from_config(config: &Config) -> Result<Self> {
        let model = config.voice.stt_model.clone();
        match config.voice.stt_provider.as_str() {
            "whisper" | "openai" => {
                Self::new_whisper(config.api_keys.openai.clone().unwrap_or_default(), model)
            }
            "deepgram" => {
                let model = if model.starts_with("whisper") {
                    "nova-2".to_string()
                } else {
                    model
                };
                Self::new_deepgram(config.api_keys.deepgram.clone().unwrap_or_default(), model)
            }
            other => Err(Error::Config(format!("unknown STT provider: {other}"))),
        }
    }

    fn build(api_key: String, model: String, provider: SttProvider) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key,
            model,
            provider,
        })
    }

    /// Transcribe using `OpenAI` Whisper
    fn transcribe_whisper(&self, audio: &[u8]) -> std::result::Result<String, RecognitionFailure> {
        tracing::debug!(audio_bytes = audio.len(), "starting Whisper transcription");

        let part = reqwest::blocking::multipart::Part::bytes(audio.to_vec())
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| RecognitionFailure::Other(e.to_string()))?;
        let form = reqwest::blocking::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/transcriptions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .map_err(unreachable)?;

        let response = check_status(response, "Whisper")?;

        let result: WhisperResponse = response.json().map_err(|e| {
            tracing::error!(error = %e, "failed to parse response");
            RecognitionFailure::Other(e.to_string())
        })?;

        Ok(result.text)
    }

    /// Transcribe using Deepgram
    fn transcribe_deepgram(&self, audio: &[u8]) -> std::result::Result<String, RecognitionFailure> {
        tracing::debug!(audio_bytes = audio.len(), "starting Deepgram transcription");

        let response = self
            .client
            .post("https://api.deepgram.com/v1/listen")
            .query(&[("model", self.model.as_str()), ("punctuate", "true")])
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", "audio/wav")
            .body(audio.to_vec())
            .send()
            .map_err(unreachable)?;

        let response = check_status(response, "Deepgram")?;

        let result: DeepgramResponse = response.json().map_err(|e| {
            tracing::error!(error = %e, "failed to parse Deepgram response");
            RecognitionFailure::Other(e.to_string())
        })?;

        Ok(first_transcript(result))
    }
}

impl Transcriber for SpeechToText {
    fn transcribe(&self, wav: &[u8]) -> std::result::Result<String, RecognitionFailure> {
        let text = match self.provider {
            SttProvider::Whisper => self.transcribe_whisper(wav)?,
            SttProvider::Deepgram => self.transcribe_deepgram(wav)?,
        };

        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("transcription returned no words");
            return Err(RecognitionFailure::Unintelligible);
        }

        tracing::info!(transcript = %text, "transcription complete");
        Ok(text.to_string())
    }
}

fn unreachable(e: reqwest::Error) -> RecognitionFailure {
    tracing::error!(error = %e, "transcription request failed");
    RecognitionFailure::ServiceUnreachable(e.to_string())
}

fn check_status(
    response: reqwest::blocking::Response,
    service: &str,
) -> std::result::Result<reqwest::blocking::Response, RecognitionFailure> {
    let status = response.status();
    tracing::debug!(status = %status, "received response");

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    tracing::error!(status = %status, body = %body, "{service} API error");
    Err(RecognitionFailure::ServiceUnreachable(format!(
        "{service} API error {status}"
    )))
}

fn first_transcript(response: DeepgramResponse) -> String {
    response
        .results
        .channels
        .into_iter()
        .next()
        .and_then(|c| c.alternatives.into_iter().next())
        .map(|a| a.transcript)
        .unwrap_or_default()
}
