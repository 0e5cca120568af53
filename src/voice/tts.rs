//! Network text-to-speech (TTS) synthesis

use std::time::Duration;

use crate::config::Config;
use crate::{Error, Result};

/// Google Translate rejects longer `q` values
const GOOGLE_MAX_CHARS: usize = 200;

/// Request timeout for synthesis calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Turns text into an encoded (MP3) audio artifact over the network
pub trait Synthesizer: Send + Sync {
    /// Synthesize `text` in `language`, returning MP3 bytes
    ///
    /// # Errors
    ///
    /// Returns error if the service is unreachable or rejects the request
    fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>>;

    /// Short provider name for logs
    fn name(&self) -> &'static str;
}

/// TTS provider backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TtsProvider {
    Google,
    OpenAI,
    ElevenLabs,
}

/// Synthesizes speech from text
pub struct TextToSpeech {
    client: reqwest::blocking::Client,
    api_key: String,
    voice: String,
    speed: f32,
    model: String,
    provider: TtsProvider,
}

impl TextToSpeech {
    /// Create a TTS instance using the keyless Google Translate endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new_google() -> Result<Self> {
        Self::build(String::new(), String::new(), 1.0, String::new(), TtsProvider::Google)
    }

    /// Create a new TTS instance using `OpenAI`
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_openai(api_key: String, voice: String, speed: f32, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }

        Self::build(api_key, voice, speed, model, TtsProvider::OpenAI)
    }

    /// Create a new TTS instance using ElevenLabs
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_elevenlabs(api_key: String, voice_id: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "ElevenLabs API key required for TTS".to_string(),
            ));
        }

        // ElevenLabs doesn't use speed in the same way
        Self::build(api_key, voice_id, 1.0, model, TtsProvider::ElevenLabs)
    }

    /// Create the provider named in the voice config
    ///
    /// # Errors
    ///
    /// Returns error if the provider is unknown or its key is missing
    pub fn from_config(config: &Config) -> Result<Self> {
        let voice = &config.voice;
        match voice.tts_provider.as_str() {
            "google" | "gtts" => Self::new_google(),
            "openai" => Self::new_openai(
                config.api_keys.openai.clone().unwrap_or_default(),
                voice.tts_voice.clone(),
                voice.tts_speed,
                voice.tts_model.clone(),
            ),
            "elevenlabs" => {
                let model = if voice.tts_model.starts_with("tts-") {
                    "eleven_monolingual_v1".to_string()
                } else {
                    voice.tts_model.clone()
                };
                Self::new_elevenlabs(
                    config.api_keys.elevenlabs.clone().unwrap_or_default(),
                    voice.tts_voice.clone(),
                    model,
                )
            }
            other => Err(Error::Config(format!("unknown TTS provider: {other}"))),
        }
    }

    fn build(
        api_key: String,
        voice: String,
        speed: f32,
        model: String,
        provider: TtsProvider,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("nova-assistant/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key,
            voice,
            speed,
            model,
            provider,
        })
    }

    /// Synthesize using Google Translate TTS, one request per chunk
    fn synthesize_google(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let chunks = split_for_google(text, GOOGLE_MAX_CHARS);
        let total = chunks.len().to_string();
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let len = chunk.chars().count().to_string();
            let idx = idx.to_string();
            let response = self
                .client
                .get("https://translate.google.com/translate_tts")
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", language),
                    ("q", chunk.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx.as_str()),
                    ("textlen", len.as_str()),
                ])
                .send()?;

            if !response.status().is_success() {
                let status = response.status();
                return Err(Error::Tts(format!("Google TTS error {status}")));
            }

            // MP3 frames concatenate cleanly
            audio.extend_from_slice(&response.bytes()?);
        }

        Ok(audio)
    }

    /// Synthesize using `OpenAI` TTS
    fn synthesize_openai(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        let request = TtsRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::Tts(format!("OpenAI TTS error {status}: {body}")));
        }

        Ok(response.bytes()?.to_vec())
    }

    /// Synthesize using ElevenLabs TTS
    fn synthesize_elevenlabs(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct ElevenLabsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let url = format!(
            "https://api.elevenlabs.io/v1/text-to-speech/{}",
            self.voice
        );

        let request = ElevenLabsRequest {
            text,
            model_id: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::Tts(format!("ElevenLabs TTS error {status}: {body}")));
        }

        Ok(response.bytes()?.to_vec())
    }
}

impl Synthesizer for TextToSpeech {
    fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        tracing::debug!(provider = self.name(), chars = text.len(), "synthesizing speech");
        let audio = match self.provider {
            TtsProvider::Google => self.synthesize_google(text, language)?,
            TtsProvider::OpenAI => self.synthesize_openai(text)?,
            TtsProvider::ElevenLabs => self.synthesize_elevenlabs(text)?,
        };

        if audio.is_empty() {
            return Err(Error::Tts("service returned no audio".to_string()));
        }
        Ok(audio)
    }

    fn name(&self) -> &'static str {
        match self.provider {
            TtsProvider::Google => "google",
            TtsProvider::OpenAI => "openai",
            TtsProvider::ElevenLabs => "elevenlabs",
        }
    }
}

/// Split text into word-boundary chunks of at most `max_chars` characters
///
/// Words longer than `max_chars` are split mid-word.
fn split_for_google(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();

        while word.chars().count() > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(max_chars).collect();
            word = word.chars().skip(max_chars).collect();
            chunks.push(head);
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        assert_eq!(split_for_google("Opening YouTube", 100), vec!["Opening YouTube"]);
    }

    #[test]
    fn test_chunks_respect_limit_and_words() {
        let text = "The current time is ten past four in the afternoon";
        let chunks = split_for_google(text, 20);
        assert!(chunks.iter().all(|c| c.chars().count() <= 20));
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_long_word_is_split() {
        let chunks = split_for_google("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_missing_keys_rejected() {
        assert!(matches!(
            TextToSpeech::new_openai(String::new(), "alloy".into(), 1.0, "tts-1".into()),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            TextToSpeech::new_elevenlabs(String::new(), "Rachel".into(), "m".into()),
            Err(Error::Config(_))
        ));
    }
}
