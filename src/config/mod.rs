//! Configuration management for the NOVA assistant
//!
//! Values resolve in the order env > TOML file > default.

pub mod file;

use std::time::Duration;

use crate::voice::ListenTiming;

use self::file::NovaConfigFile;

/// Default host probed before choosing network synthesis
pub const DEFAULT_CONNECTIVITY_URL: &str = "http://www.google.com";

/// Default connectivity probe timeout
pub const DEFAULT_CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(3);

/// Assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Voice configuration
    pub voice: VoiceConfig,

    /// Listening thresholds for speech capture
    pub listen: ListenTiming,

    /// API keys
    pub api_keys: ApiKeys,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Language code handed to the network synthesizer
    pub language: String,

    /// STT provider ("whisper" or "deepgram")
    pub stt_provider: String,

    /// STT model (e.g. "whisper-1", "nova-2")
    pub stt_model: String,

    /// Network TTS provider ("google", "openai" or "elevenlabs")
    pub tts_provider: String,

    /// TTS model for keyed providers
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f32,

    /// URL probed before each network synthesis attempt
    pub connectivity_url: String,

    /// Probe timeout
    pub connectivity_timeout: Duration,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            stt_provider: "whisper".to_string(),
            stt_model: "whisper-1".to_string(),
            tts_provider: "google".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            tts_speed: 1.0,
            connectivity_url: DEFAULT_CONNECTIVITY_URL.to_string(),
            connectivity_timeout: DEFAULT_CONNECTIVITY_TIMEOUT,
        }
    }
}

/// API keys for external services
#[derive(Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper and TTS)
    pub openai: Option<String>,

    /// `Deepgram` API key (optional STT)
    pub deepgram: Option<String>,

    /// `ElevenLabs` API key (optional TTS)
    pub elevenlabs: Option<String>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |k: &Option<String>| k.as_ref().map(|_| "***");
        f.debug_struct("ApiKeys")
            .field("openai", &mask(&self.openai))
            .field("deepgram", &mask(&self.deepgram))
            .field("elevenlabs", &mask(&self.elevenlabs))
            .finish()
    }
}

impl Config {
    /// Load configuration from the environment and the standard config file
    #[must_use]
    pub fn load() -> Self {
        Self::resolve(file::load_config_file(), |key| std::env::var(key).ok())
    }

    /// Resolve a config from a parsed file and an environment lookup
    pub fn resolve(fc: NovaConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = VoiceConfig::default();

        let api_keys = ApiKeys {
            openai: env("OPENAI_API_KEY").or(fc.api_keys.openai),
            deepgram: env("DEEPGRAM_API_KEY").or(fc.api_keys.deepgram),
            elevenlabs: env("ELEVENLABS_API_KEY").or(fc.api_keys.elevenlabs),
        };

        let voice = VoiceConfig {
            language: env("NOVA_LANGUAGE")
                .or(fc.voice.language)
                .unwrap_or(defaults.language),
            stt_provider: env("NOVA_STT_PROVIDER")
                .or(fc.voice.stt_provider)
                .unwrap_or(defaults.stt_provider),
            stt_model: env("NOVA_STT_MODEL")
                .or(fc.voice.stt_model)
                .unwrap_or(defaults.stt_model),
            tts_provider: env("NOVA_TTS_PROVIDER")
                .or(fc.voice.tts_provider)
                .unwrap_or(defaults.tts_provider),
            tts_model: env("NOVA_TTS_MODEL")
                .or(fc.voice.tts_model)
                .unwrap_or(defaults.tts_model),
            tts_voice: fc.voice.tts_voice.unwrap_or(defaults.tts_voice),
            tts_speed: fc.voice.tts_speed.unwrap_or(defaults.tts_speed),
            connectivity_url: fc
                .voice
                .connectivity_url
                .unwrap_or(defaults.connectivity_url),
            connectivity_timeout: fc
                .voice
                .connectivity_timeout_secs
                .map_or(defaults.connectivity_timeout, Duration::from_secs),
        };

        let timing = ListenTiming::default();
        let ms = |v: Option<u64>, d: Duration| v.map_or(d, Duration::from_millis);
        let listen = ListenTiming {
            calibration: ms(fc.listen.calibration_ms, timing.calibration),
            onset_timeout: ms(fc.listen.onset_timeout_ms, timing.onset_timeout),
            phrase_limit: ms(fc.listen.phrase_limit_ms, timing.phrase_limit),
            pause: ms(fc.listen.pause_ms, timing.pause),
        };

        Self {
            voice,
            listen,
            api_keys,
        }
    }
}
