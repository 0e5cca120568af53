//! TOML configuration file loading
//!
//! Supports `~/.config/nova/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NovaConfigFile {
    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Listening thresholds
    #[serde(default)]
    pub listen: ListenFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Voice processing configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VoiceFileConfig {
    /// Synthesis language code (e.g. "en")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// STT provider ("whisper" or "deepgram")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stt_provider: Option<String>,

    /// STT model (e.g. "whisper-1")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stt_model: Option<String>,

    /// Network TTS provider ("google", "openai" or "elevenlabs")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_provider: Option<String>,

    /// TTS model (e.g. "tts-1")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_speed: Option<f32>,

    /// URL probed before choosing the network synthesis path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectivity_url: Option<String>,

    /// Probe timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectivity_timeout_secs: Option<u64>,
}

/// Listening thresholds, all in milliseconds
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ListenFileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onset_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phrase_limit_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_ms: Option<u64>,
}

/// API keys configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiKeysFileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deepgram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevenlabs: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `NovaConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> NovaConfigFile {
    let Some(path) = config_file_path() else {
        return NovaConfigFile::default();
    };

    load_config_from(&path)
}

/// Load a config file from an explicit path, falling back to defaults
pub fn load_config_from(path: &Path) -> NovaConfigFile {
    if !path.exists() {
        return NovaConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                NovaConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            NovaConfigFile::default()
        }
    }
}

/// Serialize and write a config file, creating its parent directory
///
/// # Errors
///
/// Returns error if the directory cannot be created or the file written
pub fn write_config_file(path: &Path, config: &NovaConfigFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml = toml::to_string_pretty(config)?;
    std::fs::write(path, toml)?;

    tracing::debug!(path = %path.display(), "wrote config file");
    Ok(())
}

/// Return the config file path: `~/.config/nova/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("nova").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml"));
        assert!(config.voice.stt_provider.is_none());
        assert!(config.api_keys.openai.is_none());
    }

    #[test]
    fn test_partial_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[voice]\ntts_provider = \"openai\"\n\n[listen]\nonset_timeout_ms = 3000\n",
        )
        .unwrap();

        let config = load_config_from(&path);
        assert_eq!(config.voice.tts_provider.as_deref(), Some("openai"));
        assert_eq!(config.listen.onset_timeout_ms, Some(3000));
        assert!(config.voice.language.is_none());
    }

    #[test]
    fn test_invalid_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[voice\nbroken").unwrap();

        let config = load_config_from(&path);
        assert!(config.voice.tts_provider.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = NovaConfigFile::default();
        config.voice.stt_provider = Some("deepgram".to_string());
        config.api_keys.deepgram = Some("dg-key".to_string());
        write_config_file(&path, &config).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[voice]"));
        assert!(!written.contains("tts_model"));

        let loaded = load_config_from(&path);
        assert_eq!(loaded.voice.stt_provider.as_deref(), Some("deepgram"));
        assert_eq!(loaded.api_keys.deepgram.as_deref(), Some("dg-key"));
    }
}
