//! Error types for the NOVA assistant

use thiserror::Error;

/// Result type alias for NOVA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur inside the assistant
///
/// These never reach the user as a crash: each external boundary converts
/// them into a fallback response or a status line.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio device error
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(#[from] crate::voice::RecognitionFailure),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// External program (browser, local voice) could not be launched
    #[error("launch error: {0}")]
    Launch(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML writing error
    #[error("toml write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}
