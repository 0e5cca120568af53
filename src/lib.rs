//! NOVA - desktop voice assistant
//!
//! This library provides the orchestration layer of the assistant:
//! - Speech input (phrase capture and transcription)
//! - Speech output (network synthesis with a local fallback)
//! - Intent routing over ordered keyword rules
//! - An interactive session that keeps the display responsive while
//!   requests run on worker threads
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                Display thread (console)              │
//! │   InputEvent  │  SessionController  │  drain 100ms  │
//! └──────────┬──────────────────────────────▲───────────┘
//!            │ spawn per request            │ UiMessage
//! ┌──────────▼──────────────────────────────┴───────────┐
//! │                   Worker threads                     │
//! │   Listener  │  IntentRouter  │  Speaker             │
//! └──────────┬──────────────────────────────────────────┘
//!            │
//! ┌──────────▼──────────────────────────────────────────┐
//! │                External services                     │
//! │   STT  │  TTS  │  Wikipedia  │  Browser  │  YouTube │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod console;
pub mod error;
pub mod intent;
pub mod session;
pub mod setup;
pub mod tools;
pub mod voice;

pub use config::Config;
pub use error::{Error, Result};
pub use intent::{IntentRouter, Response, RouterServices, UtteranceEvent};
pub use session::{Mode, SessionController, SessionServices, UiMessage};
pub use voice::{Listener, RecognitionFailure, SpeechInput, SpeechOutput, Speaker};
