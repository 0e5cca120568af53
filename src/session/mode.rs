//! Operating modes and quick commands

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// What the execute action does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Listen (or take typed text) and route it as a command
    #[default]
    VoiceCommand,
    /// Listen and show the transcription
    SpeechToText,
    /// Speak the typed text
    TextToSpeech,
}

impl Mode {
    /// All modes in menu order
    pub const ALL: [Self; 3] = [Self::VoiceCommand, Self::SpeechToText, Self::TextToSpeech];

    /// Name shown in the status line
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::VoiceCommand => "Voice Command",
            Self::SpeechToText => "Speech to Text",
            Self::TextToSpeech => "Text to Speech",
        }
    }

    /// Hint placed in the input box after switching to this mode
    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::VoiceCommand => "Say a command (e.g., 'time', 'play music')...",
            Self::SpeechToText => "Click ACTIVATE and start speaking...",
            Self::TextToSpeech => "Type something to speak...",
        }
    }

    /// Short name used on the command line
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VoiceCommand => "voice",
            Self::SpeechToText => "stt",
            Self::TextToSpeech => "tts",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "voice" | "command" | "voice-command" => Ok(Self::VoiceCommand),
            "stt" | "speech-to-text" => Ok(Self::SpeechToText),
            "tts" | "text-to-speech" => Ok(Self::TextToSpeech),
            other => Err(Error::Config(format!("unknown mode: {other}"))),
        }
    }
}

/// One-tap shortcuts that fill the input and execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickCommand {
    /// `play music`
    PlayMusic,
    /// `time`
    Time,
    /// `date`
    Date,
    /// `open youtube`
    OpenYouTube,
    /// `google search`
    GoogleSearch,
}

impl QuickCommand {
    /// All shortcuts in button order
    pub const ALL: [Self; 5] = [
        Self::PlayMusic,
        Self::Time,
        Self::Date,
        Self::OpenYouTube,
        Self::GoogleSearch,
    ];

    /// Text placed in the input box
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::PlayMusic => "play music",
            Self::Time => "time",
            Self::Date => "date",
            Self::OpenYouTube => "open youtube",
            Self::GoogleSearch => "google search",
        }
    }
}

impl FromStr for QuickCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "music" | "play music" => Ok(Self::PlayMusic),
            "time" => Ok(Self::Time),
            "date" => Ok(Self::Date),
            "youtube" | "open youtube" => Ok(Self::OpenYouTube),
            "google" | "google search" => Ok(Self::GoogleSearch),
            other => Err(Error::Config(format!("unknown quick command: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("voice".parse::<Mode>().unwrap(), Mode::VoiceCommand);
        assert_eq!("STT".parse::<Mode>().unwrap(), Mode::SpeechToText);
        assert_eq!("tts".parse::<Mode>().unwrap(), Mode::TextToSpeech);
        assert!("karaoke".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mode_round_trips_short_name() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_quick_command_parsing() {
        assert_eq!("music".parse::<QuickCommand>().unwrap().text(), "play music");
        assert_eq!("google".parse::<QuickCommand>().unwrap().text(), "google search");
        assert!("weather".parse::<QuickCommand>().is_err());
    }
}
