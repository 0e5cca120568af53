//! Offline speech synthesis through the platform's speech command

use std::path::PathBuf;
use std::process::Command;

use crate::{Error, Result};

/// A local synthesis engine that speaks text directly to the output device
pub trait LocalVoice: Send {
    /// Speak `text`, blocking until the engine finishes
    ///
    /// # Errors
    ///
    /// Returns error if the engine cannot be started or exits unsuccessfully
    fn say(&self, text: &str) -> Result<()>;
}

/// A speech command and how to call it
struct Engine {
    name: &'static str,
    args: &'static [&'static str],
    /// Accepts `--` to end option parsing
    getopt: bool,
}

/// Known engines in preference order
///
/// Roughly 175 words per minute at 90% volume, preferring a female voice.
const CANDIDATES: &[Engine] = &[
    // -w waits until the message is spoken
    Engine {
        name: "spd-say",
        args: &["-w", "-r", "10", "-i", "80", "-t", "female1"],
        getopt: true,
    },
    Engine {
        name: "espeak-ng",
        args: &["-s", "175", "-a", "90", "-v", "en+f3"],
        getopt: true,
    },
    Engine {
        name: "espeak",
        args: &["-s", "175", "-a", "90", "-v", "en+f3"],
        getopt: true,
    },
    Engine {
        name: "say",
        args: &["-r", "175"],
        getopt: false,
    },
];

/// Speech command found on `PATH`
#[derive(Debug, Clone)]
pub struct SystemVoice {
    program: PathBuf,
    args: Vec<String>,
    getopt: bool,
}

impl SystemVoice {
    /// Locate the first available speech command
    ///
    /// Returns `None` when no engine is installed.
    #[must_use]
    pub fn detect() -> Option<Self> {
        CANDIDATES.iter().find_map(|engine| {
            let program = which::which(engine.name).ok()?;
            tracing::debug!(
                engine = engine.name,
                path = %program.display(),
                "local speech engine found"
            );
            Some(Self {
                program,
                args: engine.args.iter().map(|a| (*a).to_string()).collect(),
                getopt: engine.getopt,
            })
        })
    }

    /// Path of the resolved engine binary
    #[must_use]
    pub fn program(&self) -> &std::path::Path {
        &self.program
    }
}

impl LocalVoice for SystemVoice {
    fn say(&self, text: &str) -> Result<()> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        // Text starting with '-' must not be read as an option
        if self.getopt {
            command.arg("--");
        }
        let status = command.arg(text).status()?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Tts(format!(
                "{} exited with {status}",
                self.program.display()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_dash_text_is_spoken_not_parsed() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let argv = dir.path().join("argv.txt");
        let script = dir.path().join("fake-espeak");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\nfor a in \"$@\"; do printf '%s\\n' \"$a\" >> '{}'; done\n",
                argv.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let voice = SystemVoice {
            program: script,
            args: vec!["-s".to_string(), "175".to_string()],
            getopt: true,
        };
        voice.say("--help").unwrap();

        let recorded = std::fs::read_to_string(&argv).unwrap();
        assert_eq!(
            recorded.lines().collect::<Vec<_>>(),
            vec!["-s", "175", "--", "--help"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_engine_is_an_error() {
        let voice = SystemVoice {
            program: PathBuf::from("false"),
            args: Vec::new(),
            getopt: false,
        };
        assert!(voice.say("hello").is_err());
    }
}
