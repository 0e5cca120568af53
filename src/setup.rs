//! Interactive first-run setup wizard (`nova setup`)

use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};

use crate::config::file::{
    VoiceFileConfig, config_file_path, load_config_file, write_config_file,
};

const TTS_PROVIDERS: [&str; 3] = ["google", "openai", "elevenlabs"];
const STT_PROVIDERS: [&str; 2] = ["whisper", "deepgram"];

/// Run the interactive setup wizard
///
/// # Errors
///
/// Returns error if user input fails or config cannot be written
pub fn run_setup() -> anyhow::Result<()> {
    println!("NOVA Setup\n");

    // Load existing config if present
    let existing = load_config_file();
    let config_path =
        config_file_path().unwrap_or_else(|| PathBuf::from("~/.config/nova/config.toml"));

    if config_path.exists() {
        println!("Existing config found at {}\n", config_path.display());
    }

    let mut config = existing.clone();

    // 1. Speech recognition
    let stt_idx = Select::new()
        .with_prompt("Speech recognition service")
        .items(&["OpenAI Whisper", "Deepgram"])
        .default(provider_index(&STT_PROVIDERS, existing.voice.stt_provider.as_deref()))
        .interact()?;
    let stt_provider = STT_PROVIDERS[stt_idx];

    match stt_provider {
        "deepgram" => {
            config.api_keys.deepgram =
                prompt_key("Deepgram", "DEEPGRAM_API_KEY", existing.api_keys.deepgram.as_deref())?;
        }
        _ => {
            config.api_keys.openai =
                prompt_key("OpenAI", "OPENAI_API_KEY", existing.api_keys.openai.as_deref())?;
        }
    }

    // 2. Speech synthesis
    let tts_idx = Select::new()
        .with_prompt("Online voice")
        .items(&["Google Translate (no key)", "OpenAI", "ElevenLabs"])
        .default(provider_index(&TTS_PROVIDERS, existing.voice.tts_provider.as_deref()))
        .interact()?;
    let tts_provider = TTS_PROVIDERS[tts_idx];

    let mut voice = VoiceFileConfig {
        stt_provider: Some(stt_provider.to_string()),
        tts_provider: Some(tts_provider.to_string()),
        ..existing.voice.clone()
    };

    match tts_provider {
        "openai" => {
            if config.api_keys.openai.is_none() {
                config.api_keys.openai =
                    prompt_key("OpenAI", "OPENAI_API_KEY", existing.api_keys.openai.as_deref())?;
            }
            let tts_voice: String = Input::new()
                .with_prompt("OpenAI voice")
                .default(existing.voice.tts_voice.clone().unwrap_or_else(|| "alloy".to_string()))
                .interact_text()?;
            voice.tts_voice = Some(tts_voice);
        }
        "elevenlabs" => {
            config.api_keys.elevenlabs = prompt_key(
                "ElevenLabs",
                "ELEVENLABS_API_KEY",
                existing.api_keys.elevenlabs.as_deref(),
            )?;
            let voice_id: String = Input::new()
                .with_prompt("ElevenLabs voice ID")
                .default(existing.voice.tts_voice.clone().unwrap_or_default())
                .interact_text()?;
            voice.tts_voice = Some(voice_id);
        }
        _ => {
            let language: String = Input::new()
                .with_prompt("Language code")
                .default(existing.voice.language.clone().unwrap_or_else(|| "en".to_string()))
                .interact_text()?;
            voice.language = Some(language);
        }
    }

    config.voice = voice;

    // 3. Write config
    write_config_file(&config_path, &config)?;
    println!("\nConfig written to {}", config_path.display());

    let try_it = Confirm::new()
        .with_prompt("Check the local voice engine now?")
        .default(false)
        .interact()?;

    if try_it {
        match crate::voice::SystemVoice::detect() {
            Some(engine) => println!("Local voice: {}", engine.program().display()),
            None => println!("No local voice found; install espeak-ng or speech-dispatcher"),
        }
    }

    println!("\nSetup complete! Run `nova -v` to start.");

    Ok(())
}

fn provider_index(options: &[&str], current: Option<&str>) -> usize {
    current
        .and_then(|p| options.iter().position(|o| o.eq_ignore_ascii_case(p)))
        .unwrap_or(0)
}

/// Ask for an API key, keeping the existing one on blank input
fn prompt_key(
    service: &str,
    env_hint: &str,
    existing: Option<&str>,
) -> anyhow::Result<Option<String>> {
    let prompt = match existing {
        Some(key) => format!("{service} API key (current: {}, leave blank to keep)", mask_key(key)),
        None => format!("{service} API key ({env_hint})"),
    };

    let input: String = Input::new()
        .with_prompt(&prompt)
        .allow_empty(true)
        .interact_text()?;

    Ok(if input.trim().is_empty() {
        existing.map(str::to_string)
    } else {
        Some(input.trim().to_string())
    })
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}
