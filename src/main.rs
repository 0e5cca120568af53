use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nova_assistant::console::{self, TerminalDisplay};
use nova_assistant::intent::{IntentRouter, RouterServices, SystemClock};
use nova_assistant::session::{Mode, SessionController, SessionServices, failure_status};
use nova_assistant::tools::{Browser, SystemBrowser, Wikipedia, YouTubeLauncher};
use nova_assistant::voice::{
    AudioCapture, AudioPlayback, AudioSink, ConnectivityProbe, CpalMicrophone, DecodedAudio,
    HttpProbe, ListenTiming, Listener, LocalVoice, PhraseDetector, PhraseProgress, SpeechInput,
    SpeechToText, Speaker, StaticProbe, Synthesizer, SystemVoice, TextToSpeech, UnavailableInput,
    calculate_energy,
};
use nova_assistant::{Config, Error};

/// NOVA - desktop voice assistant
#[derive(Parser)]
#[command(name = "nova", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Starting mode (voice, stt, tts)
    #[arg(short, long, env = "NOVA_MODE", default_value = "voice")]
    mode: Mode,

    /// Skip online synthesis and always use the local voice
    #[arg(long, env = "NOVA_OFFLINE")]
    offline: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Speak text once
    Say {
        /// Text to speak
        text: String,
    },
    /// Route a command once and print the reply
    Ask {
        /// Command text, e.g. "what time is it"
        text: String,
    },
    /// Listen for one phrase and print the transcription
    Listen,
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Interactive first-run setup
    Setup,
}

/// Services shared by every entry point
struct Assistant {
    speaker: Arc<Speaker>,
    input: Arc<dyn SpeechInput>,
    router: Arc<IntentRouter>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,nova_assistant=info",
        1 => "info,nova_assistant=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Handle subcommands that need no services
    match cli.command {
        Some(Command::Setup) => return nova_assistant::setup::run_setup(),
        Some(Command::TestMic { duration }) => return test_mic(duration),
        Some(Command::TestSpeaker) => return test_speaker(),
        _ => {}
    }

    let config = Config::load();
    tracing::debug!(?config, "loaded configuration");

    let assistant = build_assistant(&config, cli.offline)?;

    match cli.command {
        Some(Command::Say { text }) => {
            let path = assistant.speaker.speak_with_path(&text);
            println!("Spoken ({path:?})");
            Ok(())
        }
        Some(Command::Ask { text }) => {
            let response = assistant.router.route(&text);
            println!("NOVA: {}", response.text);
            Ok(())
        }
        Some(Command::Listen) => match assistant.input.capture_and_transcribe() {
            Ok(text) => {
                println!("You: {text}");
                Ok(())
            }
            Err(failure) => {
                println!("{}", failure_status(&failure));
                Err(Error::from(failure).into())
            }
        },
        _ => run_session(assistant, cli.mode),
    }
}

/// Run the interactive terminal session
fn run_session(assistant: Assistant, mode: Mode) -> anyhow::Result<()> {
    tracing::info!(mode = %mode, "starting session");

    let services = SessionServices {
        speech: assistant.speaker,
        input: assistant.input,
        router: assistant.router,
    };

    let (input_tx, input_rx) = tokio::sync::mpsc::unbounded_channel();
    console::spawn_input_reader(input_tx)?;

    let mut controller = SessionController::new(TerminalDisplay::stdout(), services);
    controller.set_mode(mode);

    // Blocking HTTP clients live in the services; they must not be dropped
    // inside the runtime, so the runtime goes first
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(console::run(&mut controller, input_rx));
    drop(runtime);

    tracing::info!("session ended");
    Ok(())
}

/// Wire up speech, input and routing from config
fn build_assistant(config: &Config, offline: bool) -> anyhow::Result<Assistant> {
    let probe: Arc<dyn ConnectivityProbe> = if offline {
        Arc::new(StaticProbe(false))
    } else {
        Arc::new(HttpProbe::from_config(&config.voice)?)
    };

    let synthesizer: Option<Arc<dyn Synthesizer>> = match TextToSpeech::from_config(config) {
        Ok(tts) => Some(Arc::new(tts)),
        Err(e) => {
            tracing::warn!(error = %e, "online voice unavailable");
            None
        }
    };

    let sink: Option<Arc<dyn AudioSink>> = match AudioPlayback::new() {
        Ok(playback) => Some(Arc::new(playback)),
        Err(e) => {
            tracing::warn!(error = %e, "audio output unavailable");
            None
        }
    };

    let local: Option<Box<dyn LocalVoice>> = match SystemVoice::detect() {
        Some(voice) => Some(Box::new(voice)),
        None => {
            tracing::warn!("no local speech engine found");
            None
        }
    };

    let speaker = Arc::new(Speaker::new(
        probe,
        synthesizer,
        sink,
        local,
        config.voice.language.clone(),
    ));

    let input: Arc<dyn SpeechInput> = match SpeechToText::from_config(config) {
        Ok(stt) => Arc::new(Listener::new(
            Arc::new(CpalMicrophone),
            Arc::new(stt),
            config.listen,
        )),
        Err(e) => {
            tracing::warn!(error = %e, "speech recognition unavailable");
            Arc::new(UnavailableInput::new(e.to_string()))
        }
    };

    let browser: Arc<dyn Browser> = Arc::new(SystemBrowser);
    let router = Arc::new(IntentRouter::new(RouterServices {
        speech: speaker.clone(),
        browser: Arc::clone(&browser),
        encyclopedia: Arc::new(Wikipedia::new()?),
        media: Arc::new(YouTubeLauncher::new(browser)?),
        clock: Arc::new(SystemClock),
    }));

    Ok(Assistant {
        speaker,
        input,
        router,
    })
}

/// Run the phrase detector on the live microphone and report what it hears
#[allow(clippy::cast_precision_loss)]
fn test_mic(duration: u64) -> anyhow::Result<()> {
    let timing = ListenTiming {
        onset_timeout: Duration::from_secs(duration),
        ..Config::load().listen
    };

    let mut capture = AudioCapture::new()?;
    let sample_rate = capture.sample_rate();
    let mut detector = PhraseDetector::new(sample_rate, timing);

    println!("Microphone check at {sample_rate} Hz");
    println!("Stay quiet while NOVA measures the room, then say a short phrase.\n");

    capture.start()?;
    let started = Instant::now();
    let mut phase = detector.phase();
    let mut peak_level = 0.0_f32;

    let outcome = loop {
        std::thread::sleep(Duration::from_millis(100));

        let chunk = capture.take_buffer();
        peak_level = peak_level.max(calculate_energy(&chunk));
        let progress = detector.feed(&chunk);

        if detector.phase() != phase {
            phase = detector.phase();
            println!(
                "{:>5.1}s  {phase:?} (threshold {:.4})",
                started.elapsed().as_secs_f32(),
                detector.threshold()
            );
        }

        match progress {
            PhraseProgress::Pending if started.elapsed() < timing.session_limit() => {}
            other => break other,
        }
    };
    capture.stop();

    match outcome {
        PhraseProgress::Complete(samples) => {
            println!(
                "\nHeard a {:.1}s phrase (loudest chunk RMS {peak_level:.4}).",
                samples.len() as f32 / sample_rate as f32
            );
            println!("The microphone works; `nova listen` will transcribe it.");
        }
        _ => {
            println!("\nNo phrase detected (loudest chunk RMS {peak_level:.4}).");
            println!("Check that the right input device is the system default,");
            println!("or raise the input gain if the level barely moved.");
        }
    }

    Ok(())
}

/// Play a short two-note chime through the output device
fn test_speaker() -> anyhow::Result<()> {
    let playback = AudioPlayback::new()?;

    let sample_rate = 24000_u32;
    let note_len = usize::try_from(sample_rate / 2)?;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = [523.25_f32, 659.25]
        .iter()
        .flat_map(|&frequency| {
            (0..note_len).map(move |i| {
                let t = i as f32 / sample_rate as f32;
                let fade = 1.0 - i as f32 / note_len as f32;
                (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 * fade
            })
        })
        .collect();

    println!("Playing a two-note chime...");
    playback.play(&DecodedAudio {
        samples,
        sample_rate,
    })?;

    match SystemVoice::detect() {
        Some(voice) => {
            println!("Local voice: {}", voice.program().display());
            voice.say("NOVA speaker check complete")?;
        }
        None => println!("No local voice engine; offline replies will be silent."),
    }

    println!("\nIf nothing was audible, check the default output device and its volume.");
    Ok(())
}
