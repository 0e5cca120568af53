//! Intent routing
//!
//! Classifies an utterance with ordered substring rules, performs the
//! matching action and speaks the reply.

mod clock;
mod rules;

use std::sync::Arc;

pub use clock::{Clock, FixedClock, SystemClock, format_date, format_time};
pub use rules::{Intent, IntentRule, default_rules, strip_keywords};

use crate::tools::{Browser, Encyclopedia, MediaLauncher};
use crate::voice::SpeechOutput;

/// Reply when nothing matches
pub const FALLBACK_REPLY: &str = "I'm not sure how to help with that. You can ask me about time, date, or to search Google or YouTube.";

/// Sentences requested from the encyclopedia
const SUMMARY_SENTENCES: u32 = 2;

/// Where an utterance came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceSource {
    /// Typed into the input line
    Typed,
    /// Produced by speech recognition
    Transcribed,
}

/// Raw input awaiting routing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceEvent {
    /// Text as entered or recognized
    pub raw_text: String,
    /// Origin of the text
    pub source: UtteranceSource,
}

impl UtteranceEvent {
    /// Typed utterance
    pub fn typed(text: impl Into<String>) -> Self {
        Self {
            raw_text: text.into(),
            source: UtteranceSource::Typed,
        }
    }

    /// Recognized utterance
    pub fn transcribed(text: impl Into<String>) -> Self {
        Self {
            raw_text: text.into(),
            source: UtteranceSource::Transcribed,
        }
    }
}

/// Result of routing an utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Reply shown to the user
    pub text: String,
    /// Whether the reply has already been spoken
    pub spoken: bool,
}

/// Collaborators the router acts through
#[derive(Clone)]
pub struct RouterServices {
    /// Speech output for replies
    pub speech: Arc<dyn SpeechOutput>,
    /// Web page opener
    pub browser: Arc<dyn Browser>,
    /// Encyclopedia lookups
    pub encyclopedia: Arc<dyn Encyclopedia>,
    /// Media playback
    pub media: Arc<dyn MediaLauncher>,
    /// Time source
    pub clock: Arc<dyn Clock>,
}

/// Maps utterances to actions and replies
///
/// The rule list is fixed at construction and the first matching rule wins.
pub struct IntentRouter {
    rules: Vec<IntentRule>,
    services: RouterServices,
}

impl IntentRouter {
    /// Router with the built-in rules
    #[must_use]
    pub fn new(services: RouterServices) -> Self {
        Self::with_rules(default_rules(), services)
    }

    /// Router with a custom rule list
    #[must_use]
    pub fn with_rules(rules: Vec<IntentRule>, services: RouterServices) -> Self {
        Self { rules, services }
    }

    /// Rules in evaluation order
    #[must_use]
    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    /// First intent whose rule matches `text` (already normalized)
    #[must_use]
    pub fn classify(&self, text: &str) -> Option<Intent> {
        self.rules
            .iter()
            .find(|rule| rule.matches(text))
            .map(|rule| rule.intent)
    }

    /// Route an utterance event
    pub fn handle(&self, event: UtteranceEvent) -> Response {
        tracing::debug!(source = ?event.source, "routing utterance");
        self.route(&event.raw_text)
    }

    /// Route raw text, act on it and speak the reply
    pub fn route(&self, text: &str) -> Response {
        let text = text.trim().to_lowercase();
        let intent = self.classify(&text);
        tracing::info!(?intent, "intent classified");

        let reply = match intent {
            Some(Intent::Greeting) => self.say("Hello! How can I help you today?".to_string()),
            Some(Intent::Time) => {
                let now = format_time(self.services.clock.now());
                self.say(format!("The current time is {now}"))
            }
            Some(Intent::Date) => {
                let today = format_date(self.services.clock.now());
                self.say(format!("Today is {today}"))
            }
            Some(Intent::YouTube) => {
                let reply = self.say("Opening YouTube".to_string());
                self.open("https://youtube.com");
                reply
            }
            Some(Intent::GoogleSearch) => self.google(&text),
            Some(Intent::Wikipedia) => self.wikipedia(&text),
            Some(Intent::PlayMedia) => self.play(&text),
            Some(Intent::Screenshot) => self.say("Taking screenshot".to_string()),
            Some(Intent::Weather) => self.say("Weather feature coming soon!".to_string()),
            None => self.say(FALLBACK_REPLY.to_string()),
        };

        Response {
            text: reply,
            spoken: true,
        }
    }

    fn google(&self, text: &str) -> String {
        let term = strip_keywords(text, &["google", "search"]);
        let reply = if term.is_empty() {
            self.open("https://google.com");
            "Opening Google".to_string()
        } else {
            self.open(&format!("https://www.google.com/search?q={term}"));
            format!("Searching Google for {term}")
        };
        self.say(reply)
    }

    fn wikipedia(&self, text: &str) -> String {
        let term = strip_keywords(text, &["wikipedia", "wiki"]);
        let reply = if term.is_empty() {
            "What would you like to search on Wikipedia?".to_string()
        } else {
            match self.services.encyclopedia.lookup(&term, SUMMARY_SENTENCES) {
                Ok(summary) => format!("According to Wikipedia: {summary}"),
                Err(e) => {
                    tracing::warn!(term = %term, error = %e, "wikipedia lookup failed");
                    "Sorry, I couldn't find that on Wikipedia".to_string()
                }
            }
        };
        self.say(reply)
    }

    fn play(&self, text: &str) -> String {
        let song = strip_keywords(text, &["play"]);
        let reply = if song.is_empty() {
            "What song would you like to play?".to_string()
        } else {
            if let Err(e) = self.services.media.play(&song) {
                tracing::warn!(song = %song, error = %e, "media launch failed");
            }
            format!("Playing {song} on YouTube")
        };
        self.say(reply)
    }

    fn open(&self, url: &str) {
        if let Err(e) = self.services.browser.open_url(url) {
            tracing::warn!(url, error = %e, "failed to open browser");
        }
    }

    fn say(&self, reply: String) -> String {
        self.services.speech.speak(&reply);
        reply
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::NaiveDate;

    use super::*;
    use crate::tools::LookupFailure;

    #[derive(Default)]
    struct Log(Mutex<Vec<String>>);

    impl Log {
        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl SpeechOutput for Log {
        fn speak(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    impl Browser for Log {
        fn open_url(&self, url: &str) -> crate::Result<()> {
            self.0.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    impl MediaLauncher for Log {
        fn play(&self, term: &str) -> crate::Result<()> {
            self.0.lock().unwrap().push(term.to_string());
            Ok(())
        }
    }

    struct NoWiki;

    impl Encyclopedia for NoWiki {
        fn lookup(&self, term: &str, _sentences: u32) -> Result<String, LookupFailure> {
            Err(LookupFailure::NotFound(term.to_string()))
        }
    }

    fn router() -> (IntentRouter, Arc<Log>, Arc<Log>) {
        let speech = Arc::new(Log::default());
        let actions = Arc::new(Log::default());
        let now = NaiveDate::from_ymd_opt(2026, 10, 18)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .unwrap();
        let router = IntentRouter::new(RouterServices {
            speech: speech.clone(),
            browser: actions.clone(),
            encyclopedia: Arc::new(NoWiki),
            media: actions.clone(),
            clock: Arc::new(FixedClock(now)),
        });
        (router, speech, actions)
    }

    #[test]
    fn test_time_and_date() {
        let (router, speech, _) = router();
        assert_eq!(router.route("What TIME is it").text, "The current time is 09:30 AM");
        assert_eq!(router.route("date").text, "Today is Sunday, October 18, 2026");
        assert_eq!(speech.entries().len(), 2);
    }

    #[test]
    fn test_youtube_speaks_then_opens() {
        let (router, speech, actions) = router();
        let response = router.route("open youtube");
        assert_eq!(response.text, "Opening YouTube");
        assert!(response.spoken);
        assert_eq!(speech.entries(), vec!["Opening YouTube"]);
        assert_eq!(actions.entries(), vec!["https://youtube.com"]);
    }

    #[test]
    fn test_bare_google_opens_home() {
        let (router, _, actions) = router();
        assert_eq!(router.route("google search").text, "Opening Google");
        assert_eq!(actions.entries(), vec!["https://google.com"]);
    }

    #[test]
    fn test_classify_unknown() {
        let (router, _, _) = router();
        assert_eq!(router.classify("xyz123"), None);
        assert_eq!(router.rules().len(), 9);
    }
}
