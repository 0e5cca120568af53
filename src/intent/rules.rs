//! Keyword rules that classify an utterance

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Salutation
    Greeting,
    /// Current time of day
    Time,
    /// Today's date
    Date,
    /// Open the YouTube home page
    YouTube,
    /// Open Google, searching for the rest of the utterance if any
    GoogleSearch,
    /// Summarize a topic from Wikipedia
    Wikipedia,
    /// Play media on YouTube
    PlayMedia,
    /// Screenshot (acknowledged only)
    Screenshot,
    /// Weather (not yet available)
    Weather,
}

/// An intent and the keywords that select it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRule {
    /// Intent fired on a match
    pub intent: Intent,
    /// Any of these appearing as a substring is a match
    pub keywords: &'static [&'static str],
}

impl IntentRule {
    /// Whether any keyword occurs in `text`
    ///
    /// Matching is plain substring search, so `hi` also matches `this`.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|keyword| text.contains(keyword))
    }
}

/// The built-in rules in evaluation order
#[must_use]
pub fn default_rules() -> Vec<IntentRule> {
    vec![
        IntentRule {
            intent: Intent::Greeting,
            keywords: &["hello", "hi", "hey"],
        },
        IntentRule {
            intent: Intent::Time,
            keywords: &["time"],
        },
        IntentRule {
            intent: Intent::Date,
            keywords: &["date", "day"],
        },
        IntentRule {
            intent: Intent::YouTube,
            keywords: &["youtube"],
        },
        IntentRule {
            intent: Intent::GoogleSearch,
            keywords: &["google"],
        },
        IntentRule {
            intent: Intent::Wikipedia,
            keywords: &["wikipedia", "wiki"],
        },
        IntentRule {
            intent: Intent::PlayMedia,
            keywords: &["play"],
        },
        IntentRule {
            intent: Intent::Screenshot,
            keywords: &["screenshot"],
        },
        IntentRule {
            intent: Intent::Weather,
            keywords: &["weather"],
        },
    ]
}

/// Remove every occurrence of each word in order, then trim
#[must_use]
pub fn strip_keywords(text: &str, words: &[&str]) -> String {
    words
        .iter()
        .fold(text.to_string(), |acc, word| acc.replace(word, ""))
        .trim()
        .to_string()
}
