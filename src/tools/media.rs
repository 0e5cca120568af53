//! Playing media on YouTube

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;

use super::browser::Browser;
use crate::{Error, Result};

/// Starts playback of a named piece of media
pub trait MediaLauncher: Send + Sync {
    /// Launch playback for `term`
    ///
    /// # Errors
    ///
    /// Returns error if nothing could be opened
    fn play(&self, term: &str) -> Result<()>;
}

/// Finds the first YouTube result for a term and opens its watch page
pub struct YouTubeLauncher {
    client: reqwest::blocking::Client,
    browser: Arc<dyn Browser>,
    video_id: Regex,
}

impl YouTubeLauncher {
    /// Create a launcher that opens pages through `browser`
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(browser: Arc<dyn Browser>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64)")
            .build()?;
        let video_id = Regex::new(r#""videoId":"([\w-]{11})""#)
            .map_err(|e| Error::Launch(e.to_string()))?;

        Ok(Self {
            client,
            browser,
            video_id,
        })
    }

    fn first_video(&self, results_url: &str) -> Result<Option<String>> {
        let body = self
            .client
            .get(results_url)
            .send()?
            .error_for_status()?
            .text()?;
        Ok(first_video_id(&self.video_id, &body))
    }
}

impl MediaLauncher for YouTubeLauncher {
    fn play(&self, term: &str) -> Result<()> {
        let results_url = search_url(term);

        let target = match self.first_video(&results_url) {
            Ok(Some(id)) => format!("https://www.youtube.com/watch?v={id}"),
            Ok(None) => {
                tracing::debug!(term, "no video id in results, opening search page");
                results_url
            }
            Err(e) => {
                tracing::warn!(term, error = %e, "youtube search failed, opening search page");
                results_url
            }
        };

        self.browser.open_url(&target)
    }
}

/// YouTube results page for `term`
#[must_use]
pub fn search_url(term: &str) -> String {
    format!(
        "https://www.youtube.com/results?search_query={}",
        urlencoding::encode(term.trim())
    )
}

fn first_video_id(pattern: &Regex, body: &str) -> Option<String> {
    pattern
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
