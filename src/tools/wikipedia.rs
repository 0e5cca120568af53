//! Encyclopedia summaries from the Wikipedia `MediaWiki` API

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::Result;

const API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Why a lookup produced no summary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupFailure {
    /// No page matches the term
    #[error("no page found for {0:?}")]
    NotFound(String),

    /// The best match is a disambiguation page
    #[error("{0:?} is ambiguous")]
    Ambiguous(String),

    /// Network or response error
    #[error("lookup failed: {0}")]
    Service(String),
}

/// Looks up short encyclopedia summaries
pub trait Encyclopedia: Send + Sync {
    /// Summarize `term` in at most `sentences` sentences
    ///
    /// # Errors
    ///
    /// Returns the reason no summary is available
    fn lookup(&self, term: &str, sentences: u32) -> std::result::Result<String, LookupFailure>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    missing: Option<serde_json::Value>,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    pageprops: Option<HashMap<String, serde_json::Value>>,
}

/// Wikipedia client
pub struct Wikipedia {
    client: reqwest::blocking::Client,
    api_url: String,
}

impl Wikipedia {
    /// Create a client for English Wikipedia
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new() -> Result<Self> {
        Self::with_api_url(API_URL)
    }

    /// Create a client for another `MediaWiki` endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn with_api_url(api_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("nova-assistant/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    fn best_title(&self, term: &str) -> std::result::Result<String, LookupFailure> {
        let response: SearchResponse = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", term),
                ("srlimit", "1"),
                ("format", "json"),
            ])
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(|r| r.json::<SearchResponse>())
            .map_err(service)?;

        response
            .query
            .and_then(|q| q.search.into_iter().next())
            .map(|hit| hit.title)
            .ok_or_else(|| LookupFailure::NotFound(term.to_string()))
    }

    fn intro(&self, title: &str, sentences: u32) -> std::result::Result<String, LookupFailure> {
        let sentences = sentences.max(1).to_string();
        let response: ExtractResponse = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("prop", "extracts|pageprops"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exsentences", sentences.as_str()),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
            ])
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(|r| r.json::<ExtractResponse>())
            .map_err(service)?;

        let page = response
            .query
            .and_then(|q| q.pages.into_values().next())
            .ok_or_else(|| LookupFailure::NotFound(title.to_string()))?;

        summary_from_page(title, page)
    }
}

impl Encyclopedia for Wikipedia {
    fn lookup(&self, term: &str, sentences: u32) -> std::result::Result<String, LookupFailure> {
        let term = term.trim();
        if term.is_empty() {
            return Err(LookupFailure::NotFound(String::new()));
        }

        let title = self.best_title(term)?;
        tracing::debug!(term, title = %title, "wikipedia title resolved");
        self.intro(&title, sentences)
    }
}

fn summary_from_page(title: &str, page: Page) -> std::result::Result<String, LookupFailure> {
    if page.missing.is_some() {
        return Err(LookupFailure::NotFound(title.to_string()));
    }

    if page
        .pageprops
        .as_ref()
        .is_some_and(|props| props.contains_key("disambiguation"))
    {
        return Err(LookupFailure::Ambiguous(title.to_string()));
    }

    page.extract
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| LookupFailure::NotFound(title.to_string()))
}

fn service(e: reqwest::Error) -> LookupFailure {
    tracing::warn!(error = %e, "wikipedia request failed");
    LookupFailure::Service(e.to_string())
}
