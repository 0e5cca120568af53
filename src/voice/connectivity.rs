//! Reachability check run before network synthesis

use std::time::Duration;

use crate::Result;
use crate::config::VoiceConfig;

/// Answers whether the network synthesis path is worth trying
pub trait ConnectivityProbe: Send + Sync {
    /// `true` if the probe host answered within the timeout
    fn is_online(&self) -> bool;
}

/// Probes a well-known host with a short GET
pub struct HttpProbe {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpProbe {
    /// Create a probe for `url`
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Create a probe from voice config
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn from_config(voice: &VoiceConfig) -> Result<Self> {
        Self::new(voice.connectivity_url.clone(), voice.connectivity_timeout)
    }
}

impl ConnectivityProbe for HttpProbe {
    fn is_online(&self) -> bool {
        // Any HTTP response means the network is up
        match self.client.get(&self.url).send() {
            Ok(response) => {
                tracing::trace!(status = %response.status(), "connectivity probe answered");
                true
            }
            Err(e) => {
                tracing::debug!(url = %self.url, error = %e, "connectivity probe failed");
                false
            }
        }
    }
}

/// Probe with a fixed answer
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe(pub bool);

impl ConnectivityProbe for StaticProbe {
    fn is_online(&self) -> bool {
        self.0
    }
}
