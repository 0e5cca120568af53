//! Opening URLs in the user's default browser

use std::process::{Command, Stdio};

use url::Url;

use crate::{Error, Result};

/// Opens web pages
pub trait Browser: Send + Sync {
    /// Open `url`, returning once the opener has been launched
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid or no opener could be started
    fn open_url(&self, url: &str) -> Result<()>;
}

/// Hands URLs to the platform opener (`xdg-open`, `open`, `cmd /C start`)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open_url(&self, url: &str) -> Result<()> {
        let url = normalize_url(url)?;
        tracing::info!(url = %url, "opening browser");

        let mut command = opener_command(url.as_str());
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Not waited on; the opener exits on its own
        command
            .spawn()
            .map_err(|e| Error::Launch(format!("failed to open {url}: {e}")))?;
        Ok(())
    }
}

/// Parse and percent-encode a URL
///
/// # Errors
///
/// Returns error if `raw` is not an absolute http(s) URL
pub fn normalize_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| Error::Launch(format!("invalid URL {raw}: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::Launch(format!("refusing to open {other} URL"))),
    }
}

#[cfg(target_os = "macos")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(target_os = "windows")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("cmd");
    // Empty title argument so `start` does not treat the URL as one
    command.args(["/C", "start", ""]).arg(url);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
}
