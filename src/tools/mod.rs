//! Side-effecting actions triggered by intents

mod browser;
mod media;
mod wikipedia;

pub use browser::{Browser, SystemBrowser, normalize_url};
pub use media::{MediaLauncher, YouTubeLauncher, search_url};
pub use wikipedia::{Encyclopedia, LookupFailure, Wikipedia};
