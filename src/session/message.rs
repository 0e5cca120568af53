//! Messages posted from workers to the display thread

use tokio::sync::mpsc;

/// Who a transcript line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    /// The person using the assistant
    User,
    /// The assistant
    Assistant,
}

impl Speaker {
    /// Prefix shown before the line
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "NOVA",
        }
    }
}

/// Display update produced off the display thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiMessage {
    /// Append a transcript line, optionally replacing the status
    Line {
        /// Owner of the line
        speaker: Speaker,
        /// Line text without prefix
        text: String,
        /// New status text
        status: Option<String>,
    },
    /// Replace the status line
    Status(String),
}

/// Create the worker-to-display queue
#[must_use]
pub fn ui_queue() -> (UiSender, UiReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiSender(tx), UiReceiver(rx))
}

/// Producer half; cheap to clone into worker threads
#[derive(Debug, Clone)]
pub struct UiSender(mpsc::UnboundedSender<UiMessage>);

impl UiSender {
    /// Post a message
    pub fn send(&self, message: UiMessage) {
        if self.0.send(message).is_err() {
            tracing::debug!("display queue closed, dropping message");
        }
    }

    /// Post a transcript line
    pub fn line(&self, speaker: Speaker, text: impl Into<String>, status: Option<&str>) {
        self.send(UiMessage::Line {
            speaker,
            text: text.into(),
            status: status.map(str::to_string),
        });
    }

    /// Post a status change
    pub fn status(&self, text: impl Into<String>) {
        self.send(UiMessage::Status(text.into()));
    }
}

/// Consumer half, owned by the display thread
#[derive(Debug)]
pub struct UiReceiver(mpsc::UnboundedReceiver<UiMessage>);

impl UiReceiver {
    /// Take every message queued so far without blocking
    pub fn drain(&mut self) -> Vec<UiMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.0.try_recv() {
            messages.push(message);
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order() {
        let (tx, mut rx) = ui_queue();
        tx.status("Listening... Speak now");
        tx.line(Speaker::User, "time", Some("Processing..."));
        tx.status("Ready");

        let drained = rx.drain();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[0], UiMessage::Status("Listening... Speak now".into()));
        assert_eq!(drained[2], UiMessage::Status("Ready".into()));
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn test_send_after_receiver_dropped_is_silent() {
        let (tx, rx) = ui_queue();
        drop(rx);
        tx.status("Ready");
    }
}
