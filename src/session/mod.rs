//! Interactive session: mode, input line and worker dispatch
//!
//! The [`SessionController`] lives on the display thread and is the only
//! thing that touches the [`Display`]. Workers report through [`UiMessage`]s.

mod controller;
mod message;
mod mode;

pub use controller::{
    AdvisoryState, Display, STATUS_CONVERTED, STATUS_FINISHED_SPEAKING, STATUS_LISTENING,
    STATUS_PROCESSING, STATUS_READY, STATUS_SPEAKING, STATUS_TRANSCRIBING, SessionController,
    SessionServices, error_status, failure_status,
};
pub use message::{Speaker, UiMessage, UiReceiver, UiSender, ui_queue};
pub use mode::{Mode, QuickCommand};
