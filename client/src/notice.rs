//! The notification side-channel.
//!
//! All user-visible signaling goes through this channel; core failures are
//! absorbed internally and never surface as blocking errors.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// A short message for the presentation layer to toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Sender half used throughout the core. Dropped receivers are tolerated;
/// notices are fire-and-forget.
pub type NoticeSender = mpsc::UnboundedSender<Notice>;

/// Receiver half handed to the presentation layer.
pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

/// Create the notice channel.
pub fn channel() -> (NoticeSender, NoticeReceiver) {
    mpsc::unbounded_channel()
}

/// Send a notice, ignoring a closed receiver.
pub(crate) fn send(tx: &NoticeSender, kind: NoticeKind, message: impl Into<String>) {
    let _ = tx.send(Notice::new(kind, message));
}
