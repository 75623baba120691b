//! Unified error handling for the client.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network unreachable, non-2xx status, or a malformed response body.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The gateway answered but flagged the request as unsuccessful.
    #[error("request rejected by remote: {0}")]
    Rejected(String),

    /// Search completed but the code is unknown to the remote.
    #[error("code not found: {0}")]
    NotFound(String),

    /// Login completed but the credentials were not accepted.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An operation that needs an active session was called without one.
    #[error("no active session")]
    NotLoggedIn,

    /// A record-level operation was called with no record loaded.
    #[error("no record loaded")]
    NoActiveRecord,

    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("malformed stored data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("engine error: {0}")]
    Engine(#[from] rollstock_engine::Error),
}

impl Error {
    /// Whether the sync engine should treat this as retryable.
    ///
    /// Transport failures and business rejections are both retried with
    /// backoff; the queue is never dropped over either.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Rejected(_))
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
