use thiserror::Error;

/// Errors produced by the REST boundary client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure: connection refused, DNS, timeout.
    /// Always retryable; never fatal to coordinator state.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered 401/403. The caller should route to sign-in.
    #[error("Not authorised")]
    Unauthorized,

    /// Any other non-2xx answer. `message` is the server's own `error`
    /// body field when present, a generic text otherwise.
    #[error("Server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Local file problem while preparing an upload.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Whether re-issuing the same call can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors produced by the live channel task.
#[derive(Error, Debug)]
pub enum SocketError {
    #[error("WebSocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Event serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The background task is gone; commands can no longer be delivered.
    #[error("Live channel closed")]
    ChannelClosed,
}
