//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration against a local backend.

use std::path::PathBuf;
use std::time::Duration;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend.
    /// Env: `SPOTTER_SERVER_URL`
    /// Default: `http://localhost:3000`
    pub server_url: String,

    /// URL of the live WebSocket channel.
    /// Env: `SPOTTER_SOCKET_URL`
    /// Default: `ws://localhost:3000/live`
    pub socket_url: String,

    /// Per-request HTTP timeout. A request past this surfaces a
    /// retryable failure instead of hanging.
    /// Env: `SPOTTER_HTTP_TIMEOUT_SECS`
    /// Default: 10 seconds.
    pub http_timeout: Duration,

    /// Overrides the platform data directory for the local store.
    /// Env: `SPOTTER_DATA_DIR`
    /// Default: unset (platform data dir).
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3000".to_string(),
            socket_url: "ws://localhost:3000/live".to_string(),
            http_timeout: Duration::from_secs(10),
            data_dir: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults. Invalid values warn and keep the default rather than
    /// failing startup.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("SPOTTER_SERVER_URL") {
            if !url.is_empty() {
                config.server_url = url;
            }
        }

        if let Ok(url) = std::env::var("SPOTTER_SOCKET_URL") {
            if !url.is_empty() {
                config.socket_url = url;
            }
        }

        if let Ok(val) = std::env::var("SPOTTER_HTTP_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => config.http_timeout = Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        value = %val,
                        "Invalid SPOTTER_HTTP_TIMEOUT_SECS, using default"
                    );
                }
            }
        }

        if let Ok(dir) = std::env::var("SPOTTER_DATA_DIR") {
            if !dir.is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}
