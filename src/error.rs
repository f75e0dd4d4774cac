//! Custom error types for the backtest desk
//!
//! One enum per layer: request channel, strategy documents, backtest session,
//! chart data selector and configuration.

use thiserror::Error;

/// Authenticated request channel errors (transport taxonomy)
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ChannelError {
    /// Classify a reqwest failure, keeping timeouts distinct from other transport errors.
    pub fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            ChannelError::Timeout {
                url: url.to_string(),
            }
        } else {
            ChannelError::Transport(err)
        }
    }
}

/// Backtest session errors
#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("A backtest is already running")]
    AlreadyRunning,

    #[error("Backtest request failed: {0}")]
    Channel(#[from] ChannelError),

    #[error("Malformed backtest response: {0}")]
    MalformedResponse(String),
}

/// Strategy document load/save errors
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("File content is not a data URL")]
    NotDataUrl,

    #[error("Data URL is not base64 encoded")]
    NotBase64Encoded,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("File content is not valid UTF-8 text")]
    InvalidUtf8,

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Chart data selector errors
#[derive(Error, Debug)]
pub enum SelectorError {
    #[error("Chart data request failed: {0}")]
    Channel(#[from] ChannelError),

    #[error("Malformed chart data response: {0}")]
    MalformedResponse(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
