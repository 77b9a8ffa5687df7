//! Error types for the Pandu voice assistant

use thiserror::Error;

/// Result type alias for Pandu operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Pandu voice assistant
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (missing credential, bad value)
    #[error("configuration error: {0}")]
    Config(String),

    /// Input rejected before any work was attempted
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Transport failure reaching a remote endpoint
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Synthesis endpoint answered with a non-success status
    #[error("synthesis error {status}: {body}")]
    Synthesis {
        /// HTTP status code returned by the provider
        status: u16,
        /// Response body (JSON or plain text)
        body: String,
    },

    /// Intent provider returned something unusable
    #[error("intent error: {0}")]
    Intent(String),

    /// Notification sink could not deliver an alert
    #[error("notification error: {0}")]
    Notification(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// HTTP status carried by a synthesis failure, if any
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Synthesis { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether retrying the same request could succeed
    ///
    /// Timeouts, failed connects and dropped requests are transient, as are
    /// rate limits (429) and server errors (5xx). Builder and decode errors are not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Synthesis { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}
