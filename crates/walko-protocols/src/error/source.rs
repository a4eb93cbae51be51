//! Content source and remote view store errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport-level failure (DNS, connect, timeout, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The source is not usable with the current configuration.
    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl SourceError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Decode(e.to_string())
    }
}
