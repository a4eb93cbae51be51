//! DOM host errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    /// The selector could not be parsed by the host.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// An element handle no longer refers to a live element.
    #[error("Element detached: {0}")]
    ElementDetached(String),

    /// A mounted node id is unknown to the host.
    #[error("Unknown node: {0}")]
    UnknownNode(u64),

    /// The host environment went away (page closed, connection lost).
    #[error("Host disconnected: {0}")]
    Disconnected(String),

    /// Host-side script or protocol failure.
    #[error("Host error: {0}")]
    Other(String),
}
