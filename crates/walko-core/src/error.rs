//! Render controller errors.

use thiserror::Error;
use walko_protocols::HostError;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Host event stream closed")]
    EventStreamClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_display() {
        let err = ControllerError::from(HostError::Disconnected("socket reset".into()));
        assert!(err.to_string().contains("socket reset"));
    }

    #[test]
    fn test_stream_closed_display() {
        assert_eq!(
            ControllerError::EventStreamClosed.to_string(),
            "Host event stream closed"
        );
    }
}
