//! Device-local storage errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage query failed: {0}")]
    QueryError(String),

    #[error("Corrupt value for {key}: {message}")]
    Corrupt { key: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_display() {
        let err = StorageError::Corrupt {
            key: "walko_tour_1".to_string(),
            message: "expected object".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("walko_tour_1"));
        assert!(display.contains("expected object"));
    }
}
