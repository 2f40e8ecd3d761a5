//! Error types shared across the core.

use thiserror::Error;

/// A forecast response that violates the sample format.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    #[error("malformed forecast sample #{index}: timestamp {timestamp:?} has no date component")]
    MalformedSample { index: usize, timestamp: String },

    #[error("forecast sample #{index} ({timestamp}) has a non-numeric temperature: {raw}")]
    InvalidTemperature {
        index: usize,
        timestamp: String,
        raw: String,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store key '{0}'")]
    InvalidKey(String),

    #[error("store rejected the write: {0}")]
    Rejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Writing a value to the key-value store failed. Non-fatal for callers.
#[derive(Debug, Error)]
#[error("failed to persist '{key}'")]
pub struct PersistenceError {
    pub key: String,
    #[source]
    pub source: StoreError,
}

/// Errors reported by a weather lookup collaborator.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid API key: {0}")]
    Unauthorized(String),

    #[error("Weather service returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode weather service response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn aggregate_errors_name_the_offending_entry() {
        let err = AggregateError::MalformedSample {
            index: 3,
            timestamp: "2024-01-01T09:00".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("#3"));
        assert!(msg.contains("2024-01-01T09:00"));

        let err = AggregateError::InvalidTemperature {
            index: 1,
            timestamp: "2024-01-01 09:00:00".into(),
            raw: "\"hot\"".into(),
        };
        assert!(err.to_string().contains("\"hot\""));
    }

    #[test]
    fn persistence_error_keeps_store_cause() {
        let err = PersistenceError {
            key: "weatherSearchHistory".into(),
            source: StoreError::Rejected("quota exceeded".into()),
        };
        assert!(err.to_string().contains("weatherSearchHistory"));
        let cause = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert!(cause.contains("quota exceeded"));
    }

    #[test]
    fn not_found_passes_service_message_through() {
        let err = LookupError::NotFound("city not found".into());
        assert_eq!(err.to_string(), "city not found");
    }
}
