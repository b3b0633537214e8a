//! Adapter error types.
//!
//! Every variant is fatal for the invocation that produced it. Nothing in the
//! adapter retries; errors are surfaced to the hosting platform, which turns
//! them into its own invocation-failure response.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::event::Protocol;

/// Errors that can occur while adapting a single invocation.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// No wire protocol matched the event (or a result tag was unknown).
    #[error("unsupported event kind: {0}")]
    UnsupportedEventKind(String),

    /// The event matched a protocol discriminator but could not be decoded.
    #[error("malformed {protocol} event: {source}")]
    MalformedEvent {
        protocol: Protocol,
        #[source]
        source: serde_json::Error,
    },

    /// A known prerendered asset could not be read from local storage.
    #[error("failed to read prerendered asset {}: {source}", path.display())]
    AssetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The synthetic request handed to the handler could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request handler failed or its response body could not be read.
    #[error("handler error: {0}")]
    Handler(String),
}

impl AdapterError {
    /// Short machine-readable name, used as the platform error type.
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::UnsupportedEventKind(_) => "UnsupportedEventKind",
            AdapterError::MalformedEvent { .. } => "MalformedEvent",
            AdapterError::AssetRead { .. } => "AssetReadFailure",
            AdapterError::InvalidRequest(_) => "InvalidRequest",
            AdapterError::Handler(_) => "HandlerFailure",
        }
    }
}

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Error body reported to the platform for a failed invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDocument {
    pub error_type: String,
    pub error_message: String,
}

impl From<&AdapterError> for ErrorDocument {
    fn from(err: &AdapterError) -> Self {
        Self {
            error_type: err.kind().to_string(),
            error_message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdapterError::UnsupportedEventKind("version 3.0".into());
        assert_eq!(err.to_string(), "unsupported event kind: version 3.0");

        let err = AdapterError::AssetRead {
            path: PathBuf::from("prerendered/index.html"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("prerendered/index.html"));
        assert_eq!(err.kind(), "AssetReadFailure");

        let doc = serde_json::to_value(ErrorDocument::from(&err)).unwrap();
        assert_eq!(doc["errorType"], "AssetReadFailure");
        assert!(doc["errorMessage"].as_str().unwrap().contains("gone"));
    }
}
