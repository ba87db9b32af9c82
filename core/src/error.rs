//! Error types for the PetFriends client.
//!
//! # Design
//! Only two things interrupt an operation: the transport produced no
//! response at all, or a photo file could not be read before sending.
//! Service-reported failures (any 4xx/5xx) and non-JSON bodies are ordinary
//! `NormalizedResponse` values, so they have no variant here.

use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by `PetFriendsClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received from the service.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The photo at `path` could not be read. No request was sent.
    #[error("cannot read photo {}: {source}", path.display())]
    Photo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A transport-level failure: connection refused, DNS, timeout and the like.
#[derive(Debug, Error)]
#[error("transport failed: {message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(feature = "blocking")]
impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_connect() {
            "could not connect to service".to_string()
        } else if e.is_timeout() {
            "request timed out".to_string()
        } else if e.is_builder() {
            "invalid request".to_string()
        } else {
            e.to_string()
        };
        TransportError::with_source(message, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_error_names_the_path() {
        let err = ApiError::Photo {
            path: PathBuf::from("images/missing.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("images/missing.jpg"), "{msg}");
        assert!(msg.contains("no such file"), "{msg}");
    }

    #[test]
    fn transport_error_is_transparent() {
        let err = ApiError::from(TransportError::new("connection refused"));
        assert_eq!(err.to_string(), "transport failed: connection refused");
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn transport_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = TransportError::with_source("could not connect", io);
        assert!(StdError::source(&err).is_some());
        assert_eq!(err.message(), "could not connect");
    }
}
