//! Error types for the sync pipeline.

use std::fmt;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Where a response body that failed to decode came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySource {
    /// The data value handed over by the transport.
    Data,
    /// The text body of the raw response handle.
    ResponseText,
}

impl fmt::Display for BodySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodySource::Data => f.write_str("response data"),
            BodySource::ResponseText => f.write_str("response text"),
        }
    }
}

/// Errors that can occur while synchronizing an entity.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The response carried JSON text that could not be decoded.
    #[error("malformed {origin}: {source}")]
    MalformedResponseBody {
        /// Which part of the response was being decoded.
        origin: BodySource,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// Network or transport error reported for the request.
    #[error("transport error{}: {message}", status_suffix(.status))]
    Transport {
        /// HTTP status code, if a response was received.
        status: Option<u16>,
        /// Error message.
        message: String,
    },

    /// The request payload could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An operation token did not name a known operation.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The request was aborted before the transport reported an outcome.
    #[error("request aborted")]
    Aborted,
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) if *code > 0 => format!(" (status {code})"),
        _ => String::new(),
    }
}

impl SyncError {
    /// Creates a transport error.
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    /// Creates a malformed-body error.
    pub fn malformed(origin: BodySource, source: serde_json::Error) -> Self {
        Self::MalformedResponseBody { origin, source }
    }

    /// Returns true if this error was reported by the transport.
    pub fn is_transport(&self) -> bool {
        matches!(self, SyncError::Transport { .. } | SyncError::Aborted)
    }

    /// Returns the HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}
