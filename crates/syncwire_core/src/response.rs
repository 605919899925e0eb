//! Transport responses and the arguments handed to response stages.

use crate::options::Headers;
use serde_json::Value;
use std::fmt;

/// Status token reported alongside a transport outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    /// 2xx response with a body.
    Success,
    /// 204 response.
    NoContent,
    /// 304 response.
    NotModified,
    /// Non-2xx response or network failure.
    Error,
    /// The request timed out.
    Timeout,
    /// A successful response whose body could not be parsed.
    ParserError,
    /// The request was aborted.
    Abort,
}

impl ResponseStatus {
    /// Returns the wire token.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Success => "success",
            ResponseStatus::NoContent => "nocontent",
            ResponseStatus::NotModified => "notmodified",
            ResponseStatus::Error => "error",
            ResponseStatus::Timeout => "timeout",
            ResponseStatus::ParserError => "parsererror",
            ResponseStatus::Abort => "abort",
        }
    }

    /// Returns true for the statuses reported with a successful outcome.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ResponseStatus::Success | ResponseStatus::NoContent | ResponseStatus::NotModified
        )
    }

    /// Maps an HTTP status code to its token.
    pub fn from_code(code: u16) -> Self {
        match code {
            204 => ResponseStatus::NoContent,
            304 => ResponseStatus::NotModified,
            200..=299 => ResponseStatus::Success,
            _ => ResponseStatus::Error,
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The raw response handle a transport reports with every outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    /// HTTP status code; 0 when no response was received.
    pub status_code: u16,
    /// Status text or transport error description.
    pub status_text: String,
    /// Response body as text, if any was read.
    pub response_text: Option<String>,
    /// Response headers.
    pub headers: Headers,
}

impl RawResponse {
    /// Creates a response handle for a received status.
    pub fn new(status_code: u16, status_text: impl Into<String>) -> Self {
        Self {
            status_code,
            status_text: status_text.into(),
            response_text: None,
            headers: Headers::new(),
        }
    }

    /// Creates the handle reported for an aborted request.
    pub fn aborted() -> Self {
        Self::new(0, ResponseStatus::Abort.as_str())
    }

    /// Sets the response text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.response_text = Some(text.into());
        self
    }

    /// Adds a response header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns the status code, or `None` when nothing was received.
    pub fn status(&self) -> Option<u16> {
        (self.status_code > 0).then_some(self.status_code)
    }
}

/// One report from the transport about an in-flight request.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    /// The request succeeded.
    Success {
        /// Response data as handed over by the transport, possibly raw text.
        data: Option<Value>,
        /// Status token.
        status: ResponseStatus,
        /// Raw response handle.
        raw: RawResponse,
    },
    /// The request failed.
    Failure {
        /// Raw response handle.
        raw: RawResponse,
    },
    /// The request finished, whatever the outcome.
    Completion {
        /// Status token.
        status: ResponseStatus,
        /// Raw response handle.
        raw: RawResponse,
    },
}

/// Input of the response parser.
#[derive(Debug, Clone, Copy)]
pub struct RawResponseArgs<'a> {
    /// Response data as handed over by the transport.
    pub data: Option<&'a Value>,
    /// Raw response handle.
    pub raw: &'a RawResponse,
}

/// Input of the success handler.
#[derive(Debug, Clone)]
pub struct SuccessArgs {
    /// Response data as handed over by the transport.
    pub data: Option<Value>,
    /// Status token.
    pub status: ResponseStatus,
    /// Raw response handle.
    pub raw: RawResponse,
}

/// Input of the error handler.
#[derive(Debug, Clone)]
pub struct ErrorArgs {
    /// Raw response handle.
    pub raw: RawResponse,
}

/// Input of the completion handler.
#[derive(Debug, Clone)]
pub struct CompleteArgs {
    /// Status token.
    pub status: ResponseStatus,
    /// Raw response handle.
    pub raw: RawResponse,
}
