//! Transport layer abstraction.

use crate::dispatch::ResponseSink;
use crate::operation::OperationType;
use crate::options::Headers;
use crate::response::{RawResponse, ResponseStatus};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use tokio::task::AbortHandle;
use uuid::Uuid;

/// A transport issues the network call for a sync request.
///
/// The transport reports outcomes into the [`ResponseSink`] it is given,
/// at any later point and from any thread. It should report at most one
/// success or failure and then completion; the sink enforces this and fires
/// completion itself if the transport drops it early.
pub trait Transport: Send + Sync {
    /// Issues a request.
    fn request(&self, request: TransportRequest, sink: ResponseSink) -> RequestHandle;
}

/// Everything a transport needs to issue a request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// Request identifier.
    pub id: Uuid,
    /// Operation, sent as its HTTP verb.
    pub method: OperationType,
    /// Final request URL.
    pub url: String,
    /// Serialized body; empty when there is no payload.
    pub body: String,
    /// Expected response format.
    pub response_format: String,
    /// Format of the request body.
    pub content_type: String,
    /// Whether cached responses are acceptable.
    pub cache: bool,
    /// Extra request headers.
    pub headers: Headers,
}

/// Handle to an in-flight request, returned by the transport.
#[derive(Debug)]
pub struct RequestHandle {
    id: Uuid,
    abort: Option<AbortHandle>,
}

impl RequestHandle {
    /// Creates a handle that cannot be aborted.
    pub fn new(id: Uuid) -> Self {
        Self { id, abort: None }
    }

    /// Attaches the abort handle of the task driving the request.
    pub fn with_abort(mut self, abort: AbortHandle) -> Self {
        self.abort = Some(abort);
        self
    }

    /// Returns the request identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns true if the request can be aborted.
    pub fn is_abortable(&self) -> bool {
        self.abort.is_some()
    }

    /// Aborts the request. Returns false if the transport offers no abort.
    pub fn abort(&self) -> bool {
        match &self.abort {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

/// A scripted reply for [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Report a success, then completion.
    Success {
        /// Data handed to the success handler.
        data: Option<Value>,
        /// Raw response handle.
        raw: RawResponse,
    },
    /// Report a failure, then completion.
    Failure {
        /// Raw response handle.
        raw: RawResponse,
    },
    /// Never report anything; the request stays in flight until aborted.
    Hang,
}

impl MockReply {
    /// A 200 reply whose data arrives already decoded.
    pub fn json(value: Value) -> Self {
        let text = value.to_string();
        Self::Success {
            data: Some(value),
            raw: RawResponse::new(200, "OK").with_text(text),
        }
    }

    /// A reply whose data arrives as undecoded text.
    pub fn text(status_code: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::Success {
            data: Some(Value::String(body.clone())),
            raw: RawResponse::new(status_code, "OK").with_text(body),
        }
    }

    /// A 200 reply with no data, only a text body on the raw handle.
    pub fn raw_text(body: impl Into<String>) -> Self {
        Self::Success {
            data: None,
            raw: RawResponse::new(200, "OK").with_text(body),
        }
    }

    /// A 204 reply.
    pub fn empty() -> Self {
        Self::Success {
            data: None,
            raw: RawResponse::new(204, "No Content"),
        }
    }

    /// A failed reply with the given status and body.
    pub fn failure(status_code: u16, body: impl Into<String>) -> Self {
        Self::Failure {
            raw: RawResponse::new(status_code, "Error").with_text(body),
        }
    }

    fn deliver(self, sink: ResponseSink) {
        match self {
            MockReply::Success { data, raw } => {
                let status = ResponseStatus::from_code(raw.status_code);
                sink.success(data, status, raw.clone());
                sink.complete(status, raw);
            }
            MockReply::Failure { raw } => {
                sink.failure(raw.clone());
                sink.complete(ResponseStatus::Error, raw);
            }
            MockReply::Hang => {}
        }
    }
}

/// An in-memory transport for testing.
///
/// Records every request it receives and answers from a queue of scripted
/// replies, falling back to an empty 204 success. Replies are delivered on
/// a spawned task when a tokio runtime is available, inline otherwise.
#[derive(Debug, Default)]
pub struct MockTransport {
    requests: Mutex<Vec<TransportRequest>>,
    replies: Mutex<VecDeque<MockReply>>,
    held: Mutex<Vec<ResponseSink>>,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for the next request.
    pub fn push_reply(&self, reply: MockReply) {
        self.replies.lock().push_back(reply);
    }

    /// Returns all requests received so far.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }

    /// Returns the number of requests received.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Returns the most recent request.
    pub fn last_request(&self) -> Option<TransportRequest> {
        self.requests.lock().last().cloned()
    }

    /// Drops the sinks of hanging requests issued outside a runtime.
    pub fn release_held(&self) {
        self.held.lock().clear();
    }
}

impl Transport for MockTransport {
    fn request(&self, request: TransportRequest, sink: ResponseSink) -> RequestHandle {
        let id = request.id;
        self.requests.lock().push(request);
        let reply = self
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(MockReply::empty);

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let task = runtime.spawn(async move {
                    if reply == MockReply::Hang {
                        let _sink = sink;
                        std::future::pending::<()>().await;
                    } else {
                        reply.deliver(sink);
                    }
                });
                RequestHandle::new(id).with_abort(task.abort_handle())
            }
            Err(_) => {
                if reply == MockReply::Hang {
                    self.held.lock().push(sink);
                } else {
                    reply.deliver(sink);
                }
                RequestHandle::new(id)
            }
        }
    }
}
