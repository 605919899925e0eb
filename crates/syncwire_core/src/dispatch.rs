//! Routing of transport outcomes to the response handlers.
//!
//! A [`ResponseSink`] is handed to the transport with every request. Each
//! outcome reported into it runs the matching handler on the adapter and is
//! forwarded as a [`SyncEvent`] to the caller's [`PendingRequest`].
//!
//! Per request at most one success or failure is handled, and completion is
//! handled exactly once. A sink dropped before completion reports an abort.

use crate::adapter::{JsonAdapter, SyncCall};
use crate::error::{SyncError, SyncResult};
use crate::response::{
    CompleteArgs, ErrorArgs, RawResponse, ResponseOutcome, ResponseStatus, SuccessArgs,
};
use crate::transport::RequestHandle;
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

/// A handled outcome, as seen by the caller.
#[derive(Debug)]
pub enum SyncEvent {
    /// The success handler produced data.
    Success {
        /// Parsed response data.
        data: Value,
        /// Status token.
        status: ResponseStatus,
    },
    /// The error handler ran, or the success handler failed.
    Error(SyncError),
    /// The completion handler ran. Always the last event.
    Complete {
        /// Status token.
        status: ResponseStatus,
    },
}

#[derive(Debug, Default)]
struct SinkState {
    responded: bool,
    completed: bool,
    parse_failed: bool,
}

/// Receiver of transport outcomes for one request.
pub struct ResponseSink {
    adapter: JsonAdapter,
    call: Arc<SyncCall>,
    events: mpsc::UnboundedSender<SyncEvent>,
    state: Mutex<SinkState>,
}

impl ResponseSink {
    pub(crate) fn new(
        adapter: JsonAdapter,
        call: Arc<SyncCall>,
        events: mpsc::UnboundedSender<SyncEvent>,
    ) -> Self {
        Self {
            adapter,
            call,
            events,
            state: Mutex::new(SinkState::default()),
        }
    }

    /// Returns the request identifier.
    pub fn request_id(&self) -> Uuid {
        self.call.id
    }

    /// Returns the resolved request this sink belongs to.
    pub fn call(&self) -> &SyncCall {
        &self.call
    }

    /// Returns true once completion has been handled.
    pub fn is_completed(&self) -> bool {
        self.state.lock().completed
    }

    /// Reports an outcome.
    pub fn report(&self, outcome: ResponseOutcome) {
        match outcome {
            ResponseOutcome::Success { data, status, raw } => self.success(data, status, raw),
            ResponseOutcome::Failure { raw } => self.failure(raw),
            ResponseOutcome::Completion { status, raw } => self.complete(status, raw),
        }
    }

    /// Reports a successful response.
    pub fn success(&self, data: Option<Value>, status: ResponseStatus, raw: RawResponse) {
        if !self.claim_response("success") {
            return;
        }
        let args = SuccessArgs { data, status, raw };
        let event = match self.adapter.success_response_handler(&self.call, &args) {
            Ok(data) => SyncEvent::Success { data, status },
            Err(error) => {
                warn!(request_id = %self.call.id, %error, "response could not be parsed");
                self.state.lock().parse_failed = true;
                SyncEvent::Error(error)
            }
        };
        self.emit(event);
    }

    /// Reports a failed request.
    pub fn failure(&self, raw: RawResponse) {
        if !self.claim_response("failure") {
            return;
        }
        let error = self
            .adapter
            .error_response_handler(&self.call, &ErrorArgs { raw });
        self.emit(SyncEvent::Error(error));
    }

    /// Reports that the request finished.
    ///
    /// A success status is reported as [`ResponseStatus::ParserError`] when
    /// the success handler failed.
    pub fn complete(&self, status: ResponseStatus, raw: RawResponse) {
        let status = {
            let mut state = self.state.lock();
            if state.completed {
                warn!(request_id = %self.call.id, "duplicate completion ignored");
                return;
            }
            state.completed = true;
            state.responded = true;
            if state.parse_failed && status.is_success() {
                ResponseStatus::ParserError
            } else {
                status
            }
        };
        let status = self
            .adapter
            .complete_response_handler(&self.call, &CompleteArgs { status, raw });
        self.emit(SyncEvent::Complete { status });
    }

    fn claim_response(&self, kind: &str) -> bool {
        let mut state = self.state.lock();
        if state.responded || state.completed {
            warn!(request_id = %self.call.id, kind, "late or duplicate outcome ignored");
            return false;
        }
        state.responded = true;
        true
    }

    fn emit(&self, event: SyncEvent) {
        // The caller may have dropped its pending request.
        let _ = self.events.send(event);
    }
}

impl Drop for ResponseSink {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.completed {
            return;
        }
        let responded = state.responded;
        if !responded {
            self.failure(RawResponse::aborted());
        }
        self.complete(ResponseStatus::Abort, RawResponse::aborted());
    }
}

impl fmt::Debug for ResponseSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseSink")
            .field("request_id", &self.call.id)
            .field("state", &*self.state.lock())
            .finish()
    }
}

/// A request handed to the transport.
///
/// The response handlers run whether or not this value is polled; it only
/// observes their results.
#[derive(Debug)]
pub struct PendingRequest {
    id: Uuid,
    handle: RequestHandle,
    events: mpsc::UnboundedReceiver<SyncEvent>,
    completed: bool,
}

impl PendingRequest {
    pub(crate) fn new(
        id: Uuid,
        handle: RequestHandle,
        events: mpsc::UnboundedReceiver<SyncEvent>,
    ) -> Self {
        Self {
            id,
            handle,
            events,
            completed: false,
        }
    }

    /// Returns the request identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the transport's handle.
    pub fn handle(&self) -> &RequestHandle {
        &self.handle
    }

    /// Aborts the request through the transport's handle.
    pub fn abort(&self) -> bool {
        self.handle.abort()
    }

    /// Waits for the next handled outcome; `None` after completion.
    pub async fn next_event(&mut self) -> Option<SyncEvent> {
        if self.completed {
            return None;
        }
        let event = self.events.recv().await;
        if matches!(event, Some(SyncEvent::Complete { .. }) | None) {
            self.completed = true;
        }
        event
    }

    /// Waits for completion and returns the parsed data or the error.
    pub async fn finish(mut self) -> SyncResult<Value> {
        let mut result = None;
        while let Some(event) = self.next_event().await {
            match event {
                SyncEvent::Success { data, .. } => result = Some(Ok(data)),
                SyncEvent::Error(error) => result = Some(Err(error)),
                SyncEvent::Complete { .. } => {}
            }
        }
        result.unwrap_or_else(|| {
            Err(SyncError::transport(
                None,
                "request completed without a response",
            ))
        })
    }
}
