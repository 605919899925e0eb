//! HTTP transport backed by reqwest.
//!
//! Each request runs on its own tokio task. The task reports exactly one
//! success or failure into the request's [`ResponseSink`] and then
//! completion; aborting the task drops the sink, which reports an abort.

use crate::config::HttpConfig;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE, PRAGMA,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use syncwire_core::{
    Headers, OperationType, RawResponse, RequestHandle, ResponseSink, ResponseStatus, SyncError,
    SyncResult, Transport, TransportRequest,
};
use tracing::{debug, warn};

/// Transport that issues requests with a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    config: HttpConfig,
}

impl ReqwestTransport {
    /// Creates a transport with the default configuration.
    pub fn new() -> SyncResult<Self> {
        Self::with_config(HttpConfig::default())
    }

    /// Creates a transport with the given configuration.
    pub fn with_config(config: HttpConfig) -> SyncResult<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            SyncError::transport(None, format!("failed to build HTTP client: {e}"))
        })?;
        Ok(Self { client, config })
    }

    /// Wraps an existing client.
    ///
    /// The client's own settings apply; `config` is only reported back.
    pub fn from_client(client: Client, config: HttpConfig) -> Self {
        Self { client, config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    fn build(&self, request: &TransportRequest) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method_for(request.method), &request.url)
            .headers(headers_for(request));

        if !request.cache && request.method == OperationType::Read {
            builder = builder.query(&[("_", cache_buster())]);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }
        builder
    }
}

impl Transport for ReqwestTransport {
    fn request(&self, request: TransportRequest, sink: ResponseSink) -> RequestHandle {
        let id = request.id;
        let builder = self.build(&request);

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let task = runtime.spawn(execute(builder, sink));
                RequestHandle::new(id).with_abort(task.abort_handle())
            }
            Err(_) => {
                warn!(request_id = %id, "no tokio runtime, request not sent");
                let raw = RawResponse::new(0, ResponseStatus::Error.as_str())
                    .with_text("no tokio runtime available to run the request");
                sink.failure(raw.clone());
                sink.complete(ResponseStatus::Error, raw);
                RequestHandle::new(id)
            }
        }
    }
}

async fn execute(builder: RequestBuilder, sink: ResponseSink) {
    let request_id = sink.request_id();
    let response = match builder.send().await {
        Ok(response) => response,
        Err(e) => {
            let status = if e.is_timeout() {
                ResponseStatus::Timeout
            } else {
                ResponseStatus::Error
            };
            warn!(%request_id, %status, error = %e, "HTTP request failed");
            let raw = RawResponse::new(0, status.as_str()).with_text(e.to_string());
            sink.failure(raw.clone());
            sink.complete(status, raw);
            return;
        }
    };

    let code = response.status().as_u16();
    let reason = response
        .status()
        .canonical_reason()
        .unwrap_or_default()
        .to_string();
    let headers = response_headers(&response);

    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            let status = if e.is_timeout() {
                ResponseStatus::Timeout
            } else {
                ResponseStatus::Error
            };
            warn!(%request_id, code, error = %e, "failed to read response body");
            let mut raw = RawResponse::new(code, status.as_str()).with_text(e.to_string());
            raw.headers = headers;
            sink.failure(raw.clone());
            sink.complete(status, raw);
            return;
        }
    };
    debug!(%request_id, code, body_len = text.len(), "HTTP response received");

    // An empty body is no data at all, not empty JSON text.
    let body = (!text.is_empty()).then_some(text);
    let mut raw = RawResponse::new(code, reason);
    raw.response_text = body.clone();
    raw.headers = headers;

    let status = ResponseStatus::from_code(code);
    if status.is_success() {
        sink.success(body.map(Value::String), status, raw.clone());
    } else {
        sink.failure(raw.clone());
    }
    sink.complete(status, raw);
}

fn method_for(operation: OperationType) -> Method {
    match operation {
        OperationType::Create => Method::POST,
        OperationType::Read => Method::GET,
        OperationType::Update => Method::PUT,
        OperationType::Delete => Method::DELETE,
    }
}

/// Returns the `Accept` header for a response format.
pub fn accept_for(format: &str) -> &'static str {
    match format.to_ascii_lowercase().as_str() {
        "json" => "application/json, text/javascript, */*; q=0.01",
        "text" => "text/plain, */*; q=0.01",
        "xml" => "application/xml, text/xml, */*; q=0.01",
        "html" => "text/html, */*; q=0.01",
        _ => "*/*",
    }
}

fn headers_for(request: &TransportRequest) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(accept_for(&request.response_format)),
    );
    if !request.body.is_empty() {
        match HeaderValue::from_str(&request.content_type) {
            Ok(value) => {
                headers.insert(CONTENT_TYPE, value);
            }
            Err(_) => warn!(
                request_id = %request.id,
                content_type = %request.content_type,
                "invalid content type not sent"
            ),
        }
    }
    if !request.cache && request.method == OperationType::Read {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    }

    // Caller headers win over the defaults above.
    for (name, value) in &request.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!(request_id = %request.id, header = %name, "invalid header skipped"),
        }
    }
    headers
}

fn response_headers(response: &Response) -> Headers {
    response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

fn cache_buster() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|elapsed| u64::try_from(elapsed.as_millis()).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: OperationType, body: &str, cache: bool) -> TransportRequest {
        let mut headers = Headers::new();
        headers.insert("X-Trace".into(), "abc".into());
        headers.insert("Accept".into(), "application/vnd.notes+json".into());
        TransportRequest {
            id: Default::default(),
            method,
            url: "http://localhost/notes".into(),
            body: body.into(),
            response_format: "json".into(),
            content_type: "application/json".into(),
            cache,
            headers,
        }
    }

    #[test]
    fn methods_follow_operations() {
        assert_eq!(method_for(OperationType::Create), Method::POST);
        assert_eq!(method_for(OperationType::Read), Method::GET);
        assert_eq!(method_for(OperationType::Update), Method::PUT);
        assert_eq!(method_for(OperationType::Delete), Method::DELETE);
    }

    #[test]
    fn accept_header_by_format() {
        assert!(accept_for("json").starts_with("application/json"));
        assert!(accept_for("TEXT").starts_with("text/plain"));
        assert_eq!(accept_for("binary"), "*/*");
    }

    #[test]
    fn content_type_only_with_body() {
        let headers = headers_for(&request(OperationType::Update, r#"{"a":1}"#, true));
        assert_eq!(headers[CONTENT_TYPE], "application/json");

        let headers = headers_for(&request(OperationType::Delete, "", true));
        assert!(!headers.contains_key(CONTENT_TYPE));
    }

    #[test]
    fn no_cache_headers_on_uncached_reads() {
        let headers = headers_for(&request(OperationType::Read, "", false));
        assert_eq!(headers[CACHE_CONTROL], "no-cache");
        assert_eq!(headers[PRAGMA], "no-cache");

        let headers = headers_for(&request(OperationType::Read, "", true));
        assert!(!headers.contains_key(CACHE_CONTROL));
    }

    #[test]
    fn caller_headers_override_defaults() {
        let headers = headers_for(&request(OperationType::Read, "", true));
        assert_eq!(headers["x-trace"], "abc");
        assert_eq!(headers[ACCEPT], "application/vnd.notes+json");
    }
}
