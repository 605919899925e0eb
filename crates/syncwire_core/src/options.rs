//! Per-request options.
//!
//! [`Options`] is what callers hand to `sync`: every field is optional.
//! Standardization turns it into [`StandardOptions`], where every field is
//! present with its declared type. Downstream stages only ever see the
//! standardized form.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON object.
pub type JsonMap = serde_json::Map<String, Value>;

/// Query-string parameters, kept in insertion order.
pub type Params = IndexMap<String, String>;

/// Request headers, kept in insertion order.
pub type Headers = IndexMap<String, String>;

/// Response format used when none is given.
pub const DEFAULT_DATA_TYPE: &str = "json";

/// Request content format used when none is given.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Caller-supplied request options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Payload to send. Only JSON objects are sent; anything else means no body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Expected response format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Format of the request body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Query-string parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    /// Extra request headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    /// Explicit request URL, bypassing the entity's own URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Options {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the payload.
    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets the expected response format.
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    /// Sets the request content format.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Adds a query-string parameter.
    ///
    /// Values are rendered with `to_string` and sent without percent-encoding.
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params
            .get_or_insert_with(Params::new)
            .insert(key.into(), value.to_string());
        self
    }

    /// Adds a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    /// Sets an explicit request URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Options after standardization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardOptions {
    /// Payload to send; `None` means no body.
    pub data: Option<JsonMap>,
    /// Expected response format.
    pub data_type: String,
    /// Format of the request body.
    pub content_type: String,
    /// Query-string parameters.
    pub params: Params,
    /// Extra request headers.
    pub headers: Headers,
    /// Explicit request URL, if one was given.
    pub url: Option<String>,
}

impl StandardOptions {
    /// Returns true if a payload will be sent.
    pub fn has_payload(&self) -> bool {
        self.data.is_some()
    }
}

impl Default for StandardOptions {
    fn default() -> Self {
        Self {
            data: None,
            data_type: DEFAULT_DATA_TYPE.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            params: Params::new(),
            headers: Headers::new(),
            url: None,
        }
    }
}

impl From<StandardOptions> for Options {
    fn from(options: StandardOptions) -> Self {
        Self {
            data: options.data.map(Value::Object),
            data_type: Some(options.data_type),
            content_type: Some(options.content_type),
            params: Some(options.params),
            headers: Some(options.headers),
            url: options.url,
        }
    }
}
