//! JSON layer of the pipeline.
//!
//! Each function refines the output of the matching base stage for an
//! HTTP/JSON wire format.

use crate::error::{BodySource, SyncError, SyncResult};
use crate::options::{
    Headers, JsonMap, Options, Params, StandardOptions, DEFAULT_CONTENT_TYPE, DEFAULT_DATA_TYPE,
};
use crate::response::RawResponseArgs;
use serde_json::Value;
use tracing::trace;

/// Fills every missing option with its default.
///
/// A payload that is not a JSON object becomes "no payload".
pub fn standardize_options(options: Options) -> StandardOptions {
    let data = match options.data {
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            trace!(kind = value_kind(&other), "dropping non-object payload");
            None
        }
        None => None,
    };

    StandardOptions {
        data,
        data_type: options
            .data_type
            .unwrap_or_else(|| DEFAULT_DATA_TYPE.to_string()),
        content_type: options
            .content_type
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        params: options.params.unwrap_or_else(Params::new),
        headers: options.headers.unwrap_or_else(Headers::new),
        url: options.url,
    }
}

/// Appends the query parameters to the base URL.
///
/// Parameters are joined in insertion order as `key=value` with `&`, and are
/// not percent-encoded. A `?` is only inserted if the URL has none; a URL
/// with an existing query gets a `&` before the new parameters.
pub fn make_url(mut url: String, options: &StandardOptions) -> String {
    if options.params.is_empty() {
        return url;
    }
    if !url.contains('?') {
        url.push('?');
    } else if !url.ends_with('?') && !url.ends_with('&') {
        url.push('&');
    }
    let query = options
        .params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    url.push_str(&query);
    url
}

/// Encodes the request body.
///
/// Returns an empty string when the base stage reports no payload;
/// otherwise encodes the standardized payload.
pub fn serialize_data(base: Option<&JsonMap>, options: &StandardOptions) -> SyncResult<String> {
    if base.is_none() {
        return Ok(String::new());
    }
    Ok(serde_json::to_string(&options.data)?)
}

/// Decodes response data.
///
/// In order: JSON text handed over as data, then the raw response text when
/// no data arrived, then an empty object. Malformed text is an error.
/// A decoded `null` counts as absent; blank text is malformed.
pub fn parse_raw_response_data(args: RawResponseArgs<'_>) -> SyncResult<Value> {
    let mut data = match args.data {
        Some(Value::String(text)) => decode(text, BodySource::Data)?,
        Some(Value::Null) | None => None,
        Some(value) => Some(value.clone()),
    };

    if data.is_none() {
        if let Some(text) = args.raw.response_text.as_deref() {
            data = decode(text, BodySource::ResponseText)?;
        }
    }

    Ok(data.unwrap_or_else(|| Value::Object(JsonMap::new())))
}

fn decode(text: &str, origin: BodySource) -> SyncResult<Option<Value>> {
    match serde_json::from_str(text) {
        Ok(Value::Null) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(SyncError::malformed(origin, e)),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
