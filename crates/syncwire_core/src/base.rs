//! Base adapter behaviour.
//!
//! These are the defaults every stage starts from before the JSON layer
//! refines the result. They carry no wire-format knowledge.

use crate::adapter::SyncCall;
use crate::config::AdapterConfig;
use crate::context::Context;
use crate::entity::Entity;
use crate::error::SyncError;
use crate::operation::{OperationType, TypeHint};
use crate::options::{JsonMap, Options, StandardOptions};
use crate::response::{CompleteArgs, ErrorArgs, RawResponseArgs, ResponseStatus};
use serde_json::Value;
use tracing::{debug, warn};

/// Resolves the operation from the caller's hint and the entity state.
pub fn resolve_request_type(
    entity: &Entity,
    hint: &TypeHint,
    _options: &Options,
    _context: Option<&Context>,
) -> OperationType {
    match hint {
        TypeHint::Operation(op) => *op,
        TypeHint::Token(token) => token.parse().unwrap_or_else(|_| {
            debug!(%token, "unknown operation token, defaulting to read");
            OperationType::Read
        }),
        TypeHint::Save => match entity.as_record() {
            Some(record) if !record.is_new() => OperationType::Update,
            _ => OperationType::Create,
        },
        TypeHint::Unspecified => OperationType::Read,
    }
}

/// Fills the payload of a record save from the record's attributes.
pub fn standardize_options(
    entity: &Entity,
    operation: OperationType,
    mut options: Options,
    _context: Option<&Context>,
) -> Options {
    if options.data.is_none() && operation.is_mutating() {
        if let Some(attributes) = entity.as_record().and_then(|record| record.attributes()) {
            options.data = Some(Value::Object(attributes));
        }
    }
    options
}

/// Uses the caller's context, or the entity itself.
pub fn resolve_context(
    entity: &Entity,
    _operation: OperationType,
    _options: &StandardOptions,
    context: Option<Context>,
) -> Context {
    context.unwrap_or_else(|| Context::Entity(entity.clone()))
}

/// Returns the explicit URL, or the entity's URL under the API base.
pub fn make_url(config: &AdapterConfig, call: &SyncCall) -> String {
    match &call.options.url {
        Some(url) => url.clone(),
        None => join_url(&config.base_api_url, &call.entity.url_base()),
    }
}

/// Joins a relative path under a base URL with exactly one `/` between them.
///
/// Absolute `http://` and `https://` paths are returned unchanged.
pub fn join_url(base: &str, path: &str) -> String {
    if base.is_empty() || path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

/// Returns the standardized payload, or `None` for no payload.
pub fn serialize_data(call: &SyncCall) -> Option<&JsonMap> {
    call.options.data.as_ref()
}

/// Extracts the data and raw handle from the response arguments.
pub fn parse_raw_response_data(args: RawResponseArgs<'_>) -> RawResponseArgs<'_> {
    args
}

/// Turns a failed response into a transport error.
pub fn error_response(call: &SyncCall, args: &ErrorArgs) -> SyncError {
    let raw = &args.raw;
    let message = match raw.response_text.as_deref() {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => raw.status_text.clone(),
    };
    warn!(
        request_id = %call.id,
        operation = %call.operation,
        status = raw.status_code,
        "sync request failed"
    );
    if raw.status_text == ResponseStatus::Abort.as_str() && raw.status().is_none() {
        SyncError::Aborted
    } else {
        SyncError::transport(raw.status(), message)
    }
}

/// Records completion of a request.
pub fn complete_response(call: &SyncCall, args: &CompleteArgs) -> ResponseStatus {
    debug!(
        request_id = %call.id,
        operation = %call.operation,
        status = %args.status,
        "sync request complete"
    );
    args.status
}

/// Instrumentation run at the start of every sync.
pub fn sync(entity: &Entity, hint: &TypeHint, options: &Options, context: Option<&Context>) {
    debug!(
        entity = ?entity,
        hint = ?hint,
        explicit_url = options.url.is_some(),
        has_context = context.is_some(),
        "sync requested"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Collection, Record};
    use serde_json::json;

    struct Draft {
        new: bool,
    }

    impl Record for Draft {
        fn url_base(&self) -> String {
            "/drafts/7".into()
        }

        fn is_new(&self) -> bool {
            self.new
        }

        fn attributes(&self) -> Option<JsonMap> {
            json!({"title": "draft"}).as_object().cloned()
        }
    }

    struct Drafts;

    impl Collection for Drafts {
        fn url_base(&self) -> String {
            "/drafts".into()
        }
    }

    #[test]
    fn request_type_from_hint() {
        let entity = Entity::record(Draft { new: false });
        let options = Options::new();
        let resolve = |hint: TypeHint| resolve_request_type(&entity, &hint, &options, None);

        assert_eq!(resolve(OperationType::Delete.into()), OperationType::Delete);
        assert_eq!(resolve("put".into()), OperationType::Update);
        assert_eq!(resolve("PATCH".into()), OperationType::Read);
        assert_eq!(resolve(TypeHint::Unspecified), OperationType::Read);
    }

    #[test]
    fn save_depends_on_record_state() {
        let options = Options::new();
        let existing = Entity::record(Draft { new: false });
        let fresh = Entity::record(Draft { new: true });
        let collection = Entity::collection(Drafts);

        assert_eq!(
            resolve_request_type(&existing, &TypeHint::Save, &options, None),
            OperationType::Update
        );
        assert_eq!(
            resolve_request_type(&fresh, &TypeHint::Save, &options, None),
            OperationType::Create
        );
        assert_eq!(
            resolve_request_type(&collection, &TypeHint::Save, &options, None),
            OperationType::Create
        );
    }

    #[test]
    fn save_payload_from_attributes() {
        let entity = Entity::record(Draft { new: true });

        let options = standardize_options(&entity, OperationType::Create, Options::new(), None);
        assert_eq!(options.data, Some(json!({"title": "draft"})));

        let options = standardize_options(&entity, OperationType::Read, Options::new(), None);
        assert!(options.data.is_none());

        let explicit = Options::new().with_data(json!({"title": "explicit"}));
        let options = standardize_options(&entity, OperationType::Update, explicit, None);
        assert_eq!(options.data, Some(json!({"title": "explicit"})));
    }

    #[test]
    fn context_defaults_to_entity() {
        let entity = Entity::collection(Drafts);
        let options = StandardOptions::default();

        let context = resolve_context(&entity, OperationType::Read, &options, None);
        assert!(context.entity().unwrap().ptr_eq(&entity));

        let context = resolve_context(
            &entity,
            OperationType::Read,
            &options,
            Some(Context::opaque("caller")),
        );
        assert_eq!(context.downcast_ref::<&str>(), Some(&"caller"));
    }

    #[test]
    fn url_joining() {
        assert_eq!(join_url("", "/drafts"), "/drafts");
        assert_eq!(join_url("https://api.test/", "/drafts"), "https://api.test/drafts");
        assert_eq!(join_url("https://api.test", "drafts"), "https://api.test/drafts");
        assert_eq!(join_url("https://api.test/v1", ""), "https://api.test/v1");
        assert_eq!(
            join_url("https://api.test", "http://other.test/drafts"),
            "http://other.test/drafts"
        );
    }
}
