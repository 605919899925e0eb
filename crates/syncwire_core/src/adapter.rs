//! The JSON sync adapter.
//!
//! Every stage runs the base behaviour, refines it with the JSON layer and
//! then applies the caller's override for that stage, if any.

use crate::base;
use crate::config::AdapterConfig;
use crate::context::Context;
use crate::dispatch::{PendingRequest, ResponseSink};
use crate::entity::Entity;
use crate::error::{SyncError, SyncResult};
use crate::hooks::{Hooks, Stage};
use crate::json;
use crate::operation::{OperationType, TypeHint};
use crate::options::{Options, StandardOptions};
use crate::response::{CompleteArgs, ErrorArgs, RawResponseArgs, ResponseStatus, SuccessArgs};
use crate::transport::{Transport, TransportRequest};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace};
use uuid::Uuid;

/// The resolved inputs of one sync request, shared by its later stages.
#[derive(Debug, Clone)]
pub struct SyncCall {
    /// Request identifier.
    pub id: Uuid,
    /// Entity being synchronized.
    pub entity: Entity,
    /// Resolved operation.
    pub operation: OperationType,
    /// Standardized options.
    pub options: StandardOptions,
    /// Handler context.
    pub context: Context,
}

/// Adapter that syncs entities over HTTP with JSON bodies.
///
/// Cheap to clone; clones share the transport and the override table.
#[derive(Clone)]
pub struct JsonAdapter {
    config: Arc<AdapterConfig>,
    transport: Arc<dyn Transport>,
    hooks: Arc<Hooks>,
}

impl JsonAdapter {
    /// Creates an adapter with the default configuration.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::with_config(AdapterConfig::default(), transport)
    }

    /// Creates an adapter with the given configuration.
    pub fn with_config(config: AdapterConfig, transport: impl Transport + 'static) -> Self {
        Self::from_shared(config, Arc::new(transport))
    }

    /// Creates an adapter around a shared transport.
    pub fn from_shared(config: AdapterConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            hooks: Arc::new(Hooks::default()),
        }
    }

    /// Installs stage overrides.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Returns the stage overrides.
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Returns the transport.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Resolves the operation type.
    pub fn resolve_request_type(
        &self,
        entity: &Entity,
        hint: &TypeHint,
        options: &Options,
        context: Option<&Context>,
    ) -> OperationType {
        let operation = base::resolve_request_type(entity, hint, options, context);
        match &self.hooks.request_type {
            Some(hook) => hook(entity, hint, options, context, operation),
            None => operation,
        }
    }

    /// Standardizes the options; the result is all later stages see.
    pub fn standardize_options(
        &self,
        entity: &Entity,
        operation: OperationType,
        options: Options,
        context: Option<&Context>,
    ) -> StandardOptions {
        let options = base::standardize_options(entity, operation, options, context);
        let options = json::standardize_options(options);
        match &self.hooks.standardize_options {
            Some(hook) => hook(entity, operation, context, options),
            None => options,
        }
    }

    /// Resolves the handler context.
    pub fn resolve_context(
        &self,
        entity: &Entity,
        operation: OperationType,
        options: &StandardOptions,
        context: Option<Context>,
    ) -> Context {
        let context = base::resolve_context(entity, operation, options, context);
        match &self.hooks.resolve_context {
            Some(hook) => hook(entity, operation, options, context),
            None => context,
        }
    }

    /// Builds the request URL.
    pub fn make_url(&self, call: &SyncCall) -> String {
        let url = json::make_url(base::make_url(&self.config, call), &call.options);
        match &self.hooks.make_url {
            Some(hook) => hook(call, url),
            None => url,
        }
    }

    /// Serializes the request body.
    pub fn serialize_data(&self, call: &SyncCall) -> SyncResult<String> {
        let body = json::serialize_data(base::serialize_data(call), &call.options)?;
        Ok(match &self.hooks.serialize_data {
            Some(hook) => hook(call, body),
            None => body,
        })
    }

    /// Decodes the data of a successful response.
    pub fn parse_raw_response_data(
        &self,
        call: &SyncCall,
        args: RawResponseArgs<'_>,
    ) -> SyncResult<Value> {
        let args = base::parse_raw_response_data(args);
        let parsed = json::parse_raw_response_data(args);
        match &self.hooks.parse_response {
            Some(hook) => hook(call, args, parsed),
            None => parsed,
        }
    }

    /// Handles a successful response, yielding the parsed data.
    pub fn success_response_handler(
        &self,
        call: &SyncCall,
        args: &SuccessArgs,
    ) -> SyncResult<Value> {
        let parsed = self.parse_raw_response_data(
            call,
            RawResponseArgs {
                data: args.data.as_ref(),
                raw: &args.raw,
            },
        );
        match &self.hooks.success {
            Some(hook) => hook(call, args, parsed),
            None => parsed,
        }
    }

    /// Handles a failed response, yielding the error reported to the caller.
    pub fn error_response_handler(&self, call: &SyncCall, args: &ErrorArgs) -> SyncError {
        let error = base::error_response(call, args);
        match &self.hooks.error {
            Some(hook) => hook(call, args, error),
            None => error,
        }
    }

    /// Handles request completion.
    pub fn complete_response_handler(
        &self,
        call: &SyncCall,
        args: &CompleteArgs,
    ) -> ResponseStatus {
        let status = base::complete_response(call, args);
        match &self.hooks.complete {
            Some(hook) => hook(call, args, status),
            None => status,
        }
    }

    /// Synchronizes an entity.
    ///
    /// Returns `Ok(None)` without touching the network when a record fails
    /// validation for a create or update. Otherwise hands the request to the
    /// transport and returns the pending request; the response handlers run
    /// when the transport reports back.
    pub fn sync(
        &self,
        entity: &Entity,
        hint: impl Into<TypeHint>,
        options: Options,
        context: Option<Context>,
    ) -> SyncResult<Option<PendingRequest>> {
        let hint = hint.into();
        base::sync(entity, &hint, &options, context.as_ref());

        let operation = self.resolve_request_type(entity, &hint, &options, context.as_ref());
        trace!(stage = %Stage::ResolveRequestType, %operation);
        let options = self.standardize_options(entity, operation, options, context.as_ref());
        trace!(stage = %Stage::StandardizeOptions, has_payload = options.has_payload());
        let context = self.resolve_context(entity, operation, &options, context);
        trace!(stage = %Stage::ResolveContext, context = ?context);

        if let Some(record) = entity.as_record() {
            if operation.is_mutating() && !record.validate(&options) {
                debug!(%operation, entity = ?entity, "validation rejected sync");
                return Ok(None);
            }
        }

        let call = SyncCall {
            id: Uuid::new_v4(),
            entity: entity.clone(),
            operation,
            options,
            context,
        };
        let url = self.make_url(&call);
        trace!(stage = %Stage::MakeUrl, request_id = %call.id, %url);
        let body = self.serialize_data(&call)?;
        trace!(stage = %Stage::SerializeData, request_id = %call.id, body_len = body.len());

        let request = TransportRequest {
            id: call.id,
            method: operation,
            url,
            body,
            response_format: call.options.data_type.clone(),
            content_type: call.options.content_type.clone(),
            cache: self.config.cache,
            headers: call.options.headers.clone(),
        };
        debug!(
            request_id = %request.id,
            method = request.method.method(),
            url = %request.url,
            "issuing sync request"
        );

        let id = call.id;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let sink = ResponseSink::new(self.clone(), Arc::new(call), events_tx);
        let handle = self.transport.request(request, sink);
        Ok(Some(PendingRequest::new(id, handle, events_rx)))
    }
}

impl std::fmt::Debug for JsonAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonAdapter")
            .field("config", &self.config)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Collection, Record};
    use crate::transport::MockTransport;
    use serde_json::json;

    struct Task {
        valid: bool,
    }

    impl Record for Task {
        fn url_base(&self) -> String {
            "/tasks/1".into()
        }

        fn validate(&self, _options: &StandardOptions) -> bool {
            self.valid
        }
    }

    struct Tasks;

    impl Collection for Tasks {
        fn url_base(&self) -> String {
            "/tasks".into()
        }
    }

    fn call_for(entity: Entity, options: StandardOptions) -> SyncCall {
        SyncCall {
            id: Uuid::new_v4(),
            context: Context::Entity(entity.clone()),
            entity,
            operation: OperationType::Read,
            options,
        }
    }

    #[test]
    fn url_uses_base_api_url_and_params() {
        let adapter = JsonAdapter::with_config(
            AdapterConfig::new().with_base_api_url("https://api.test/v1/"),
            MockTransport::new(),
        );
        let mut options = StandardOptions::default();
        options.params.insert("page".into(), "2".into());

        let call = call_for(Entity::collection(Tasks), options);
        assert_eq!(adapter.make_url(&call), "https://api.test/v1/tasks?page=2");
    }

    #[test]
    fn explicit_url_bypasses_entity() {
        let adapter = JsonAdapter::with_config(
            AdapterConfig::new().with_base_api_url("https://api.test"),
            MockTransport::new(),
        );
        let mut options = StandardOptions::default();
        options.url = Some("/custom?id=5".into());
        options.params.insert("x".into(), "9".into());

        let call = call_for(Entity::collection(Tasks), options);
        assert_eq!(adapter.make_url(&call), "/custom?id=5&x=9");
    }

    #[test]
    fn override_receives_default_result() {
        let hooks = Hooks::new()
            .with_make_url(|_, url| format!("{url}.json"))
            .with_serialize_data(|_, body| if body.is_empty() { "{}".into() } else { body });
        let adapter = JsonAdapter::new(MockTransport::new()).with_hooks(hooks);

        let call = call_for(Entity::collection(Tasks), StandardOptions::default());
        assert_eq!(adapter.make_url(&call), "/tasks.json");
        assert_eq!(adapter.serialize_data(&call).unwrap(), "{}");
    }

    #[test]
    fn standardize_override_runs_after_defaults() {
        let hooks = Hooks::new().with_standardize_options(|_, _, _, mut options| {
            assert_eq!(options.data_type, "json");
            options.headers.insert("X-Client".into(), "syncwire".into());
            options
        });
        let adapter = JsonAdapter::new(MockTransport::new()).with_hooks(hooks);

        let options = adapter.standardize_options(
            &Entity::collection(Tasks),
            OperationType::Read,
            Options::new(),
            None,
        );
        assert_eq!(options.headers["X-Client"], "syncwire");
    }

    #[test]
    fn success_handler_parses_through_parse_stage() {
        let hooks = Hooks::new().with_parse_response(|_, _, parsed| {
            parsed.map(|value| json!({"wrapped": value}))
        });
        let adapter = JsonAdapter::new(MockTransport::new()).with_hooks(hooks);
        let call = call_for(Entity::record(Task { valid: true }), StandardOptions::default());

        let args = SuccessArgs {
            data: Some(json!(r#"{"id": 1}"#)),
            status: ResponseStatus::Success,
            raw: crate::response::RawResponse::new(200, "OK"),
        };
        let data = adapter.success_response_handler(&call, &args).unwrap();
        assert_eq!(data, json!({"wrapped": {"id": 1}}));
    }

    #[test]
    fn invalid_record_is_not_sent() {
        let transport = Arc::new(MockTransport::new());
        let adapter = JsonAdapter::from_shared(AdapterConfig::default(), transport.clone());
        let entity = Entity::record(Task { valid: false });

        for op in [OperationType::Create, OperationType::Update] {
            let pending = adapter.sync(&entity, op, Options::new(), None).unwrap();
            assert!(pending.is_none());
        }
        assert_eq!(transport.request_count(), 0);

        let pending = adapter
            .sync(&entity, OperationType::Delete, Options::new(), None)
            .unwrap();
        assert!(pending.is_some());
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn request_carries_standardized_options() {
        let transport = Arc::new(MockTransport::new());
        let adapter = JsonAdapter::from_shared(AdapterConfig::default(), transport.clone());
        let entity = Entity::record(Task { valid: true });

        adapter
            .sync(
                &entity,
                "update",
                Options::new()
                    .with_data(json!({"done": true}))
                    .with_header("X-Trace", "7"),
                None,
            )
            .unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.method, OperationType::Update);
        assert_eq!(request.url, "/tasks/1");
        assert_eq!(request.body, r#"{"done":true}"#);
        assert_eq!(request.response_format, "json");
        assert_eq!(request.content_type, "application/json");
        assert!(!request.cache);
        assert_eq!(request.headers["X-Trace"], "7");
    }
}
