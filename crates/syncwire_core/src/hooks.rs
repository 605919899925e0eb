//! Named pipeline stages and their overrides.
//!
//! Every stage has a default (the base behaviour followed by the JSON
//! layer). A [`Hooks`] table holds at most one override per stage; the
//! adapter runs the default and then hands its result to the override,
//! which returns the value the pipeline continues with.

use crate::adapter::SyncCall;
use crate::context::Context;
use crate::entity::Entity;
use crate::error::{SyncError, SyncResult};
use crate::operation::{OperationType, TypeHint};
use crate::options::{Options, StandardOptions};
use crate::response::{CompleteArgs, ErrorArgs, RawResponseArgs, ResponseStatus, SuccessArgs};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A named stage of the sync pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Determine the operation type.
    ResolveRequestType,
    /// Fill option defaults.
    StandardizeOptions,
    /// Determine the handler context.
    ResolveContext,
    /// Build the request URL.
    MakeUrl,
    /// Serialize the request body.
    SerializeData,
    /// Decode the response body.
    ParseRawResponseData,
    /// Handle a successful response.
    SuccessResponse,
    /// Handle a failed response.
    ErrorResponse,
    /// Handle request completion.
    CompleteResponse,
}

impl Stage {
    /// All stages, in pipeline order.
    pub const PIPELINE: [Stage; 9] = [
        Stage::ResolveRequestType,
        Stage::StandardizeOptions,
        Stage::ResolveContext,
        Stage::MakeUrl,
        Stage::SerializeData,
        Stage::ParseRawResponseData,
        Stage::SuccessResponse,
        Stage::ErrorResponse,
        Stage::CompleteResponse,
    ];

    /// Returns the stage name.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::ResolveRequestType => "resolve_request_type",
            Stage::StandardizeOptions => "standardize_options",
            Stage::ResolveContext => "resolve_context",
            Stage::MakeUrl => "make_url",
            Stage::SerializeData => "serialize_data",
            Stage::ParseRawResponseData => "parse_raw_response_data",
            Stage::SuccessResponse => "success_response_handler",
            Stage::ErrorResponse => "error_response_handler",
            Stage::CompleteResponse => "complete_response_handler",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Override for [`Stage::ResolveRequestType`].
pub type RequestTypeHook =
    Arc<dyn Fn(&Entity, &TypeHint, &Options, Option<&Context>, OperationType) -> OperationType + Send + Sync>;
/// Override for [`Stage::StandardizeOptions`].
pub type StandardizeOptionsHook =
    Arc<dyn Fn(&Entity, OperationType, Option<&Context>, StandardOptions) -> StandardOptions + Send + Sync>;
/// Override for [`Stage::ResolveContext`].
pub type ResolveContextHook =
    Arc<dyn Fn(&Entity, OperationType, &StandardOptions, Context) -> Context + Send + Sync>;
/// Override for [`Stage::MakeUrl`].
pub type MakeUrlHook = Arc<dyn Fn(&SyncCall, String) -> String + Send + Sync>;
/// Override for [`Stage::SerializeData`].
pub type SerializeDataHook = Arc<dyn Fn(&SyncCall, String) -> String + Send + Sync>;
/// Override for [`Stage::ParseRawResponseData`].
pub type ParseResponseHook =
    Arc<dyn Fn(&SyncCall, RawResponseArgs<'_>, SyncResult<Value>) -> SyncResult<Value> + Send + Sync>;
/// Override for [`Stage::SuccessResponse`].
pub type SuccessHook =
    Arc<dyn Fn(&SyncCall, &SuccessArgs, SyncResult<Value>) -> SyncResult<Value> + Send + Sync>;
/// Override for [`Stage::ErrorResponse`].
pub type ErrorHook = Arc<dyn Fn(&SyncCall, &ErrorArgs, SyncError) -> SyncError + Send + Sync>;
/// Override for [`Stage::CompleteResponse`].
pub type CompleteHook =
    Arc<dyn Fn(&SyncCall, &CompleteArgs, ResponseStatus) -> ResponseStatus + Send + Sync>;

/// Table of stage overrides.
#[derive(Clone, Default)]
pub struct Hooks {
    pub(crate) request_type: Option<RequestTypeHook>,
    pub(crate) standardize_options: Option<StandardizeOptionsHook>,
    pub(crate) resolve_context: Option<ResolveContextHook>,
    pub(crate) make_url: Option<MakeUrlHook>,
    pub(crate) serialize_data: Option<SerializeDataHook>,
    pub(crate) parse_response: Option<ParseResponseHook>,
    pub(crate) success: Option<SuccessHook>,
    pub(crate) error: Option<ErrorHook>,
    pub(crate) complete: Option<CompleteHook>,
}

impl Hooks {
    /// Creates an empty table; every stage runs its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides request type resolution.
    pub fn with_request_type<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Entity, &TypeHint, &Options, Option<&Context>, OperationType) -> OperationType
            + Send
            + Sync
            + 'static,
    {
        self.request_type = Some(Arc::new(hook));
        self
    }

    /// Overrides option standardization.
    pub fn with_standardize_options<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Entity, OperationType, Option<&Context>, StandardOptions) -> StandardOptions
            + Send
            + Sync
            + 'static,
    {
        self.standardize_options = Some(Arc::new(hook));
        self
    }

    /// Overrides context resolution.
    pub fn with_resolve_context<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Entity, OperationType, &StandardOptions, Context) -> Context + Send + Sync + 'static,
    {
        self.resolve_context = Some(Arc::new(hook));
        self
    }

    /// Overrides URL building.
    pub fn with_make_url<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SyncCall, String) -> String + Send + Sync + 'static,
    {
        self.make_url = Some(Arc::new(hook));
        self
    }

    /// Overrides body serialization.
    pub fn with_serialize_data<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SyncCall, String) -> String + Send + Sync + 'static,
    {
        self.serialize_data = Some(Arc::new(hook));
        self
    }

    /// Overrides response parsing.
    pub fn with_parse_response<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SyncCall, RawResponseArgs<'_>, SyncResult<Value>) -> SyncResult<Value>
            + Send
            + Sync
            + 'static,
    {
        self.parse_response = Some(Arc::new(hook));
        self
    }

    /// Overrides the success handler.
    pub fn with_success_handler<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SyncCall, &SuccessArgs, SyncResult<Value>) -> SyncResult<Value>
            + Send
            + Sync
            + 'static,
    {
        self.success = Some(Arc::new(hook));
        self
    }

    /// Overrides the error handler.
    pub fn with_error_handler<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SyncCall, &ErrorArgs, SyncError) -> SyncError + Send + Sync + 'static,
    {
        self.error = Some(Arc::new(hook));
        self
    }

    /// Overrides the completion handler.
    pub fn with_complete_handler<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SyncCall, &CompleteArgs, ResponseStatus) -> ResponseStatus + Send + Sync + 'static,
    {
        self.complete = Some(Arc::new(hook));
        self
    }

    /// Returns true if the stage has an override.
    pub fn is_overridden(&self, stage: Stage) -> bool {
        match stage {
            Stage::ResolveRequestType => self.request_type.is_some(),
            Stage::StandardizeOptions => self.standardize_options.is_some(),
            Stage::ResolveContext => self.resolve_context.is_some(),
            Stage::MakeUrl => self.make_url.is_some(),
            Stage::SerializeData => self.serialize_data.is_some(),
            Stage::ParseRawResponseData => self.parse_response.is_some(),
            Stage::SuccessResponse => self.success.is_some(),
            Stage::ErrorResponse => self.error.is_some(),
            Stage::CompleteResponse => self.complete.is_some(),
        }
    }

    /// Returns the overridden stages, in pipeline order.
    pub fn overridden(&self) -> Vec<Stage> {
        Stage::PIPELINE
            .into_iter()
            .filter(|stage| self.is_overridden(*stage))
            .collect()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("overridden", &self.overridden())
            .finish()
    }
}
