//! # Syncwire Core
//!
//! Synchronization adapter between application records/collections and an
//! HTTP/JSON backend.
//!
//! This crate provides:
//! - The request pipeline: type resolution, option standardization, context
//!   resolution, URL building and body serialization
//! - Tolerant response parsing
//! - Success, error and completion handling with per-stage overrides
//! - A transport abstraction and an in-memory mock transport
//!
//! ## Architecture
//!
//! `JsonAdapter::sync` runs the stages strictly in order:
//! 1. Resolve the operation type
//! 2. Standardize options (before anything reads them)
//! 3. Resolve the handler context
//! 4. Validate records for create/update; an invalid record is never sent
//! 5. Build the URL and serialize the body
//! 6. Hand the request to the transport
//!
//! Every stage starts from the base behaviour, is refined by the JSON layer
//! and may be replaced by an override from [`Hooks`].
//!
//! The transport reports outcomes into a [`ResponseSink`], which runs the
//! handlers and forwards [`SyncEvent`]s to the caller's [`PendingRequest`].
//!
//! ## Key Invariants
//!
//! - Completion is handled exactly once per request
//! - At most one of success or error is handled per request
//! - Downstream stages only see standardized options
//! - The adapter keeps no state between requests

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
pub mod base;
mod config;
mod context;
mod dispatch;
mod entity;
mod error;
mod hooks;
pub mod json;
mod operation;
mod options;
mod response;
mod transport;

pub use adapter::{JsonAdapter, SyncCall};
pub use config::AdapterConfig;
pub use context::Context;
pub use dispatch::{PendingRequest, ResponseSink, SyncEvent};
pub use entity::{Collection, Entity, Record};
pub use error::{BodySource, SyncError, SyncResult};
pub use hooks::{
    CompleteHook, ErrorHook, Hooks, MakeUrlHook, ParseResponseHook, RequestTypeHook,
    ResolveContextHook, SerializeDataHook, Stage, StandardizeOptionsHook, SuccessHook,
};
pub use operation::{OperationType, TypeHint};
pub use options::{
    Headers, JsonMap, Options, Params, StandardOptions, DEFAULT_CONTENT_TYPE, DEFAULT_DATA_TYPE,
};
pub use response::{
    CompleteArgs, ErrorArgs, RawResponse, RawResponseArgs, ResponseOutcome, ResponseStatus,
    SuccessArgs,
};
pub use transport::{MockReply, MockTransport, RequestHandle, Transport, TransportRequest};
