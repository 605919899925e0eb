//! # Syncwire HTTP
//!
//! reqwest-backed [`Transport`](syncwire_core::Transport) for Syncwire.
//!
//! ## Example
//!
//! ```rust,ignore
//! use syncwire_core::{AdapterConfig, JsonAdapter, Options, OperationType};
//! use syncwire_http::{HttpConfig, ReqwestTransport};
//!
//! let transport = ReqwestTransport::with_config(HttpConfig::new())?;
//! let adapter = JsonAdapter::with_config(
//!     AdapterConfig::new().with_base_api_url("https://api.example.com"),
//!     transport,
//! );
//! let notes = adapter
//!     .sync(&collection, OperationType::Read, Options::new(), None)?
//!     .expect("reads are never gated")
//!     .finish()
//!     .await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod transport;

pub use config::{HttpConfig, DEFAULT_USER_AGENT};
pub use transport::{accept_for, ReqwestTransport};
