//! # Syncwire Testkit
//!
//! Test utilities for Syncwire.
//!
//! This crate provides:
//! - Record and collection fixtures with scripted validation
//! - Adapter helpers wired to the in-memory mock transport
//! - Property-based test generators using proptest
//! - Tracing setup for tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use syncwire_testkit::prelude::*;
//!
//! #[test]
//! fn saves_are_sent() {
//!     let (adapter, transport) = mock_adapter();
//!     let record = TestRecord::new("/notes/1");
//!     adapter.sync(&record.entity(), TypeHint::Save, Options::new(), None).unwrap();
//!     assert_eq!(transport.request_count(), 1);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use syncwire_core::*;
}

pub use fixtures::*;
pub use generators::*;
