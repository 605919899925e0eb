//! Test fixtures and adapter helpers.
//!
//! Provides records and collections with scripted behaviour, adapters wired
//! to the mock transport, and tracing setup for tests.

use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use syncwire_core::{
    AdapterConfig, Collection, Entity, JsonAdapter, JsonMap, MockTransport, Record,
    StandardOptions,
};
use tracing_subscriber::EnvFilter;

struct RecordState {
    url: String,
    valid: AtomicBool,
    unsaved: AtomicBool,
    attributes: Mutex<Option<JsonMap>>,
    validations: Mutex<Vec<StandardOptions>>,
}

/// A record whose validation verdict and state are set by the test.
///
/// Clones share state, so a test can keep one clone and inspect the
/// validation calls the adapter made on another.
#[derive(Clone)]
pub struct TestRecord {
    state: Arc<RecordState>,
}

impl TestRecord {
    /// Creates a valid, already-persisted record.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            state: Arc::new(RecordState {
                url: url.into(),
                valid: AtomicBool::new(true),
                unsaved: AtomicBool::new(false),
                attributes: Mutex::new(None),
                validations: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Makes the record fail validation.
    #[must_use]
    pub fn invalid(self) -> Self {
        self.set_valid(false);
        self
    }

    /// Marks the record as never persisted.
    #[must_use]
    pub fn unsaved(self) -> Self {
        self.state.unsaved.store(true, Ordering::SeqCst);
        self
    }

    /// Sets the attributes sent on saves without an explicit payload.
    ///
    /// Anything but a JSON object clears them.
    #[must_use]
    pub fn with_attributes(self, attributes: Value) -> Self {
        *self.state.attributes.lock() = match attributes {
            Value::Object(map) => Some(map),
            _ => None,
        };
        self
    }

    /// Changes the validation verdict.
    pub fn set_valid(&self, valid: bool) {
        self.state.valid.store(valid, Ordering::SeqCst);
    }

    /// Wraps the record as an entity.
    pub fn entity(&self) -> Entity {
        Entity::record(self.clone())
    }

    /// Returns how many times the record was validated.
    pub fn validation_count(&self) -> usize {
        self.state.validations.lock().len()
    }

    /// Returns the options of the most recent validation.
    pub fn last_validated(&self) -> Option<StandardOptions> {
        self.state.validations.lock().last().cloned()
    }
}

impl Record for TestRecord {
    fn url_base(&self) -> String {
        self.state.url.clone()
    }

    fn validate(&self, options: &StandardOptions) -> bool {
        self.state.validations.lock().push(options.clone());
        self.state.valid.load(Ordering::SeqCst)
    }

    fn is_new(&self) -> bool {
        self.state.unsaved.load(Ordering::SeqCst)
    }

    fn attributes(&self) -> Option<JsonMap> {
        self.state.attributes.lock().clone()
    }
}

/// A collection with a fixed URL.
#[derive(Debug, Clone)]
pub struct TestCollection {
    url: String,
}

impl TestCollection {
    /// Creates a collection.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Wraps the collection as an entity.
    pub fn entity(&self) -> Entity {
        Entity::collection(self.clone())
    }
}

impl Collection for TestCollection {
    fn url_base(&self) -> String {
        self.url.clone()
    }
}

/// Creates an adapter over a fresh mock transport.
///
/// The returned transport is the one the adapter uses, for inspection.
pub fn mock_adapter() -> (JsonAdapter, Arc<MockTransport>) {
    mock_adapter_with(AdapterConfig::default())
}

/// Creates an adapter with the given configuration over a fresh mock transport.
pub fn mock_adapter_with(config: AdapterConfig) -> (JsonAdapter, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::new());
    let adapter = JsonAdapter::from_shared(config, transport.clone());
    (adapter, transport)
}

/// Installs a test-friendly tracing subscriber.
///
/// Honours `RUST_LOG`, defaulting to `warn`. Safe to call from every test.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
