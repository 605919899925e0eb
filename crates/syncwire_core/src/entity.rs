//! Entities the adapter synchronizes.
//!
//! The application owns its records and collections; the adapter only asks
//! them for a URL, a validation verdict and (for saves) their attributes.

use crate::options::{JsonMap, StandardOptions};
use std::fmt;
use std::sync::Arc;

/// A single record.
pub trait Record: Send + Sync {
    /// Returns the record's URL, relative to the API base or absolute.
    fn url_base(&self) -> String;

    /// Checks whether the record may be persisted with the given options.
    fn validate(&self, _options: &StandardOptions) -> bool {
        true
    }

    /// Returns true if the record has never been persisted.
    fn is_new(&self) -> bool {
        false
    }

    /// Returns the attributes to send when a save carries no explicit payload.
    fn attributes(&self) -> Option<JsonMap> {
        None
    }
}

/// A collection of records.
pub trait Collection: Send + Sync {
    /// Returns the collection's URL, relative to the API base or absolute.
    fn url_base(&self) -> String;
}

/// The record or collection being synchronized.
#[derive(Clone)]
pub enum Entity {
    /// A single record.
    Record(Arc<dyn Record>),
    /// A collection of records.
    Collection(Arc<dyn Collection>),
}

impl Entity {
    /// Wraps a record.
    pub fn record(record: impl Record + 'static) -> Self {
        Entity::Record(Arc::new(record))
    }

    /// Wraps a collection.
    pub fn collection(collection: impl Collection + 'static) -> Self {
        Entity::Collection(Arc::new(collection))
    }

    /// Returns true for singular records.
    pub fn is_record(&self) -> bool {
        matches!(self, Entity::Record(_))
    }

    /// Returns the record, if this entity is one.
    pub fn as_record(&self) -> Option<&dyn Record> {
        match self {
            Entity::Record(record) => Some(record.as_ref()),
            Entity::Collection(_) => None,
        }
    }

    /// Returns the entity's own URL.
    pub fn url_base(&self) -> String {
        match self {
            Entity::Record(record) => record.url_base(),
            Entity::Collection(collection) => collection.url_base(),
        }
    }

    /// Returns true if both values point at the same entity.
    pub fn ptr_eq(&self, other: &Entity) -> bool {
        match (self, other) {
            (Entity::Record(a), Entity::Record(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            (Entity::Collection(a), Entity::Collection(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Record(record) => f.debug_tuple("Record").field(&record.url_base()).finish(),
            Entity::Collection(collection) => f
                .debug_tuple("Collection")
                .field(&collection.url_base())
                .finish(),
        }
    }
}

impl<R: Record + 'static> From<Arc<R>> for Entity {
    fn from(record: Arc<R>) -> Self {
        Entity::Record(record)
    }
}
