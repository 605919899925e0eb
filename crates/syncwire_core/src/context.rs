//! Execution context threaded through every handler.

use crate::entity::Entity;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque value handed unchanged to the response handlers.
///
/// Unless the caller supplies one, the context is the entity being synced.
#[derive(Clone)]
pub enum Context {
    /// The entity itself.
    Entity(Entity),
    /// A caller-supplied value.
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl Context {
    /// Wraps an arbitrary caller value.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Context::Opaque(Arc::new(value))
    }

    /// Returns the entity, if the context is one.
    pub fn entity(&self) -> Option<&Entity> {
        match self {
            Context::Entity(entity) => Some(entity),
            Context::Opaque(_) => None,
        }
    }

    /// Downcasts a caller-supplied value.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Context::Opaque(value) => value.downcast_ref::<T>(),
            Context::Entity(_) => None,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Entity(entity) => f.debug_tuple("Entity").field(entity).finish(),
            Context::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl From<Entity> for Context {
    fn from(entity: Entity) -> Self {
        Context::Entity(entity)
    }
}
