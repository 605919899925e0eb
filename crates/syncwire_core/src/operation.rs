//! Operation types and the hints they are resolved from.

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic action of a sync request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Persist a new entity.
    Create,
    /// Fetch an entity.
    Read,
    /// Persist changes to an existing entity.
    Update,
    /// Remove an entity.
    Delete,
}

impl OperationType {
    /// All operations, in CRUD order.
    pub const ALL: [OperationType; 4] = [
        OperationType::Create,
        OperationType::Read,
        OperationType::Update,
        OperationType::Delete,
    ];

    /// Returns the HTTP verb this operation is sent as.
    pub fn method(&self) -> &'static str {
        match self {
            OperationType::Create => "POST",
            OperationType::Read => "GET",
            OperationType::Update => "PUT",
            OperationType::Delete => "DELETE",
        }
    }

    /// Returns true for operations that persist entity state.
    ///
    /// These are the operations gated by record validation.
    pub fn is_mutating(&self) -> bool {
        matches!(self, OperationType::Create | OperationType::Update)
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

impl FromStr for OperationType {
    type Err = SyncError;

    /// Parses either the HTTP verb or the semantic name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POST" | "CREATE" => Ok(OperationType::Create),
            "GET" | "READ" => Ok(OperationType::Read),
            "PUT" | "UPDATE" => Ok(OperationType::Update),
            "DELETE" => Ok(OperationType::Delete),
            _ => Err(SyncError::InvalidOperation(s.to_string())),
        }
    }
}

/// The type argument a caller passes to `sync`.
///
/// The request type resolver turns a hint into a concrete [`OperationType`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeHint {
    /// Already a concrete operation.
    Operation(OperationType),
    /// Create or update, decided by whether the record is new.
    Save,
    /// A raw token such as `"GET"` or `"update"`.
    Token(String),
    /// No hint; resolves to a read.
    #[default]
    Unspecified,
}

impl From<OperationType> for TypeHint {
    fn from(op: OperationType) -> Self {
        TypeHint::Operation(op)
    }
}

impl From<&str> for TypeHint {
    fn from(token: &str) -> Self {
        TypeHint::Token(token.to_string())
    }
}

impl From<String> for TypeHint {
    fn from(token: String) -> Self {
        TypeHint::Token(token)
    }
}

impl From<Option<OperationType>> for TypeHint {
    fn from(op: Option<OperationType>) -> Self {
        op.map(TypeHint::Operation).unwrap_or_default()
    }
}
