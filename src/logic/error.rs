use thiserror::Error;

use crate::model::{EntityKind, Id};

/// Outcome of a rejected service call. A rejected write never leaves a partial change behind.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The entity named by the operation's key does not exist.
    #[error("{kind} '{key}' not found")]
    NotFound { kind: EntityKind, key: Id },

    /// A reference in the candidate document names an entity that does not exist.
    #[error("{field} references {target} '{key}' which does not exist")]
    ReferenceNotFound {
        field: String,
        target: EntityKind,
        key: Id,
    },

    #[error("{kind} with {field} '{value}' already exists")]
    Conflict {
        kind: EntityKind,
        field: String,
        value: String,
    },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// The store itself failed. Never reported as `NotFound`.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn not_found(kind: EntityKind, key: impl Into<Id>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    pub fn reference_not_found(field: impl Into<String>, target: EntityKind, key: impl Into<Id>) -> Self {
        Self::ReferenceNotFound {
            field: field.into(),
            target,
            key: key.into(),
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidDocument(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
