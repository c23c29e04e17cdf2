use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type Id = String;

/// Sparse update document for PATCH operations: only the keys present are applied.
pub type PatchDocument = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Project,
    Team,
    Task,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Project => "project",
            EntityKind::Team => "team",
            EntityKind::Task => "task",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which attribute other entities use when they point at an entity of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKey {
    /// The primary key (`id`).
    Primary,
    /// A unique, human-chosen attribute, e.g. `projectName`.
    Unique(&'static str),
}

/// A foreign-key-shaped field, as it appears in the serialized document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceField {
    pub name: &'static str,
    pub target: EntityKind,
    pub required: bool,
}

impl ReferenceField {
    pub const fn required(name: &'static str, target: EntityKind) -> Self {
        Self {
            name,
            target,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, target: EntityKind) -> Self {
        Self {
            name,
            target,
            required: false,
        }
    }
}

/// A set-valued relation from an owner entity to members of another type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Association {
    pub name: &'static str,
    pub owner: EntityKind,
    pub target: EntityKind,
}

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_serializes_lowercase() {
        let json = serde_json::to_string(&EntityKind::Project).unwrap();
        assert_eq!(json, "\"project\"");
        assert_eq!(EntityKind::Task.to_string(), "task");
    }

    #[test]
    fn test_generate_id_is_unique() {
        assert_ne!(generate_id(), generate_id());
    }
}
