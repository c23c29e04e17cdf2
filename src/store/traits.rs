use crate::model::{Entity, Id, Project, Task, Team, User};
use anyhow::Result;
use std::collections::BTreeSet;

/// Row storage for one entity type. Every write is a single atomic row operation.
#[async_trait::async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<E>>;
    /// Look up by the key other entities use to reference this type
    /// (the primary key, or the unique attribute named by `E::REFERENCE_KEY`).
    async fn get_by_reference_key(&self, key: &str) -> Result<Option<E>>;
    async fn exists(&self, id: &str) -> Result<bool>;
    async fn exists_by_reference_key(&self, key: &str) -> Result<bool>;
    /// All rows in insertion order.
    async fn list(&self) -> Result<Vec<E>>;
    async fn insert(&self, entity: &E) -> Result<()>;
    /// Overwrite an existing row. Returns false if the row is gone.
    async fn update(&self, entity: &E) -> Result<bool>;
    /// Remove a row and hand back what it held.
    async fn delete(&self, id: &str) -> Result<Option<E>>;
}

#[async_trait::async_trait]
pub trait TaskStore: EntityStore<Task> {
    /// Tasks whose `parentTask` equals `parent_id`.
    async fn list_subtasks(&self, parent_id: &str) -> Result<Vec<Task>>;
}

/// Set-valued relations keyed by (relation name, owner id).
#[async_trait::async_trait]
pub trait MembershipStore: Send + Sync {
    async fn members(&self, relation: &str, owner_id: &str) -> Result<BTreeSet<Id>>;
    /// Replace the whole set in one atomic write. An empty set clears the relation.
    async fn replace_members(
        &self,
        relation: &str,
        owner_id: &str,
        members: &BTreeSet<Id>,
    ) -> Result<()>;
}

pub trait Store:
    EntityStore<User>
    + EntityStore<Project>
    + EntityStore<Team>
    + TaskStore
    + MembershipStore
    + Send
    + Sync
{
}
