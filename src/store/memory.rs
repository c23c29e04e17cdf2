use anyhow::Result;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};

use crate::model::{Entity, Id, Project, ReferenceKey, Task, Team, User};
use crate::store::traits::{EntityStore, MembershipStore, Store, TaskStore};

/// Rows of one entity type, with an index on the reference key when it is not the id.
#[derive(Debug)]
struct Table<E> {
    rows: HashMap<Id, E>,
    order: Vec<Id>,
    by_reference_key: HashMap<String, Id>,
}

impl<E: Entity> Table<E> {
    fn new() -> Self {
        Self {
            rows: HashMap::new(),
            order: Vec::new(),
            by_reference_key: HashMap::new(),
        }
    }

    fn indexes_reference_key() -> bool {
        matches!(E::REFERENCE_KEY, ReferenceKey::Unique(_))
    }

    fn resolve_reference_key<'a>(&'a self, key: &'a str) -> Option<&'a str> {
        if Self::indexes_reference_key() {
            self.by_reference_key.get(key).map(String::as_str)
        } else {
            Some(key)
        }
    }

    fn insert(&mut self, entity: E) {
        let id = entity.id().clone();
        if Self::indexes_reference_key() {
            self.by_reference_key
                .insert(entity.reference_value().to_string(), id.clone());
        }
        if self.rows.insert(id.clone(), entity).is_none() {
            self.order.push(id);
        }
    }

    fn update(&mut self, entity: E) -> bool {
        let Some(previous) = self.rows.get(entity.id()) else {
            return false;
        };
        if Self::indexes_reference_key() {
            let old_key = previous.reference_value().to_string();
            if self.by_reference_key.get(&old_key) == Some(entity.id()) {
                self.by_reference_key.remove(&old_key);
            }
            self.by_reference_key
                .insert(entity.reference_value().to_string(), entity.id().clone());
        }
        self.rows.insert(entity.id().clone(), entity);
        true
    }

    fn remove(&mut self, id: &str) -> Option<E> {
        let removed = self.rows.remove(id)?;
        self.order.retain(|existing| existing != id);
        if Self::indexes_reference_key() {
            let key = removed.reference_value();
            if self.by_reference_key.get(key).map(String::as_str) == Some(id) {
                self.by_reference_key.remove(key);
            }
        }
        Some(removed)
    }

    fn list(&self) -> Vec<E> {
        self.order
            .iter()
            .filter_map(|id| self.rows.get(id).cloned())
            .collect()
    }
}

/// In-process store. Used for local runs and as the test double for the services.
#[derive(Debug)]
pub struct MemoryStore {
    users: RwLock<Table<User>>,
    projects: RwLock<Table<Project>>,
    teams: RwLock<Table<Team>>,
    tasks: RwLock<Table<Task>>,
    memberships: RwLock<HashMap<(String, Id), BTreeSet<Id>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Table::new()),
            projects: RwLock::new(Table::new()),
            teams: RwLock::new(Table::new()),
            tasks: RwLock::new(Table::new()),
            memberships: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

trait HasTable<E> {
    fn table(&self) -> &RwLock<Table<E>>;
}

impl HasTable<User> for MemoryStore {
    fn table(&self) -> &RwLock<Table<User>> {
        &self.users
    }
}

impl HasTable<Project> for MemoryStore {
    fn table(&self) -> &RwLock<Table<Project>> {
        &self.projects
    }
}

impl HasTable<Team> for MemoryStore {
    fn table(&self) -> &RwLock<Table<Team>> {
        &self.teams
    }
}

impl HasTable<Task> for MemoryStore {
    fn table(&self) -> &RwLock<Table<Task>> {
        &self.tasks
    }
}

#[async_trait::async_trait]
impl<E: Entity> EntityStore<E> for MemoryStore
where
    MemoryStore: HasTable<E>,
{
    async fn get(&self, id: &str) -> Result<Option<E>> {
        Ok(self.table().read().rows.get(id).cloned())
    }

    async fn get_by_reference_key(&self, key: &str) -> Result<Option<E>> {
        let table = self.table().read();
        Ok(table
            .resolve_reference_key(key)
            .and_then(|id| table.rows.get(id))
            .cloned())
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.table().read().rows.contains_key(id))
    }

    async fn exists_by_reference_key(&self, key: &str) -> Result<bool> {
        let table = self.table().read();
        Ok(table
            .resolve_reference_key(key)
            .is_some_and(|id| table.rows.contains_key(id)))
    }

    async fn list(&self) -> Result<Vec<E>> {
        Ok(self.table().read().list())
    }

    async fn insert(&self, entity: &E) -> Result<()> {
        self.table().write().insert(entity.clone());
        Ok(())
    }

    async fn update(&self, entity: &E) -> Result<bool> {
        Ok(self.table().write().update(entity.clone()))
    }

    async fn delete(&self, id: &str) -> Result<Option<E>> {
        Ok(self.table().write().remove(id))
    }
}

#[async_trait::async_trait]
impl TaskStore for MemoryStore {
    async fn list_subtasks(&self, parent_id: &str) -> Result<Vec<Task>> {
        let tasks = self.tasks.read();
        Ok(tasks
            .list()
            .into_iter()
            .filter(|task| task.parent_task.as_deref() == Some(parent_id))
            .collect())
    }
}

#[async_trait::async_trait]
impl MembershipStore for MemoryStore {
    async fn members(&self, relation: &str, owner_id: &str) -> Result<BTreeSet<Id>> {
        let memberships = self.memberships.read();
        Ok(memberships
            .get(&(relation.to_string(), owner_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_members(
        &self,
        relation: &str,
        owner_id: &str,
        members: &BTreeSet<Id>,
    ) -> Result<()> {
        let key = (relation.to_string(), owner_id.to_string());
        let mut memberships = self.memberships.write();
        if members.is_empty() {
            memberships.remove(&key);
        } else {
            memberships.insert(key, members.clone());
        }
        Ok(())
    }
}

impl Store for MemoryStore {}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, name: &str) -> Project {
        Project {
            id: id.to_string(),
            project_name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = MemoryStore::new();
        for (id, name) in [("b", "beta"), ("a", "alpha"), ("c", "gamma")] {
            EntityStore::<Project>::insert(&store, &project(id, name))
                .await
                .unwrap();
        }

        let ids: Vec<Id> = EntityStore::<Project>::list(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_reference_key_index_follows_renames_and_deletes() {
        let store = MemoryStore::new();
        EntityStore::<Project>::insert(&store, &project("p1", "apollo"))
            .await
            .unwrap();
        assert!(EntityStore::<Project>::exists_by_reference_key(&store, "apollo")
            .await
            .unwrap());
        assert!(!EntityStore::<Project>::exists_by_reference_key(&store, "p1")
            .await
            .unwrap());

        let updated = EntityStore::<Project>::update(&store, &project("p1", "gemini"))
            .await
            .unwrap();
        assert!(updated);
        assert!(!EntityStore::<Project>::exists_by_reference_key(&store, "apollo")
            .await
            .unwrap());
        let found = EntityStore::<Project>::get_by_reference_key(&store, "gemini")
            .await
            .unwrap();
        assert_eq!(found.map(|p| p.id), Some("p1".to_string()));

        let removed = EntityStore::<Project>::delete(&store, "p1").await.unwrap();
        assert_eq!(removed.map(|p| p.project_name), Some("gemini".to_string()));
        assert!(!EntityStore::<Project>::exists_by_reference_key(&store, "gemini")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_primary_reference_key_uses_id() {
        let store = MemoryStore::new();
        let user = User {
            id: "u1".to_string(),
            name: "Ada".to_string(),
            email: None,
        };
        EntityStore::<User>::insert(&store, &user).await.unwrap();
        assert!(EntityStore::<User>::exists_by_reference_key(&store, "u1")
            .await
            .unwrap());
        assert!(!EntityStore::<User>::update(
            &store,
            &User {
                id: "missing".to_string(),
                ..user
            }
        )
        .await
        .unwrap());
    }

    #[tokio::test]
    async fn test_replace_members_swaps_whole_set() {
        let store = MemoryStore::new();
        let first: BTreeSet<Id> = ["a".to_string(), "b".to_string()].into();
        store.replace_members("members", "t1", &first).await.unwrap();

        let second: BTreeSet<Id> = ["c".to_string()].into();
        store.replace_members("members", "t1", &second).await.unwrap();
        assert_eq!(store.members("members", "t1").await.unwrap(), second);

        store
            .replace_members("members", "t1", &BTreeSet::new())
            .await
            .unwrap();
        assert!(store.members("members", "t1").await.unwrap().is_empty());
    }
}
