use anyhow::Result;

use crate::model::{Entity, EntityKind, Project, Task, Team, User};
use crate::store::traits::{EntityStore, Store};

/// Point lookup of an entity by the key references use for its type:
/// the primary key for users, teams and tasks, the project name for projects.
#[async_trait::async_trait]
pub trait ExistenceResolver: Send + Sync {
    /// Store failures come back as `Err`, never as `Ok(false)`.
    async fn exists(&self, kind: EntityKind, key: &str) -> Result<bool>;
}

#[async_trait::async_trait]
impl<S: Store> ExistenceResolver for S {
    async fn exists(&self, kind: EntityKind, key: &str) -> Result<bool> {
        match kind {
            EntityKind::User => exists_by_reference::<User, S>(self, key).await,
            EntityKind::Project => exists_by_reference::<Project, S>(self, key).await,
            EntityKind::Team => exists_by_reference::<Team, S>(self, key).await,
            EntityKind::Task => exists_by_reference::<Task, S>(self, key).await,
        }
    }
}

async fn exists_by_reference<E, S>(store: &S, key: &str) -> Result<bool>
where
    E: Entity,
    S: EntityStore<E> + ?Sized,
{
    store.exists_by_reference_key(key).await
}
