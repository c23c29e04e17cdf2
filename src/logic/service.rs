use chrono::{SubsecRound, Utc};
use log::{info, warn};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::logic::error::{ServiceError, ServiceResult};
use crate::logic::merge::{merge_into, to_document, without_keys};
use crate::logic::validate::validate_references;
use crate::model::{generate_id, Entity, PatchDocument, ReferenceKey};
use crate::store::traits::{EntityStore, Store};

/// Create/get/list/replace/patch/delete for one entity type.
///
/// Every write validates the references it carries before touching the store, and
/// each write is a single row operation, so a rejected call leaves nothing behind.
pub struct EntityService<E, S> {
    store: Arc<S>,
    _entity: PhantomData<fn() -> E>,
}

impl<E, S> Clone for EntityService<E, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E, S> EntityService<E, S>
where
    E: Entity,
    S: Store + EntityStore<E>,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub async fn create(&self, draft: E::Draft) -> ServiceResult<E> {
        let candidate = to_document(&draft)?;
        validate_references(&*self.store, E::REFERENCES, &candidate)
            .await
            .inspect_err(|err| warn!("Rejected {} create: {}", E::KIND, err))?;

        // Postgres keeps timestamps to the microsecond.
        let entity = E::from_draft(generate_id(), draft, Utc::now().trunc_subsecs(6));
        self.ensure_reference_key_free(&entity).await?;

        EntityStore::<E>::insert(&*self.store, &entity).await?;
        info!("Created {} '{}'", E::KIND, entity.id());
        Ok(entity)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<E> {
        EntityStore::<E>::get(&*self.store, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(E::KIND, id))
    }

    pub async fn list(&self) -> ServiceResult<Vec<E>> {
        Ok(EntityStore::<E>::list(&*self.store).await?)
    }

    /// Full replacement: every reference in `draft` is checked, changed or not.
    pub async fn replace(&self, id: &str, draft: E::Draft) -> ServiceResult<E> {
        let current = self.get(id).await?;

        let candidate = to_document(&draft)?;
        validate_references(&*self.store, E::REFERENCES, &candidate)
            .await
            .inspect_err(|err| warn!("Rejected {} '{}' replace: {}", E::KIND, id, err))?;

        let replaced = current.replaced_by(draft);
        self.ensure_reference_key_free(&replaced).await?;
        self.commit(replaced).await
    }

    /// Partial update: keys in `patch` overwrite, everything else is kept. Only the
    /// references present in `patch` are checked; an empty patch is a no-op.
    pub async fn patch(&self, id: &str, patch: &PatchDocument) -> ServiceResult<E> {
        let current = self.get(id).await?;

        let patch = without_keys(patch, E::READ_ONLY);
        if patch.is_empty() {
            return Ok(current);
        }

        let merged: E = merge_into(&current, &patch)?;
        validate_references(&*self.store, E::REFERENCES, &patch)
            .await
            .inspect_err(|err| warn!("Rejected {} '{}' patch: {}", E::KIND, id, err))?;

        self.ensure_reference_key_free(&merged).await?;
        self.commit(merged).await
    }

    /// Remove the entity and return its last state. Whatever referenced it keeps
    /// the now-dangling key.
    pub async fn delete(&self, id: &str) -> ServiceResult<E> {
        let removed = EntityStore::<E>::delete(&*self.store, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(E::KIND, id))?;
        info!("Deleted {} '{}'", E::KIND, id);
        Ok(removed)
    }

    async fn commit(&self, entity: E) -> ServiceResult<E> {
        // The row can vanish between the read and this write.
        if !EntityStore::<E>::update(&*self.store, &entity).await? {
            return Err(ServiceError::not_found(E::KIND, entity.id().as_str()));
        }
        info!("Updated {} '{}'", E::KIND, entity.id());
        Ok(entity)
    }

    /// A unique reference key (e.g. a project name) may belong to one entity only.
    async fn ensure_reference_key_free(&self, entity: &E) -> ServiceResult<()> {
        let ReferenceKey::Unique(field) = E::REFERENCE_KEY else {
            return Ok(());
        };

        let holder =
            EntityStore::<E>::get_by_reference_key(&*self.store, entity.reference_value()).await?;
        match holder {
            Some(other) if other.id() != entity.id() => Err(ServiceError::Conflict {
                kind: E::KIND,
                field: field.to_string(),
                value: entity.reference_value().to_string(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Project, ProjectDraft, User, UserDraft};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> PatchDocument {
        value.as_object().cloned().unwrap()
    }

    fn users(store: &Arc<MemoryStore>) -> EntityService<User, MemoryStore> {
        EntityService::new(store.clone())
    }

    fn projects(store: &Arc<MemoryStore>) -> EntityService<Project, MemoryStore> {
        EntityService::new(store.clone())
    }

    fn user_draft(name: &str) -> UserDraft {
        UserDraft {
            name: name.to_string(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
        }
    }

    fn project_draft(name: &str) -> ProjectDraft {
        ProjectDraft {
            project_name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_get_list_delete() {
        let store = Arc::new(MemoryStore::new());
        let service = users(&store);

        let ada = service.create(user_draft("Ada")).await.unwrap();
        let grace = service.create(user_draft("Grace")).await.unwrap();
        assert_ne!(ada.id, grace.id);

        assert_eq!(service.get(&ada.id).await.unwrap(), ada);
        assert_eq!(service.list().await.unwrap(), vec![ada.clone(), grace]);

        let removed = service.delete(&ada.id).await.unwrap();
        assert_eq!(removed, ada);
        assert!(matches!(
            service.get(&ada.id).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete(&ada.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_patch_is_a_no_op() {
        let store = Arc::new(MemoryStore::new());
        let service = users(&store);
        let ada = service.create(user_draft("Ada")).await.unwrap();

        let patched = service.patch(&ada.id, &PatchDocument::new()).await.unwrap();
        assert_eq!(patched, ada);
        assert_eq!(service.get(&ada.id).await.unwrap(), ada);
    }

    #[tokio::test]
    async fn test_patch_ignores_read_only_id() {
        let store = Arc::new(MemoryStore::new());
        let service = users(&store);
        let ada = service.create(user_draft("Ada")).await.unwrap();

        let patched = service
            .patch(&ada.id, &doc(json!({ "id": "hijack", "name": "Ada L." })))
            .await
            .unwrap();
        assert_eq!(patched.id, ada.id);
        assert_eq!(patched.name, "Ada L.");
        assert_eq!(patched.email, ada.email);
    }

    #[tokio::test]
    async fn test_patch_and_replace_missing_target_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let service = users(&store);

        assert!(matches!(
            service.patch("nope", &doc(json!({ "name": "x" }))).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            service.replace("nope", user_draft("x")).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_project_name_must_be_unique() {
        let store = Arc::new(MemoryStore::new());
        let service = projects(&store);
        let apollo = service.create(project_draft("apollo")).await.unwrap();
        let gemini = service.create(project_draft("gemini")).await.unwrap();

        let err = service.create(project_draft("apollo")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { .. }));

        let err = service
            .patch(&gemini.id, &doc(json!({ "projectName": "apollo" })))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { .. }));
        assert_eq!(service.get(&gemini.id).await.unwrap(), gemini);

        // Re-asserting its own name is fine.
        let same = service
            .replace(&apollo.id, project_draft("apollo"))
            .await
            .unwrap();
        assert_eq!(same.project_name, "apollo");
        assert_eq!(service.list().await.unwrap().len(), 2);
    }
}
