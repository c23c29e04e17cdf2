use std::sync::Arc;

use crate::logic::error::ServiceResult;
use crate::logic::service::EntityService;
use crate::model::{PatchDocument, Task, TaskDetails, TaskDraft};
use crate::store::traits::Store;

/// Task writes go through the generic service; reads of a single task also carry its
/// direct children, found by `parentTask`. Nothing walks further up or down the tree,
/// so a cycle of parents is stored but never followed.
pub struct TaskService<S> {
    tasks: EntityService<Task, S>,
}

impl<S: Store> TaskService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            tasks: EntityService::new(store),
        }
    }

    pub async fn create(&self, draft: TaskDraft) -> ServiceResult<Task> {
        self.tasks.create(draft).await
    }

    pub async fn get(&self, id: &str) -> ServiceResult<TaskDetails> {
        let task = self.tasks.get(id).await?;
        let subtasks = self.tasks.store().list_subtasks(&task.id).await?;
        Ok(TaskDetails { task, subtasks })
    }

    pub async fn list(&self) -> ServiceResult<Vec<Task>> {
        self.tasks.list().await
    }

    pub async fn replace(&self, id: &str, draft: TaskDraft) -> ServiceResult<Task> {
        self.tasks.replace(id, draft).await
    }

    pub async fn patch(&self, id: &str, patch: &PatchDocument) -> ServiceResult<Task> {
        self.tasks.patch(id, patch).await
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<Task> {
        self.tasks.delete(id).await
    }
}
