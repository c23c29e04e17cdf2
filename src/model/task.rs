use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Entity, EntityKind, Id, ReferenceField};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<String>,
    /// Set once when the task is created.
    pub creation: DateTime<Utc>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub story_point: Option<i32>,
    /// `projectName` of the owning project.
    pub project: String,
    pub creator: Id,
    pub assigned_primary: Id,
    #[serde(default)]
    pub assigned_secondary: Option<Id>,
    #[serde(default)]
    pub parent_task: Option<Id>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub story_point: Option<i32>,
    pub project: String,
    pub creator: Id,
    pub assigned_primary: Id,
    #[serde(default)]
    pub assigned_secondary: Option<Id>,
    #[serde(default)]
    pub parent_task: Option<Id>,
}

/// A task with its direct children, computed at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetails {
    #[serde(flatten)]
    pub task: Task,
    pub subtasks: Vec<Task>,
}

impl Entity for Task {
    type Draft = TaskDraft;

    const KIND: EntityKind = EntityKind::Task;

    const REFERENCES: &'static [ReferenceField] = &[
        ReferenceField::required("project", EntityKind::Project),
        ReferenceField::required("creator", EntityKind::User),
        ReferenceField::required("assignedPrimary", EntityKind::User),
        ReferenceField::optional("assignedSecondary", EntityKind::User),
        ReferenceField::optional("parentTask", EntityKind::Task),
    ];

    const READ_ONLY: &'static [&'static str] = &["id", "creation"];

    fn id(&self) -> &Id {
        &self.id
    }

    fn from_draft(id: Id, draft: TaskDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            body: draft.body,
            due_date: draft.due_date,
            status: draft.status,
            creation: now,
            priority: draft.priority,
            story_point: draft.story_point,
            project: draft.project,
            creator: draft.creator,
            assigned_primary: draft.assigned_primary,
            assigned_secondary: draft.assigned_secondary,
            parent_task: draft.parent_task,
        }
    }

    fn replaced_by(&self, draft: TaskDraft) -> Self {
        Self::from_draft(self.id.clone(), draft, self.creation)
    }
}
