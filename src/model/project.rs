use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Entity, EntityKind, Id, ReferenceKey};

/// Tasks point at a project through its unique `projectName`, not its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Id,
    pub project_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    pub project_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Entity for Project {
    type Draft = ProjectDraft;

    const KIND: EntityKind = EntityKind::Project;
    const REFERENCE_KEY: ReferenceKey = ReferenceKey::Unique("projectName");

    fn id(&self) -> &Id {
        &self.id
    }

    fn reference_value(&self) -> &str {
        &self.project_name
    }

    fn from_draft(id: Id, draft: ProjectDraft, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            project_name: draft.project_name,
            description: draft.description,
        }
    }

    fn replaced_by(&self, draft: ProjectDraft) -> Self {
        Self::from_draft(self.id.clone(), draft, Utc::now())
    }
}
