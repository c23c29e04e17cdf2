use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Entity, EntityKind, Id};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Entity for User {
    type Draft = UserDraft;

    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> &Id {
        &self.id
    }

    fn from_draft(id: Id, draft: UserDraft, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
        }
    }

    fn replaced_by(&self, draft: UserDraft) -> Self {
        Self::from_draft(self.id.clone(), draft, Utc::now())
    }
}
