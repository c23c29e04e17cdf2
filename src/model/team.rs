use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Association, Entity, EntityKind, Id};

/// Team membership is not a column of the team row; it lives in its own relation.
pub const TEAM_MEMBERS: Association = Association {
    name: "members",
    owner: EntityKind::Team,
    target: EntityKind::User,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDraft {
    pub name: String,
}

/// Create/replace body for a team: the scalar draft plus an optional member list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDocument {
    #[serde(flatten)]
    pub draft: TeamDraft,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<Id>>,
}

/// A team as returned to callers, with its current member ids (sorted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetails {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<Id>,
}

impl Entity for Team {
    type Draft = TeamDraft;

    const KIND: EntityKind = EntityKind::Team;

    fn id(&self) -> &Id {
        &self.id
    }

    fn from_draft(id: Id, draft: TeamDraft, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
        }
    }

    fn replaced_by(&self, draft: TeamDraft) -> Self {
        Self::from_draft(self.id.clone(), draft, Utc::now())
    }
}
