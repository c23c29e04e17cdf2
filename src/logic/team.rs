use log::{error, warn};
use std::sync::Arc;

use crate::logic::error::ServiceResult;
use crate::logic::reconcile::{commit_members, prepare_members, reconcile, PreparedMembers};
use crate::logic::service::EntityService;
use crate::model::{Id, PatchDocument, Team, TeamDetails, TeamDocument, TEAM_MEMBERS};
use crate::store::traits::{EntityStore, Store};

/// Teams are a scalar row plus the `members` relation to users. The row goes through
/// the generic service; the relation is only ever written by the reconciler, and the
/// member list is checked before either is touched. If the member write fails after
/// the row was written, the row is put back the way it was.
pub struct TeamService<S> {
    teams: EntityService<Team, S>,
}

impl<S: Store> TeamService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            teams: EntityService::new(store),
        }
    }

    fn store(&self) -> &S {
        self.teams.store()
    }

    async fn prepare(&self, members: Option<&[Id]>) -> ServiceResult<Option<PreparedMembers>> {
        match members {
            Some(members) => Ok(Some(prepare_members(self.store(), TEAM_MEMBERS, members).await?)),
            None => Ok(None),
        }
    }

    async fn details(&self, team: Team, prepared: Option<PreparedMembers>) -> ServiceResult<TeamDetails> {
        let members = match prepared {
            Some(prepared) => commit_members(self.store(), &team.id, prepared).await?,
            None => self.store().members(TEAM_MEMBERS.name, &team.id).await?,
        };
        Ok(TeamDetails {
            team,
            members: members.into_iter().collect(),
        })
    }

    /// Finish a write whose row is already stored. `previous` is the row as it was
    /// before the write, or `None` when the row was just inserted.
    async fn finish_write(
        &self,
        team: Team,
        prepared: Option<PreparedMembers>,
        previous: Option<Team>,
    ) -> ServiceResult<TeamDetails> {
        let id = team.id.clone();
        match self.details(team, prepared).await {
            Ok(details) => Ok(details),
            Err(err) => {
                warn!("Members write for team '{}' failed, restoring row: {}", id, err);
                self.restore_row(&id, previous).await;
                Err(err)
            }
        }
    }

    async fn restore_row(&self, id: &str, previous: Option<Team>) {
        let restored = match previous {
            Some(previous) => EntityStore::<Team>::update(self.store(), &previous)
                .await
                .map(|_| ()),
            None => EntityStore::<Team>::delete(self.store(), id).await.map(|_| ()),
        };
        if let Err(err) = restored {
            error!("Failed to restore team '{}': {}", id, err);
        }
    }

    pub async fn create(&self, document: TeamDocument) -> ServiceResult<TeamDetails> {
        let members = document.members.unwrap_or_default();
        let prepared = prepare_members(self.store(), TEAM_MEMBERS, &members).await?;
        let team = self.teams.create(document.draft).await?;
        self.finish_write(team, Some(prepared), None).await
    }

    pub async fn get(&self, id: &str) -> ServiceResult<TeamDetails> {
        let team = self.teams.get(id).await?;
        self.details(team, None).await
    }

    pub async fn list(&self) -> ServiceResult<Vec<TeamDetails>> {
        let mut teams = Vec::new();
        for team in self.teams.list().await? {
            teams.push(self.details(team, None).await?);
        }
        Ok(teams)
    }

    /// Replaces the name; `members`, when given, replaces the whole set. An omitted
    /// `members` leaves the current set alone.
    pub async fn replace(&self, id: &str, document: TeamDocument) -> ServiceResult<TeamDetails> {
        let current = self.teams.get(id).await?;
        let prepared = self.prepare(document.members.as_deref()).await?;
        let team = self.teams.replace(id, document.draft).await?;
        self.finish_write(team, prepared, Some(current)).await
    }

    pub async fn patch(&self, id: &str, patch: &PatchDocument) -> ServiceResult<TeamDetails> {
        let current = self.teams.get(id).await?;

        let mut scalar = patch.clone();
        let members: Option<Vec<Id>> = scalar
            .remove(TEAM_MEMBERS.name)
            .map(serde_json::from_value)
            .transpose()?;

        let prepared = self.prepare(members.as_deref()).await?;
        let team = self.teams.patch(id, &scalar).await?;
        self.finish_write(team, prepared, Some(current)).await
    }

    /// Deletes the team and clears its own membership set. Users are untouched.
    pub async fn delete(&self, id: &str) -> ServiceResult<TeamDetails> {
        let members = self.store().members(TEAM_MEMBERS.name, id).await?;
        let team = self.teams.delete(id).await?;
        reconcile(self.store(), id, TEAM_MEMBERS, &[]).await?;
        Ok(TeamDetails {
            team,
            members: members.into_iter().collect(),
        })
    }
}
