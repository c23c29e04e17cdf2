use anyhow::Result;
use chrono::NaiveDate;
use log::info;
use std::sync::Arc;

use crate::logic::{EntityService, TaskService, TeamService};
use crate::model::{
    Project, ProjectDraft, TaskDraft, TeamDocument, TeamDraft, User, UserDraft,
};
use crate::store::traits::Store;

/// What `load_seed_data` created, for callers that want to point at it.
#[derive(Debug, Clone)]
pub struct SeedSummary {
    pub users: usize,
    pub projects: usize,
    pub teams: usize,
    pub tasks: usize,
}

fn user(name: &str, email: &str) -> UserDraft {
    UserDraft {
        name: name.to_string(),
        email: Some(email.to_string()),
    }
}

/// Load a small demonstration data set. Everything goes through the services, so the
/// seed is held to the same reference checks as any caller.
pub async fn load_seed_data<S: Store>(store: Arc<S>) -> Result<SeedSummary> {
    let users = EntityService::<User, S>::new(store.clone());
    let projects = EntityService::<Project, S>::new(store.clone());
    let teams = TeamService::new(store.clone());
    let tasks = TaskService::new(store);

    let mut created_users = Vec::new();
    for (name, email) in [
        ("Ada Lovelace", "ada@example.com"),
        ("Grace Hopper", "grace@example.com"),
        ("Linus Torvalds", "linus@example.com"),
    ] {
        created_users.push(users.create(user(name, email)).await?);
    }
    let (ada, grace, linus) = (&created_users[0], &created_users[1], &created_users[2]);

    let project = projects
        .create(ProjectDraft {
            project_name: "apollo".to_string(),
            description: Some("Guidance computer firmware".to_string()),
        })
        .await?;

    let core = teams
        .create(TeamDocument {
            draft: TeamDraft {
                name: "Core".to_string(),
            },
            members: Some(vec![ada.id.clone(), grace.id.clone()]),
        })
        .await?;

    let epic = tasks
        .create(TaskDraft {
            title: "Ship the landing sequence".to_string(),
            body: Some("Everything needed for a soft touchdown.".to_string()),
            due_date: NaiveDate::from_ymd_opt(1969, 7, 20),
            status: Some("in-progress".to_string()),
            priority: Some(1),
            story_point: Some(13),
            project: project.project_name.clone(),
            creator: ada.id.clone(),
            assigned_primary: grace.id.clone(),
            assigned_secondary: Some(linus.id.clone()),
            parent_task: None,
        })
        .await?;

    let alarm = tasks
        .create(TaskDraft {
            title: "Handle program alarm 1202".to_string(),
            body: None,
            due_date: NaiveDate::from_ymd_opt(1969, 7, 16),
            status: Some("todo".to_string()),
            priority: Some(2),
            story_point: Some(5),
            project: project.project_name.clone(),
            creator: grace.id.clone(),
            assigned_primary: ada.id.clone(),
            assigned_secondary: None,
            parent_task: Some(epic.id.clone()),
        })
        .await?;

    let created_projects = vec![project];
    let created_teams = vec![core];
    let created_tasks = vec![epic, alarm];

    let summary = SeedSummary {
        users: created_users.len(),
        projects: created_projects.len(),
        teams: created_teams.len(),
        tasks: created_tasks.len(),
    };
    info!("Seed data loaded: {:?}", summary);
    Ok(summary)
}
