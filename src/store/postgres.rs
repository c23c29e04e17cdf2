use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row};
use std::collections::BTreeSet;

use crate::model::{Id, Project, Task, Team, User};
use crate::store::traits::{EntityStore, MembershipStore, Store, TaskStore};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run the embedded schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }
}

const USER_COLUMNS: &str = "id, name, email";
const PROJECT_COLUMNS: &str = "id, project_name, description";
const TEAM_COLUMNS: &str = "id, name";
const TASK_COLUMNS: &str = "id, title, body, due_date, status, creation, priority, story_point, \
     project, creator, assigned_primary, assigned_secondary, parent_task";

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
    }
}

fn project_from_row(row: &PgRow) -> Project {
    Project {
        id: row.get("id"),
        project_name: row.get("project_name"),
        description: row.get("description"),
    }
}

fn team_from_row(row: &PgRow) -> Team {
    Team {
        id: row.get("id"),
        name: row.get("name"),
    }
}

fn task_from_row(row: &PgRow) -> Task {
    Task {
        id: row.get("id"),
        title: row.get("title"),
        body: row.get("body"),
        due_date: row.get("due_date"),
        status: row.get("status"),
        creation: row.get("creation"),
        priority: row.get("priority"),
        story_point: row.get("story_point"),
        project: row.get("project"),
        creator: row.get("creator"),
        assigned_primary: row.get("assigned_primary"),
        assigned_secondary: row.get("assigned_secondary"),
        parent_task: row.get("parent_task"),
    }
}

#[async_trait::async_trait]
impl EntityStore<User> for PostgresStore {
    async fn get(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user")?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn get_by_reference_key(&self, key: &str) -> Result<Option<User>> {
        EntityStore::<User>::get(self, key).await
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check user existence")
    }

    async fn exists_by_reference_key(&self, key: &str) -> Result<bool> {
        EntityStore::<User>::exists(self, key).await
    }

    async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY inserted_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list users")?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query("INSERT INTO users (id, name, email) VALUES ($1, $2, $3)")
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .execute(&self.pool)
            .await
            .context("Failed to insert user")?;

        Ok(())
    }

    async fn update(&self, user: &User) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET name = $2, email = $3 WHERE id = $1")
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .execute(&self.pool)
            .await
            .context("Failed to update user")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to delete user")?;

        Ok(row.as_ref().map(user_from_row))
    }
}

#[async_trait::async_trait]
impl EntityStore<Project> for PostgresStore {
    async fn get(&self, id: &str) -> Result<Option<Project>> {
        let row = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch project")?;

        Ok(row.as_ref().map(project_from_row))
    }

    async fn get_by_reference_key(&self, key: &str) -> Result<Option<Project>> {
        let row = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE project_name = $1"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch project by name")?;

        Ok(row.as_ref().map(project_from_row))
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check project existence")
    }

    async fn exists_by_reference_key(&self, key: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM projects WHERE project_name = $1)")
            .bind(key)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check project name")
    }

    async fn list(&self) -> Result<Vec<Project>> {
        let rows = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY inserted_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list projects")?;

        Ok(rows.iter().map(project_from_row).collect())
    }

    async fn insert(&self, project: &Project) -> Result<()> {
        sqlx::query("INSERT INTO projects (id, project_name, description) VALUES ($1, $2, $3)")
            .bind(&project.id)
            .bind(&project.project_name)
            .bind(&project.description)
            .execute(&self.pool)
            .await
            .context("Failed to insert project")?;

        Ok(())
    }

    async fn update(&self, project: &Project) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE projects SET project_name = $2, description = $3 WHERE id = $1",
        )
        .bind(&project.id)
        .bind(&project.project_name)
        .bind(&project.description)
        .execute(&self.pool)
        .await
        .context("Failed to update project")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<Option<Project>> {
        let row = sqlx::query(&format!(
            "DELETE FROM projects WHERE id = $1 RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to delete project")?;

        Ok(row.as_ref().map(project_from_row))
    }
}

#[async_trait::async_trait]
impl EntityStore<Team> for PostgresStore {
    async fn get(&self, id: &str) -> Result<Option<Team>> {
        let row = sqlx::query(&format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch team")?;

        Ok(row.as_ref().map(team_from_row))
    }

    async fn get_by_reference_key(&self, key: &str) -> Result<Option<Team>> {
        EntityStore::<Team>::get(self, key).await
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM teams WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check team existence")
    }

    async fn exists_by_reference_key(&self, key: &str) -> Result<bool> {
        EntityStore::<Team>::exists(self, key).await
    }

    async fn list(&self) -> Result<Vec<Team>> {
        let rows = sqlx::query(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams ORDER BY inserted_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list teams")?;

        Ok(rows.iter().map(team_from_row).collect())
    }

    async fn insert(&self, team: &Team) -> Result<()> {
        sqlx::query("INSERT INTO teams (id, name) VALUES ($1, $2)")
            .bind(&team.id)
            .bind(&team.name)
            .execute(&self.pool)
            .await
            .context("Failed to insert team")?;

        Ok(())
    }

    async fn update(&self, team: &Team) -> Result<bool> {
        let result = sqlx::query("UPDATE teams SET name = $2 WHERE id = $1")
            .bind(&team.id)
            .bind(&team.name)
            .execute(&self.pool)
            .await
            .context("Failed to update team")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<Option<Team>> {
        let row = sqlx::query(&format!(
            "DELETE FROM teams WHERE id = $1 RETURNING {TEAM_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to delete team")?;

        Ok(row.as_ref().map(team_from_row))
    }
}

#[async_trait::async_trait]
impl EntityStore<Task> for PostgresStore {
    async fn get(&self, id: &str) -> Result<Option<Task>> {
        let row = sqlx::query(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch task")?;

        Ok(row.as_ref().map(task_from_row))
    }

    async fn get_by_reference_key(&self, key: &str) -> Result<Option<Task>> {
        EntityStore::<Task>::get(self, key).await
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM tasks WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check task existence")
    }

    async fn exists_by_reference_key(&self, key: &str) -> Result<bool> {
        EntityStore::<Task>::exists(self, key).await
    }

    async fn list(&self) -> Result<Vec<Task>> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY inserted_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list tasks")?;

        Ok(rows.iter().map(task_from_row).collect())
    }

    async fn insert(&self, task: &Task) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, title, body, due_date, status, creation, priority, story_point,
                               project, creator, assigned_primary, assigned_secondary, parent_task)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.body)
        .bind(task.due_date)
        .bind(&task.status)
        .bind(task.creation)
        .bind(task.priority)
        .bind(task.story_point)
        .bind(&task.project)
        .bind(&task.creator)
        .bind(&task.assigned_primary)
        .bind(&task.assigned_secondary)
        .bind(&task.parent_task)
        .execute(&self.pool)
        .await
        .context("Failed to insert task")?;

        Ok(())
    }

    async fn update(&self, task: &Task) -> Result<bool> {
        // `creation` is never rewritten.
        let result = sqlx::query(
            r#"
            UPDATE tasks SET
                title = $2, body = $3, due_date = $4, status = $5, priority = $6,
                story_point = $7, project = $8, creator = $9, assigned_primary = $10,
                assigned_secondary = $11, parent_task = $12
            WHERE id = $1
            "#,
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.body)
        .bind(task.due_date)
        .bind(&task.status)
        .bind(task.priority)
        .bind(task.story_point)
        .bind(&task.project)
        .bind(&task.creator)
        .bind(&task.assigned_primary)
        .bind(&task.assigned_secondary)
        .bind(&task.parent_task)
        .execute(&self.pool)
        .await
        .context("Failed to update task")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<Option<Task>> {
        let row = sqlx::query(&format!(
            "DELETE FROM tasks WHERE id = $1 RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to delete task")?;

        Ok(row.as_ref().map(task_from_row))
    }
}

#[async_trait::async_trait]
impl TaskStore for PostgresStore {
    async fn list_subtasks(&self, parent_id: &str) -> Result<Vec<Task>> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE parent_task = $1 ORDER BY inserted_at, id"
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list subtasks")?;

        Ok(rows.iter().map(task_from_row).collect())
    }
}

#[async_trait::async_trait]
impl MembershipStore for PostgresStore {
    async fn members(&self, relation: &str, owner_id: &str) -> Result<BTreeSet<Id>> {
        let members: Vec<String> = sqlx::query_scalar(
            "SELECT member_id FROM memberships WHERE relation = $1 AND owner_id = $2",
        )
        .bind(relation)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list memberships")?;

        Ok(members.into_iter().collect())
    }

    async fn replace_members(
        &self,
        relation: &str,
        owner_id: &str,
        members: &BTreeSet<Id>,
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start membership transaction")?;

        sqlx::query("DELETE FROM memberships WHERE relation = $1 AND owner_id = $2")
            .bind(relation)
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear memberships")?;

        for member_id in members {
            sqlx::query(
                "INSERT INTO memberships (relation, owner_id, member_id) VALUES ($1, $2, $3)",
            )
            .bind(relation)
            .bind(owner_id)
            .bind(member_id)
            .execute(&mut *tx)
            .await
            .context("Failed to insert membership")?;
        }

        tx.commit()
            .await
            .context("Failed to commit membership transaction")?;

        Ok(())
    }
}

impl Store for PostgresStore {}
