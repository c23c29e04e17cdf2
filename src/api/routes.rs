use axum::{routing::get, Router};
use std::sync::Arc;

use crate::api::{handlers, task_handlers, team_handlers};
use crate::model::{Project, User};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Users
        .route(
            "/user",
            get(handlers::list_entities::<User, S>).post(handlers::create_entity::<User, S>),
        )
        .route(
            "/user/:id",
            get(handlers::get_entity::<User, S>)
                .put(handlers::replace_entity::<User, S>)
                .patch(handlers::patch_entity::<User, S>)
                .delete(handlers::delete_entity::<User, S>),
        )
        // Projects
        .route(
            "/project",
            get(handlers::list_entities::<Project, S>).post(handlers::create_entity::<Project, S>),
        )
        .route(
            "/project/:id",
            get(handlers::get_entity::<Project, S>)
                .put(handlers::replace_entity::<Project, S>)
                .patch(handlers::patch_entity::<Project, S>)
                .delete(handlers::delete_entity::<Project, S>),
        )
        // Teams (with the members relation)
        .route(
            "/team",
            get(team_handlers::list_teams::<S>).post(team_handlers::create_team::<S>),
        )
        .route(
            "/team/:id",
            get(team_handlers::get_team::<S>)
                .put(team_handlers::replace_team::<S>)
                .patch(team_handlers::patch_team::<S>)
                .delete(team_handlers::delete_team::<S>),
        )
        // Tasks (single reads include subtasks)
        .route(
            "/task",
            get(task_handlers::list_tasks::<S>).post(task_handlers::create_task::<S>),
        )
        .route(
            "/task/:id",
            get(task_handlers::get_task::<S>)
                .put(task_handlers::replace_task::<S>)
                .patch(task_handlers::patch_task::<S>)
                .delete(task_handlers::delete_task::<S>),
        )
}
