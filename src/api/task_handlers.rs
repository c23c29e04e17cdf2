use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};

use crate::api::handlers::{service_error, ApiResult, AppState, DataResponse};
use crate::logic::TaskService;
use crate::model::{Id, PatchDocument, Task, TaskDetails, TaskDraft};
use crate::store::traits::Store;

/// POST /task
pub async fn create_task<S: Store>(
    State(store): State<AppState<S>>,
    RequestJson(draft): RequestJson<TaskDraft>,
) -> ApiResult<(StatusCode, Json<DataResponse<Task>>)> {
    match TaskService::new(store).create(draft).await {
        Ok(task) => Ok((StatusCode::CREATED, DataResponse::new(task))),
        Err(e) => Err(service_error(e)),
    }
}

/// GET /task
pub async fn list_tasks<S: Store>(
    State(store): State<AppState<S>>,
) -> ApiResult<Json<DataResponse<Vec<Task>>>> {
    TaskService::new(store)
        .list()
        .await
        .map(DataResponse::new)
        .map_err(service_error)
}

/// GET /task/:id, with the task's direct subtasks
pub async fn get_task<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<DataResponse<TaskDetails>>> {
    TaskService::new(store)
        .get(&id)
        .await
        .map(DataResponse::new)
        .map_err(service_error)
}

/// PUT /task/:id
pub async fn replace_task<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    RequestJson(draft): RequestJson<TaskDraft>,
) -> ApiResult<Json<DataResponse<Task>>> {
    TaskService::new(store)
        .replace(&id, draft)
        .await
        .map(DataResponse::new)
        .map_err(service_error)
}

/// PATCH /task/:id
pub async fn patch_task<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    RequestJson(patch): RequestJson<PatchDocument>,
) -> ApiResult<Json<DataResponse<Task>>> {
    TaskService::new(store)
        .patch(&id, &patch)
        .await
        .map(DataResponse::new)
        .map_err(service_error)
}

/// DELETE /task/:id
pub async fn delete_task<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<DataResponse<Task>>> {
    TaskService::new(store)
        .delete(&id)
        .await
        .map(DataResponse::new)
        .map_err(service_error)
}
