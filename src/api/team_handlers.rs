use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};

use crate::api::handlers::{service_error, ApiResult, AppState, DataResponse};
use crate::logic::TeamService;
use crate::model::{Id, PatchDocument, TeamDetails, TeamDocument};
use crate::store::traits::Store;

/// POST /team
pub async fn create_team<S: Store>(
    State(store): State<AppState<S>>,
    RequestJson(document): RequestJson<TeamDocument>,
) -> ApiResult<(StatusCode, Json<DataResponse<TeamDetails>>)> {
    match TeamService::new(store).create(document).await {
        Ok(team) => Ok((StatusCode::CREATED, DataResponse::new(team))),
        Err(e) => Err(service_error(e)),
    }
}

/// GET /team
pub async fn list_teams<S: Store>(
    State(store): State<AppState<S>>,
) -> ApiResult<Json<DataResponse<Vec<TeamDetails>>>> {
    TeamService::new(store)
        .list()
        .await
        .map(DataResponse::new)
        .map_err(service_error)
}

/// GET /team/:id
pub async fn get_team<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<DataResponse<TeamDetails>>> {
    TeamService::new(store)
        .get(&id)
        .await
        .map(DataResponse::new)
        .map_err(service_error)
}

/// PUT /team/:id
pub async fn replace_team<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    RequestJson(document): RequestJson<TeamDocument>,
) -> ApiResult<Json<DataResponse<TeamDetails>>> {
    TeamService::new(store)
        .replace(&id, document)
        .await
        .map(DataResponse::new)
        .map_err(service_error)
}

/// PATCH /team/:id
pub async fn patch_team<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    RequestJson(patch): RequestJson<PatchDocument>,
) -> ApiResult<Json<DataResponse<TeamDetails>>> {
    TeamService::new(store)
        .patch(&id, &patch)
        .await
        .map(DataResponse::new)
        .map_err(service_error)
}

/// DELETE /team/:id
pub async fn delete_team<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<DataResponse<TeamDetails>>> {
    TeamService::new(store)
        .delete(&id)
        .await
        .map(DataResponse::new)
        .map_err(service_error)
}
