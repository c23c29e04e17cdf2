use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use log::error;
use serde::Serialize;
use std::sync::Arc;

use crate::logic::{EntityService, ServiceError};
use crate::model::{Entity, EntityKind, Id, PatchDocument};
use crate::store::traits::{EntityStore, Store};

pub type AppState<S> = Arc<S>;

pub type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Success envelope: `{ "data": ... }`
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self { data })
    }
}

/// Error envelope. `field`/`target`/`key` are set for a missing reference so callers
/// can tell it apart from a missing target entity (both are 404).
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<EntityKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Id>,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
            field: None,
            target: None,
            key: None,
        }
    }
}

pub fn service_error(err: ServiceError) -> (StatusCode, Json<ErrorResponse>) {
    let message = err.to_string();
    match err {
        ServiceError::NotFound { kind, key } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                target: Some(kind),
                key: Some(key),
                ..ErrorResponse::new(&message)
            }),
        ),
        ServiceError::ReferenceNotFound { field, target, key } => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                field: Some(field),
                target: Some(target),
                key: Some(key),
                ..ErrorResponse::new(&message)
            }),
        ),
        ServiceError::Conflict { kind, field, .. } => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                field: Some(field),
                target: Some(kind),
                ..ErrorResponse::new(&message)
            }),
        ),
        ServiceError::InvalidDocument(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new(&message)),
        ),
        ServiceError::Storage(source) => {
            error!("Storage failure: {:#}", source);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(&message)),
            )
        }
    }
}

// Generic entity handlers, used for users and projects.

pub async fn create_entity<E, S>(
    State(store): State<AppState<S>>,
    RequestJson(draft): RequestJson<E::Draft>,
) -> ApiResult<(StatusCode, Json<DataResponse<E>>)>
where
    E: Entity,
    S: Store + EntityStore<E>,
{
    match EntityService::<E, S>::new(store).create(draft).await {
        Ok(entity) => Ok((StatusCode::CREATED, DataResponse::new(entity))),
        Err(e) => Err(service_error(e)),
    }
}

pub async fn list_entities<E, S>(
    State(store): State<AppState<S>>,
) -> ApiResult<Json<DataResponse<Vec<E>>>>
where
    E: Entity,
    S: Store + EntityStore<E>,
{
    match EntityService::<E, S>::new(store).list().await {
        Ok(entities) => Ok(DataResponse::new(entities)),
        Err(e) => Err(service_error(e)),
    }
}

pub async fn get_entity<E, S>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<DataResponse<E>>>
where
    E: Entity,
    S: Store + EntityStore<E>,
{
    match EntityService::<E, S>::new(store).get(&id).await {
        Ok(entity) => Ok(DataResponse::new(entity)),
        Err(e) => Err(service_error(e)),
    }
}

pub async fn replace_entity<E, S>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    RequestJson(draft): RequestJson<E::Draft>,
) -> ApiResult<Json<DataResponse<E>>>
where
    E: Entity,
    S: Store + EntityStore<E>,
{
    match EntityService::<E, S>::new(store).replace(&id, draft).await {
        Ok(entity) => Ok(DataResponse::new(entity)),
        Err(e) => Err(service_error(e)),
    }
}

pub async fn patch_entity<E, S>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    RequestJson(patch): RequestJson<PatchDocument>,
) -> ApiResult<Json<DataResponse<E>>>
where
    E: Entity,
    S: Store + EntityStore<E>,
{
    match EntityService::<E, S>::new(store).patch(&id, &patch).await {
        Ok(entity) => Ok(DataResponse::new(entity)),
        Err(e) => Err(service_error(e)),
    }
}

pub async fn delete_entity<E, S>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<DataResponse<E>>>
where
    E: Entity,
    S: Store + EntityStore<E>,
{
    match EntityService::<E, S>::new(store).delete(&id).await {
        Ok(entity) => Ok(DataResponse::new(entity)),
        Err(e) => Err(service_error(e)),
    }
}
