use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::domain::{
    AppState,
    moderation::Caller,
    tag::{Tag, TagId, normalize_tag},
};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::DataResponse;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}

pub async fn list_tags<S: AppState>(
    State(state): State<S>,
) -> Result<ApiSuccess<DataResponse<Vec<Tag>>>, ApiError> {
    let tags = state.gateway().list_tags().await?;
    Ok(ApiSuccess::new(StatusCode::OK, DataResponse::new(tags)))
}

pub async fn get_tag<S: AppState>(
    State(state): State<S>,
    Path(id): Path<i64>,
) -> Result<ApiSuccess<DataResponse<Tag>>, ApiError> {
    state
        .gateway()
        .get_tag(TagId(id))
        .await?
        .map(|tag| ApiSuccess::new(StatusCode::OK, DataResponse::new(tag)))
        .ok_or(ApiError::NotFound)
}

/// Idempotent: an existing tag with the same canonical name is returned as is.
pub async fn create_tag<S: AppState>(
    State(state): State<S>,
    caller: Caller,
    Json(body): Json<CreateTagRequest>,
) -> Result<ApiSuccess<DataResponse<Tag>>, ApiError> {
    let name = normalize_tag(&body.name)
        .map_err(|e| ApiError::UnprocessableEntity(format!("invalid tag: {}", e)))?;
    let tag = state.gateway().create_tag(caller, name).await?;
    Ok(ApiSuccess::new(StatusCode::OK, DataResponse::new(tag)))
}

pub async fn delete_tag<S: AppState>(
    State(state): State<S>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.gateway().delete_tag(caller, TagId(id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
