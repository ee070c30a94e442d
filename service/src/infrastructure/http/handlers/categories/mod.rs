use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::domain::{
    AppState,
    category::{Category, CategoryId},
    moderation::Caller,
};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::DataResponse;
use crate::infrastructure::http::handlers::categories::dto::{
    CreateCategoryRequest, UpdateCategoryRequest,
};

mod dto;

pub async fn list_categories<S: AppState>(
    State(state): State<S>,
) -> Result<ApiSuccess<DataResponse<Vec<Category>>>, ApiError> {
    let categories = state.gateway().list_categories().await?;
    Ok(ApiSuccess::new(StatusCode::OK, DataResponse::new(categories)))
}

pub async fn get_category<S: AppState>(
    State(state): State<S>,
    Path(id): Path<i64>,
) -> Result<ApiSuccess<DataResponse<Category>>, ApiError> {
    state
        .gateway()
        .get_category(CategoryId(id))
        .await?
        .map(|category| ApiSuccess::new(StatusCode::OK, DataResponse::new(category)))
        .ok_or(ApiError::NotFound)
}

pub async fn create_category<S: AppState>(
    State(state): State<S>,
    caller: Caller,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<ApiSuccess<DataResponse<Category>>, ApiError> {
    let category = body.into_domain()?;
    let created = state.gateway().create_category(caller, category).await?;
    Ok(ApiSuccess::new(StatusCode::CREATED, DataResponse::new(created)))
}

pub async fn update_category<S: AppState>(
    State(state): State<S>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<ApiSuccess<DataResponse<Category>>, ApiError> {
    let changes = body.into_domain()?;
    state
        .gateway()
        .update_category(caller, CategoryId(id), changes)
        .await?
        .map(|category| ApiSuccess::new(StatusCode::OK, DataResponse::new(category)))
        .ok_or(ApiError::NotFound)
}

pub async fn delete_category<S: AppState>(
    State(state): State<S>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.gateway().delete_category(caller, CategoryId(id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
