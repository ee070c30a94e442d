use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::domain::{AppState, moderation::Caller, resource::{Resource, ResourceId}};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::DataResponse;
use crate::infrastructure::http::handlers::resources::dto::{
    EditResourceRequest, ListResourcesParams, ModerateRequest, ResourceListResponse,
    SubmitResourceRequest, VoteRequest,
};
use crate::infrastructure::http::querystring::QueryString;

pub mod dto;

type ResourceResponse = Result<ApiSuccess<DataResponse<Resource>>, ApiError>;

fn found(resource: Option<Resource>) -> ResourceResponse {
    resource
        .map(|resource| ApiSuccess::new(StatusCode::OK, DataResponse::new(resource)))
        .ok_or(ApiError::NotFound)
}

pub async fn submit_resource<S: AppState>(
    State(state): State<S>,
    Json(body): Json<SubmitResourceRequest>,
) -> ResourceResponse {
    let (resource, tags) = body.into_domain()?;
    let created = state.gateway().submit(resource, &tags).await?;
    Ok(ApiSuccess::new(StatusCode::CREATED, DataResponse::new(created)))
}

pub async fn list_resources<S: AppState>(
    State(state): State<S>,
    QueryString(params): QueryString<ListResourcesParams>,
) -> Result<ApiSuccess<ResourceListResponse>, ApiError> {
    let query = params.into_query()?;
    let resources = state.gateway().list(&query).await?;
    Ok(ApiSuccess::new(
        StatusCode::OK,
        ResourceListResponse::new(resources, &query),
    ))
}

pub async fn get_resource<S: AppState>(
    State(state): State<S>,
    Path(id): Path<i64>,
) -> ResourceResponse {
    found(state.gateway().get(ResourceId(id)).await?)
}

pub async fn edit_resource<S: AppState>(
    State(state): State<S>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(body): Json<EditResourceRequest>,
) -> ResourceResponse {
    let (changes, tags) = body.into_domain()?;
    found(state.gateway().edit(caller, ResourceId(id), changes, tags).await?)
}

pub async fn moderate_resource<S: AppState>(
    State(state): State<S>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(body): Json<ModerateRequest>,
) -> ResourceResponse {
    let decision = body.decision()?;
    found(state.gateway().moderate(caller, ResourceId(id), decision).await?)
}

pub async fn delete_resource<S: AppState>(
    State(state): State<S>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.gateway().remove(caller, ResourceId(id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

pub async fn vote_resource<S: AppState>(
    State(state): State<S>,
    Path(id): Path<i64>,
    Json(body): Json<VoteRequest>,
) -> ResourceResponse {
    let direction = body.direction()?;
    found(state.gateway().vote(ResourceId(id), direction).await?)
}
