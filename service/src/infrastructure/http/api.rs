use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::repository::RepositoryError;
use crate::domain::resource::error::LifecycleError;

const NAME_TAKEN: &str = "name already exists";

// ApiSuccess is a wrapper around a response that includes a status code.

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<T>);

impl<T: Serialize> ApiSuccess<T> {
    pub(crate) fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

// ApiError is a wrapper around a response that includes a status code.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    UnprocessableEntity(String),
    ConflictWithServerState(String),
    Forbidden,
    NotFound,
}

impl From<RepositoryError> for ApiError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::UniqueViolation(cause) => {
                tracing::warn!(%cause, "unique constraint violated");
                Self::ConflictWithServerState(NAME_TAKEN.to_string())
            }
            RepositoryError::Database(cause) => Self::InternalServerError(cause),
        }
    }
}

impl From<LifecycleError> for ApiError {
    fn from(value: LifecycleError) -> Self {
        match value {
            LifecycleError::Forbidden => Self::Forbidden,
            LifecycleError::InvalidTransition(status) => {
                Self::BadRequest(format!("resource cannot be moved to status {}", status))
            }
            LifecycleError::Repository(cause) => Self::from(cause),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use ApiError::*;

        match self {
            InternalServerError(e) => {
                tracing::error!("{}", e);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            BadRequest(message) => error_response(StatusCode::BAD_REQUEST, message),
            UnprocessableEntity(message) => {
                error_response(StatusCode::UNPROCESSABLE_ENTITY, message)
            }
            ConflictWithServerState(message) => error_response(StatusCode::CONFLICT, message),
            Forbidden => error_response(
                StatusCode::FORBIDDEN,
                "Moderator role required".to_string(),
            ),
            NotFound => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

fn error_response(status_code: StatusCode, message: String) -> Response {
    (
        status_code,
        Json(ApiResponseBody::new_error(status_code, message)),
    )
        .into_response()
}

// Generic response structure shared by all API responses.

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    pub status_code: u16,
    pub data: T,
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

/// The response data format for all error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use hub_common::ResourceStatus;

    use super::*;

    #[test]
    fn lifecycle_errors_map_to_statuses() {
        assert_eq!(ApiError::from(LifecycleError::Forbidden), ApiError::Forbidden);
        assert!(matches!(
            ApiError::from(LifecycleError::InvalidTransition(ResourceStatus::Pending)),
            ApiError::BadRequest(_)
        ));
        assert_eq!(
            ApiError::from(LifecycleError::Repository(RepositoryError::UniqueViolation(
                "tags_name_key".to_string()
            ))),
            ApiError::ConflictWithServerState("name already exists".to_string())
        );
    }

    #[tokio::test]
    async fn conflicts_do_not_echo_the_constraint() {
        let response = ApiError::from(RepositoryError::UniqueViolation(
            "duplicate key value violates unique constraint \"categories_name_key\"".to_string(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("name already exists"));
        assert!(!body.contains("categories_name_key"));
    }

    #[test]
    fn persistence_failures_hide_the_cause() {
        let response =
            ApiError::from(RepositoryError::Database("connection reset".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
