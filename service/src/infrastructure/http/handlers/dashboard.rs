use axum::extract::State;
use axum::http::StatusCode;

use crate::domain::{AppState, dashboard::Dashboard, moderation::Caller};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::DataResponse;

pub async fn get_dashboard<S: AppState>(
    State(state): State<S>,
    caller: Caller,
) -> Result<ApiSuccess<DataResponse<Dashboard>>, ApiError> {
    let dashboard = state.gateway().dashboard(caller).await?;
    Ok(ApiSuccess::new(StatusCode::OK, DataResponse::new(dashboard)))
}
