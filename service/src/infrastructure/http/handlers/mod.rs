use axum::http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::resource::FieldUpdate;

pub mod categories;
pub mod dashboard;
pub mod resources;
pub mod tags;

// health check handler
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Envelope for single entity responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Keeps an explicit `null` apart from an absent field: absent stays `None`
/// through `#[serde(default)]`, `null` becomes `Some(None)`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Optional text from a request. Blank input counts as no value.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Change to an optional text column. `null` and blank text both clear it.
pub fn text_update(value: Option<Option<String>>) -> FieldUpdate<String> {
    value.map(non_blank).into()
}
