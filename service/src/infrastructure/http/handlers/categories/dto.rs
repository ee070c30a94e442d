use hub_common::CategoryName;
use serde::Deserialize;

use crate::domain::category::{CategoryChanges, NewCategory};
use crate::infrastructure::http::api::ApiError;
use crate::infrastructure::http::handlers::{non_blank, nullable, text_update};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

impl CreateCategoryRequest {
    pub fn into_domain(self) -> Result<NewCategory, ApiError> {
        Ok(NewCategory {
            name: name(self.name)?,
            description: non_blank(self.description),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl UpdateCategoryRequest {
    pub fn into_domain(self) -> Result<CategoryChanges, ApiError> {
        Ok(CategoryChanges {
            name: self.name.map(name).transpose()?,
            description: text_update(self.description),
        })
    }
}

fn name(raw: String) -> Result<CategoryName, ApiError> {
    CategoryName::try_new(raw)
        .map_err(|e| ApiError::UnprocessableEntity(format!("invalid category name: {}", e)))
}
