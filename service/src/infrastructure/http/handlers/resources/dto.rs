use hub_common::{ResourceStatus, ResourceTitle, ResourceType, ResourceUrl, TagName};
use serde::{Deserialize, Serialize};

use crate::domain::{
    category::CategoryId,
    resource::{
        FieldUpdate, NewResource, Resource, ResourceChanges, ResourceQuery,
        lifecycle::{ModerationDecision, VoteDirection},
    },
    tag::{normalize_tag, normalize_tags},
};
use crate::infrastructure::http::api::ApiError;
use crate::infrastructure::http::handlers::{non_blank, nullable, text_update};

/// Body of a new submission. A `status` sent by the client is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResourceRequest {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub resource_type: ResourceType,
    pub category_id: Option<i64>,
    pub submitted_by: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SubmitResourceRequest {
    pub fn into_domain(self) -> Result<(NewResource, Vec<TagName>), ApiError> {
        let resource = NewResource {
            title: title(self.title)?,
            description: non_blank(self.description),
            url: non_blank(self.url).map(url).transpose()?,
            resource_type: self.resource_type,
            category_id: self.category_id.map(CategoryId),
            submitted_by: non_blank(self.submitted_by),
        };
        Ok((resource, tags(self.tags)?))
    }
}

/// Partial update. Absent fields stay untouched, `null` clears nullable ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditResourceRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub url: Option<Option<String>>,
    pub resource_type: Option<ResourceType>,
    #[serde(default, deserialize_with = "nullable")]
    pub category_id: Option<Option<i64>>,
    pub status: Option<ResourceStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub submitted_by: Option<Option<String>>,
    /// Replaces the whole tag set when present
    pub tags: Option<Vec<String>>,
}

impl EditResourceRequest {
    pub fn into_domain(self) -> Result<(ResourceChanges, Option<Vec<TagName>>), ApiError> {
        let url = match text_update(self.url) {
            FieldUpdate::Set(raw) => FieldUpdate::Set(url(raw)?),
            FieldUpdate::Clear => FieldUpdate::Clear,
            FieldUpdate::Unchanged => FieldUpdate::Unchanged,
        };
        let changes = ResourceChanges {
            title: self.title.map(title).transpose()?,
            description: text_update(self.description),
            url,
            resource_type: self.resource_type,
            category_id: FieldUpdate::from(self.category_id).map(CategoryId),
            status: self.status,
            submitted_by: text_update(self.submitted_by),
        };
        Ok((changes, self.tags.map(tags).transpose()?))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModerateRequest {
    pub decision: String,
}

impl ModerateRequest {
    /// Only `approved` and `rejected` are decisions
    pub fn decision(&self) -> Result<ModerationDecision, ApiError> {
        self.decision
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("invalid decision: {}", self.decision)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoteRequest {
    pub vote_type: String,
}

impl VoteRequest {
    pub fn direction(&self) -> Result<VoteDirection, ApiError> {
        match self.vote_type.as_str() {
            "up" => Ok(VoteDirection::Up),
            "down" => Ok(VoteDirection::Down),
            other => Err(ApiError::BadRequest(format!("invalid vote type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListResourcesParams {
    pub status: Option<String>,
    pub category_id: Option<i64>,
    pub tag: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListResourcesParams {
    pub fn into_query(self) -> Result<ResourceQuery, ApiError> {
        let mut query = ResourceQuery::default().paginate(self.limit, self.offset);
        if let Some(status) = non_blank(self.status) {
            let status = status
                .parse::<ResourceStatus>()
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            query = query.with_status(status);
        }
        if let Some(category_id) = self.category_id {
            query = query.with_category(CategoryId(category_id));
        }
        if let Some(tag) = non_blank(self.tag) {
            let tag = normalize_tag(&tag).map_err(|e| ApiError::BadRequest(format!("invalid tag: {}", e)))?;
            query = query.with_tag(tag);
        }
        Ok(query)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceListResponse {
    pub data: Vec<Resource>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMeta {
    pub count: usize,
    pub limit: i64,
    pub offset: i64,
}

impl ResourceListResponse {
    pub fn new(data: Vec<Resource>, query: &ResourceQuery) -> Self {
        let meta = PageMeta {
            count: data.len(),
            limit: query.limit,
            offset: query.offset,
        };
        Self { data, meta }
    }
}

fn title(raw: String) -> Result<ResourceTitle, ApiError> {
    ResourceTitle::try_new(raw).map_err(|e| ApiError::UnprocessableEntity(format!("invalid title: {}", e)))
}

fn url(raw: String) -> Result<ResourceUrl, ApiError> {
    ResourceUrl::try_new(raw).map_err(|e| ApiError::UnprocessableEntity(format!("invalid url: {}", e)))
}

fn tags(raw: Vec<String>) -> Result<Vec<TagName>, ApiError> {
    normalize_tags(raw).map_err(|e| ApiError::UnprocessableEntity(format!("invalid tag: {}", e)))
}
