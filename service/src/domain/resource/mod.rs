pub mod error;
pub mod lifecycle;

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use hub_common::{ResourceStatus, ResourceTitle, ResourceType, ResourceUrl, TagName};
use serde::{Deserialize, Serialize};

use crate::domain::category::CategoryId;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Wrapper to prevent ID confusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub i64);

impl From<i64> for ResourceId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resource as read back from the store, joined with its category name
/// and the names of its tags (sorted, empty when untagged).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub id: ResourceId,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub resource_type: ResourceType,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub status: ResourceStatus,
    pub vote_score: i32,
    pub submitted_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

/// Fields of a new submission. Carries no status: submissions are stored as pending.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResource {
    pub title: ResourceTitle,
    pub description: Option<String>,
    pub url: Option<ResourceUrl>,
    pub resource_type: ResourceType,
    pub category_id: Option<CategoryId>,
    pub submitted_by: Option<String>,
}

/// Change to a nullable field in a partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Field was not part of the update, keep the stored value
    Unchanged,
    /// Replace the stored value
    Set(T),
    /// Store NULL
    Clear,
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::Unchanged
    }
}

impl<T> FieldUpdate<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, FieldUpdate::Unchanged)
    }

    /// `None` when unchanged, otherwise the value to store.
    pub fn as_assignment(&self) -> Option<Option<&T>> {
        match self {
            FieldUpdate::Unchanged => None,
            FieldUpdate::Set(value) => Some(Some(value)),
            FieldUpdate::Clear => Some(None),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldUpdate<U> {
        match self {
            FieldUpdate::Unchanged => FieldUpdate::Unchanged,
            FieldUpdate::Set(value) => FieldUpdate::Set(f(value)),
            FieldUpdate::Clear => FieldUpdate::Clear,
        }
    }

    /// Applies the update to a stored value.
    pub fn apply_to(&self, current: &mut Option<T>)
    where
        T: Clone,
    {
        match self {
            FieldUpdate::Unchanged => {}
            FieldUpdate::Set(value) => *current = Some(value.clone()),
            FieldUpdate::Clear => *current = None,
        }
    }
}

impl<T> From<Option<Option<T>>> for FieldUpdate<T> {
    fn from(value: Option<Option<T>>) -> Self {
        match value {
            None => FieldUpdate::Unchanged,
            Some(None) => FieldUpdate::Clear,
            Some(Some(value)) => FieldUpdate::Set(value),
        }
    }
}

/// Partial update of a resource: only fields carrying a change are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceChanges {
    pub title: Option<ResourceTitle>,
    pub description: FieldUpdate<String>,
    pub url: FieldUpdate<ResourceUrl>,
    pub resource_type: Option<ResourceType>,
    pub category_id: FieldUpdate<CategoryId>,
    pub status: Option<ResourceStatus>,
    pub submitted_by: FieldUpdate<String>,
}

impl ResourceChanges {
    pub fn status(status: ResourceStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_unchanged()
            && self.url.is_unchanged()
            && self.resource_type.is_none()
            && self.category_id.is_unchanged()
            && self.status.is_none()
            && self.submitted_by.is_unchanged()
    }
}

/// Listing filter with pagination, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceQuery {
    pub status: Option<ResourceStatus>,
    pub category_id: Option<CategoryId>,
    pub tag: Option<TagName>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ResourceQuery {
    fn default() -> Self {
        Self {
            status: None,
            category_id: None,
            tag: None,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl ResourceQuery {
    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_tag(mut self, tag: TagName) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Set pagination limit and offset
    ///
    /// Enforces invariants:
    /// - limit defaults to 20 when missing, is at least 1 and at most 100
    /// - offset defaults to 0 and is never negative
    pub fn paginate(mut self, limit: Option<i64>, offset: Option<i64>) -> Self {
        self.limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
        self.offset = offset.unwrap_or(0).max(0);
        self
    }
}
