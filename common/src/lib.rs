pub mod database;
mod domain;

// Table names

pub const RESOURCES_TABLE: &str = "resources";
pub const CATEGORIES_TABLE: &str = "categories";
pub const TAGS_TABLE: &str = "tags";
pub const RESOURCE_TAGS_TABLE: &str = "resource_tags";

// Persisted field names

pub const ID_FIELD_NAME: &str = "id";
pub const NAME_FIELD_NAME: &str = "name";
pub const DESCRIPTION_FIELD_NAME: &str = "description";
pub const CREATED_FIELD_NAME: &str = "created_at";

pub const TITLE_FIELD_NAME: &str = "title";
pub const URL_FIELD_NAME: &str = "url";
pub const RESOURCE_TYPE_FIELD_NAME: &str = "resource_type";
pub const CATEGORY_ID_FIELD_NAME: &str = "category_id";
pub const STATUS_FIELD_NAME: &str = "status";
pub const VOTE_SCORE_FIELD_NAME: &str = "vote_score";
pub const SUBMITTED_BY_FIELD_NAME: &str = "submitted_by";
pub const APPROVED_FIELD_NAME: &str = "approved_at";

pub const RESOURCE_ID_FIELD_NAME: &str = "resource_id";
pub const TAG_ID_FIELD_NAME: &str = "tag_id";

// expose domain module

pub use domain::*;
pub use database::{Database, DatabaseSettings};
